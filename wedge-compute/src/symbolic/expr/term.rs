//! Canonical form of expressions.
//!
//! Internally, a canonical expression is a [`Sum`]: a map from the *shape* of a term (its scalar
//! factors and its wedge word) to the rational coefficient in front of it. All arithmetic on
//! [`Expr`] converts the operands to [`Sum`]s, combines them here, and converts the result back.

use rug::Rational;
use std::collections::{btree_map::Entry, BTreeMap};
use super::{call, Expr, Primary};
use crate::symbolic::{normalize_product, Symbol};

/// A single term of a canonical expression: `coefficient * factors * word`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The rational coefficient of the term. Never zero.
    pub coefficient: Rational,

    /// The scalar factors of the term with their (nonzero) exponents, sorted by base.
    ///
    /// A base is a scalar [`Primary::Symbol`], [`Primary::I`] (always with exponent 1), a
    /// [`Primary::Call`], an [`Expr::Exp`] with a non-integer exponent, or an [`Expr::Add`] (always
    /// with a negative exponent, since positive powers of sums are multiplied out).
    pub factors: Vec<(Expr, i64)>,

    /// The normalized wedge word of vector elements.
    pub word: Vec<Symbol>,
}

impl Term {
    /// Returns true if the term contains no vector elements.
    pub fn is_scalar(&self) -> bool {
        self.word.is_empty()
    }

    /// Returns the term without its coefficient (or with coefficient 1).
    pub fn monomial(&self) -> Expr {
        shape_expr(&Shape { factors: self.factors.clone(), word: self.word.clone() }, &Rational::from(1))
    }

    /// Returns the term as an expression.
    pub fn to_expr(&self) -> Expr {
        shape_expr(&Shape { factors: self.factors.clone(), word: self.word.clone() }, &self.coefficient)
    }
}

impl From<Term> for Expr {
    fn from(term: Term) -> Self {
        term.to_expr()
    }
}

impl From<&Term> for Expr {
    fn from(term: &Term) -> Self {
        term.to_expr()
    }
}

/// The shape of a term: everything except its coefficient.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Shape {
    factors: Vec<(Expr, i64)>,
    word: Vec<Symbol>,
}

/// Renders a term in canonical form.
fn shape_expr(shape: &Shape, coefficient: &Rational) -> Expr {
    let mut factors = Vec::with_capacity(shape.factors.len() + 2);
    if *coefficient != 1 || (shape.factors.is_empty() && shape.word.is_empty()) {
        factors.push(Expr::Primary(Primary::Number(coefficient.clone())));
    }
    for (base, exp) in &shape.factors {
        if *exp == 1 {
            factors.push(base.clone());
        } else {
            factors.push(Expr::Exp(
                Box::new(base.clone()),
                Box::new(Expr::Primary(Primary::Number(Rational::from(*exp)))),
            ));
        }
    }
    match shape.word.len() {
        0 => {},
        1 => factors.push(Expr::Primary(Primary::Symbol(shape.word[0].clone()))),
        _ => factors.push(Expr::Wedge(shape.word.clone())),
    }

    if factors.len() == 1 {
        factors.remove(0)
    } else {
        Expr::Mul(factors)
    }
}

/// Multiplies two term shapes, normalizing the wedge word and the exponent of `i`, and multiplying
/// out any sum whose exponent becomes positive.
fn mul_shapes(lhs: &Shape, rhs: &Shape) -> Sum {
    let mut word = Vec::with_capacity(lhs.word.len() + rhs.word.len());
    word.extend_from_slice(&lhs.word);
    word.extend_from_slice(&rhs.word);
    let Some((sign, word)) = normalize_product(&word) else {
        return Sum::zero();
    };
    let mut coefficient = sign.to_rational();

    let mut powers = lhs.factors.iter().cloned().collect::<BTreeMap<_, _>>();
    for (base, exp) in &rhs.factors {
        *powers.entry(base.clone()).or_insert(0) += exp;
    }

    let mut factors = Vec::with_capacity(powers.len());
    let mut pending = Vec::new();
    for (base, exp) in powers {
        if exp == 0 {
            continue;
        }
        match base {
            Expr::Primary(Primary::I) => match exp.rem_euclid(4) {
                0 => {},
                1 => factors.push((base, 1)),
                2 => coefficient = -coefficient,
                _ => {
                    coefficient = -coefficient;
                    factors.push((base, 1));
                },
            },
            Expr::Add(_) if exp > 0 => pending.push((base, exp)),
            _ => factors.push((base, exp)),
        }
    }

    let mut product = Sum::from_shape(Shape { factors, word }, coefficient);
    for (base, exp) in pending {
        product = product.mul(&Sum::expand(&base).pow_int(exp));
    }
    product
}

/// Returns true if the factor is a negative power of a sum.
fn is_denominator((base, exp): &(Expr, i64)) -> bool {
    *exp < 0 && matches!(base, Expr::Add(_))
}

/// A canonical expression: a sum of terms, keyed by their shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Sum(BTreeMap<Shape, Rational>);

impl Sum {
    /// The empty sum.
    pub fn zero() -> Self {
        Self(BTreeMap::new())
    }

    /// The sum containing the single term `1`.
    pub fn one() -> Self {
        Self::constant(Rational::from(1))
    }

    /// The sum containing a single constant term.
    pub fn constant(value: Rational) -> Self {
        Self::from_shape(Shape::default(), value)
    }

    fn from_shape(shape: Shape, coefficient: Rational) -> Self {
        let mut sum = Self::zero();
        sum.add_term(shape, coefficient);
        sum
    }

    /// The sum containing the single factor `base^1`.
    fn atom(base: Expr) -> Self {
        Self::from_shape(Shape { factors: vec![(base, 1)], word: Vec::new() }, Rational::from(1))
    }

    /// Converts any expression into canonical form.
    pub fn expand(expr: &Expr) -> Self {
        match expr {
            Expr::Primary(primary) => match primary {
                Primary::Number(num) => Self::constant(num.clone()),
                Primary::I => Self::atom(expr.clone()),
                Primary::Symbol(sym) if sym.is_scalar() => Self::atom(expr.clone()),
                Primary::Symbol(sym) => Self::from_shape(
                    Shape { factors: Vec::new(), word: vec![sym.clone()] },
                    Rational::from(1),
                ),
                Primary::Call(c) => match call::evaluate(c) {
                    Ok(value) => value,
                    Err(canonical) => Self::atom(Expr::Primary(Primary::Call(canonical))),
                },
            },
            Expr::Add(terms) => {
                let mut sum = Self::zero();
                for term in terms {
                    sum.add(&Self::expand(term));
                }
                sum
            },
            Expr::Mul(factors) => factors.iter()
                .fold(Self::one(), |product, factor| product.mul(&Self::expand(factor))),
            Expr::Wedge(word) => word.iter()
                .fold(Self::one(), |product, sym| {
                    product.mul(&Self::expand(&Expr::Primary(Primary::Symbol(sym.clone()))))
                }),
            Expr::Exp(base, exp) => Self::expand(base).pow(&Self::expand(exp)),
        }
    }

    /// Converts the sum back into an expression.
    pub fn to_expr(&self) -> Expr {
        let mut terms = self.0.iter()
            .map(|(shape, coefficient)| shape_expr(shape, coefficient))
            .collect::<Vec<_>>();
        match terms.len() {
            0 => Expr::zero(),
            1 => terms.remove(0),
            _ => Expr::Add(terms),
        }
    }

    /// Returns the terms of the sum.
    pub fn into_terms(self) -> Vec<Term> {
        self.0.into_iter()
            .map(|(shape, coefficient)| Term { coefficient, factors: shape.factors, word: shape.word })
            .collect()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// If the sum is a constant, returns its value.
    pub fn as_constant(&self) -> Option<Rational> {
        match self.0.len() {
            0 => Some(Rational::new()),
            1 => self.0.iter()
                .next()
                .filter(|(shape, _)| shape.factors.is_empty() && shape.word.is_empty())
                .map(|(_, coefficient)| coefficient.clone()),
            _ => None,
        }
    }

    /// Returns true if the sum is zero as a rational function: zero once its terms are brought to a
    /// common denominator.
    pub fn is_zero_fraction(&self) -> bool {
        let mut sum = self.clone();
        for _ in 0..8 {
            if sum.is_zero() || !sum.has_denominators() {
                break;
            }
            sum = sum.clear_denominators();
        }
        sum.is_zero()
    }

    /// Returns true if some term is divided by a sum.
    fn has_denominators(&self) -> bool {
        self.0.keys().any(|shape| shape.factors.iter().any(is_denominator))
    }

    /// Multiplies the sum by each sum dividing its terms, raised to the largest power dividing a
    /// single term. The result is zero if and only if the sum is.
    fn clear_denominators(&self) -> Sum {
        let mut denominators = BTreeMap::<Expr, i64>::new();
        for shape in self.0.keys() {
            for (base, exp) in shape.factors.iter().filter(|factor| is_denominator(factor)) {
                let power = denominators.entry(base.clone()).or_insert(0);
                *power = (*power).max(-exp);
            }
        }

        let mut numerator = Sum::zero();
        for (shape, coefficient) in &self.0 {
            let mut rest = shape.clone();
            rest.factors.retain(|factor| !is_denominator(factor));
            let mut term = Sum::from_shape(rest, coefficient.clone());
            for (base, power) in &denominators {
                let exp = shape.factors.iter()
                    .find(|(b, _)| b == base)
                    .map_or(0, |(_, exp)| *exp);
                term = term.mul(&Sum::expand(base).pow_int(power + exp));
            }
            numerator.add(&term);
        }
        numerator
    }

    fn has_vectors(&self) -> bool {
        self.0.keys().any(|shape| !shape.word.is_empty())
    }

    fn add_term(&mut self, shape: Shape, coefficient: Rational) {
        if coefficient == 0 {
            return;
        }
        match self.0.entry(shape) {
            Entry::Vacant(entry) => {
                entry.insert(coefficient);
            },
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if *entry.get() == 0 {
                    entry.remove();
                }
            },
        }
    }

    /// Adds another sum to this one.
    pub fn add(&mut self, other: &Sum) {
        for (shape, coefficient) in &other.0 {
            self.add_term(shape.clone(), coefficient.clone());
        }
    }

    /// Returns the sum multiplied by a rational number.
    pub fn scale(&self, factor: &Rational) -> Sum {
        if *factor == 0 {
            return Sum::zero();
        }
        Sum(self.0.iter()
            .map(|(shape, coefficient)| (shape.clone(), Rational::from(coefficient * factor)))
            .collect())
    }

    /// Returns the product `self * other`, in that order.
    pub fn mul(&self, other: &Sum) -> Sum {
        if let Some(product) = self.cancel(other).or_else(|| other.cancel(self)) {
            return product;
        }

        let mut product = Sum::zero();
        for (lhs_shape, lhs_coefficient) in &self.0 {
            for (rhs_shape, rhs_coefficient) in &other.0 {
                let coefficient = Rational::from(lhs_coefficient * rhs_coefficient);
                for (shape, c) in mul_shapes(lhs_shape, rhs_shape).0 {
                    product.add_term(shape, c * &coefficient);
                }
            }
        }
        if self.has_denominators() || other.has_denominators() {
            product.cancel_common_denominator()
        } else {
            product
        }
    }

    /// Splits a sum of several scalar terms into its leading coefficient and the sum divided by
    /// it, whose leading coefficient is 1.
    fn primitive(&self) -> (Rational, Sum) {
        let lead = self.0.values().next().cloned().unwrap_or_else(|| Rational::from(1));
        let primitive = self.scale(&Rational::from(lead.recip_ref()));
        (lead, primitive)
    }

    /// If every term of `other` is divided by this sum, returns the product `self * other` with
    /// that division cancelled.
    fn cancel(&self, other: &Sum) -> Option<Sum> {
        if self.0.len() < 2 || self.has_vectors() {
            return None;
        }
        let first = other.0.keys().next()?;
        if !first.factors.iter().any(|(base, exp)| *exp < 0 && matches!(base, Expr::Add(_))) {
            return None;
        }

        let (lead, primitive) = self.primitive();
        let base = primitive.to_expr();
        let mut product = Sum::zero();
        for (shape, coefficient) in &other.0 {
            let position = shape.factors.iter().position(|(b, exp)| *exp < 0 && *b == base)?;
            let mut shape = shape.clone();
            shape.factors[position].1 += 1;
            if shape.factors[position].1 == 0 {
                shape.factors.remove(position);
            }
            product.add_term(shape, Rational::from(coefficient * &lead));
        }
        Some(product)
    }

    /// If every term is divided by the same power of the same sum, and the numerators add up to a
    /// rational multiple of that sum, cancels one power of it.
    fn cancel_common_denominator(self) -> Sum {
        let Some(common) = self.0.keys()
            .next()
            .and_then(|shape| shape.factors.iter().find(|factor| is_denominator(factor)))
            .cloned()
        else {
            return self;
        };

        let mut numerator = Sum::zero();
        for (shape, coefficient) in &self.0 {
            let Some(position) = shape.factors.iter().position(|factor| *factor == common) else {
                return self;
            };
            let mut shape = shape.clone();
            shape.factors.remove(position);
            numerator.add_term(shape, coefficient.clone());
        }

        let (base, exp) = common;
        let Some(lead) = numerator.0.values().next().cloned() else {
            return self;
        };
        if numerator.scale(&lead.clone().recip()) != Sum::expand(&base) {
            return self;
        }
        let factors = if exp + 1 == 0 { Vec::new() } else { vec![(base, exp + 1)] };
        Sum::from_shape(Shape { factors, word: Vec::new() }, lead)
    }

    /// Returns `1 / self`.
    ///
    /// Panics if the sum is zero or contains vectors.
    pub fn inverse(&self) -> Sum {
        if self.is_zero() {
            panic!("division by zero");
        }
        if self.has_vectors() {
            panic!("cannot invert an expression containing vectors");
        }

        if self.0.len() == 1 {
            let (shape, coefficient) = self.0.iter().next().map(|(s, c)| (s.clone(), c.clone())).unwrap_or_default();
            let inverted = Shape {
                factors: shape.factors.into_iter().map(|(base, exp)| (base, -exp)).collect(),
                word: Vec::new(),
            };
            return mul_shapes(&Shape::default(), &inverted).scale(&coefficient.recip());
        }

        // 1 / (p + q*i) = (p - q*i) / (p^2 + q^2), so `i` never ends up in a denominator
        let (real, imaginary) = self.split_imaginary();
        if !imaginary.is_zero() {
            let mut conjugate = real.clone();
            conjugate.add(&imaginary.mul(&Sum::atom(Expr::i())).scale(&Rational::from(-1)));
            let mut norm = real.mul(&real);
            norm.add(&imaginary.mul(&imaginary));
            return conjugate.mul(&norm.inverse());
        }

        let (lead, primitive) = self.primitive();
        Sum::from_shape(
            Shape { factors: vec![(primitive.to_expr(), -1)], word: Vec::new() },
            lead.recip(),
        )
    }

    /// Splits the sum into `p + q*i`, where neither `p` nor `q` has a factor of `i`.
    fn split_imaginary(&self) -> (Sum, Sum) {
        let mut real = Sum::zero();
        let mut imaginary = Sum::zero();
        for (shape, coefficient) in &self.0 {
            match shape.factors.iter().position(|(base, _)| *base == Expr::i()) {
                Some(position) => {
                    let mut shape = shape.clone();
                    shape.factors.remove(position);
                    imaginary.add_term(shape, coefficient.clone());
                },
                None => real.add_term(shape.clone(), coefficient.clone()),
            }
        }
        (real, imaginary)
    }

    /// Raises the sum to an integer power by repeated squaring.
    pub fn pow_int(&self, exp: i64) -> Sum {
        let mut base = if exp < 0 { self.inverse() } else { self.clone() };
        let mut exp = exp.unsigned_abs();
        let mut result = Sum::one();
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul(&base);
            }
            exp >>= 1;
            if exp > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Raises the sum to a symbolic power.
    pub fn pow(&self, exp: &Sum) -> Sum {
        if let Some(exp) = exp.as_constant() {
            if *exp.denom() == 1 {
                if let Some(n) = exp.numer().to_i64() {
                    return self.pow_int(n);
                }
            }
        }
        if let Some(base) = self.as_constant() {
            if base == 1 {
                return Sum::one();
            }
        }
        if self.has_vectors() || exp.has_vectors() {
            panic!("cannot raise an expression containing vectors to a non-integer power");
        }

        Sum::atom(Expr::Exp(Box::new(self.to_expr()), Box::new(exp.to_expr())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::frac;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    #[test]
    fn powers_of_sums_are_expanded() {
        let kind = Kind::declare("x", Policy::Named, Algebra::Scalar);
        let x = Expr::from(kind.named("x").unwrap());
        let one = Expr::one();

        let cube = (&x + &one).powi(3);
        assert_eq!(cube.terms().len(), 4);
        assert_eq!(cube, x.powi(3) + Expr::from(3) * x.powi(2) + Expr::from(3) * &x + &one);
    }

    #[test]
    fn negative_powers_of_sums_are_factors() {
        let kind = Kind::declare("x", Policy::Named, Algebra::Scalar);
        let x = Expr::from(kind.named("x").unwrap());
        let sum = &x + Expr::one();

        let terms = sum.powi(-2).terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].factors, vec![(sum.clone(), -2)]);

        // multiplying by the sum itself cancels the factor
        assert_eq!(sum.powi(-2) * &sum * &sum, Expr::one());
    }

    #[test]
    fn symbolic_exponents() {
        let kind = Kind::declare("x", Policy::Named, Algebra::Scalar);
        let x = Expr::from(kind.named("x").unwrap());

        let root = x.pow(&Expr::from(frac(1, 2)));
        assert!(matches!(root, Expr::Exp(_, _)));
        assert_eq!(Expr::one().pow(&x), Expr::one());
        assert_eq!(Expr::from(2).pow(&Expr::from(-2)), Expr::from(frac(1, 4)));
        assert_eq!(x.pow(&Expr::zero()), Expr::one());
    }

    #[test]
    fn terms_expose_shape() {
        let scalars = Kind::declare("x", Policy::Named, Algebra::Scalar);
        let vectors = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let x = scalars.named("x").unwrap();
        let e = vectors.numbered_many(2).unwrap();

        let expr = Expr::from(-3) * Expr::from(&e[1]) * Expr::from(&x) * Expr::from(&e[0]);
        let terms = expr.terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].coefficient, 3);
        assert_eq!(terms[0].factors, vec![(Expr::from(&x), 1)]);
        assert_eq!(terms[0].word, e);
        assert_eq!(terms[0].monomial(), Expr::Mul(vec![Expr::from(&x), Expr::Wedge(e.clone())]));
    }

    #[test]
    fn complex_denominators_are_rationalized() {
        let kind = Kind::declare("x", Policy::Named, Algebra::Scalar);
        let x = Expr::from(kind.named("x").unwrap());
        let i = Expr::i();

        let quotient = (Expr::one() + &i).inverse();
        assert_eq!(quotient, Expr::from(frac(1, 2)) - Expr::from(frac(1, 2)) * &i);

        // only the real sum `x^2 + 1` is left in the denominator
        let quotient = (&x + &i).inverse();
        let norm = x.powi(2) + Expr::one();
        assert_eq!(quotient, (&x - &i) * norm.inverse());
        assert!(quotient.terms().iter().all(|term| {
            term.factors.iter().all(|(base, exp)| *exp > 0 || *base == norm)
        }));
        assert_eq!((&x + &i) * &quotient, Expr::one());
    }

    #[test]
    fn extreme_integer_exponents() {
        let i = Expr::i();
        assert_eq!(Expr::from(-1).powi(i64::MIN), Expr::one());
        assert_eq!(i.powi(i64::MIN), Expr::one());
        assert_eq!(i.powi(i64::MIN + 1), i);
        assert_eq!(i.powi(-1), -&i);
    }

    #[test]
    #[should_panic(expected = "cannot invert an expression containing vectors")]
    fn vectors_cannot_be_inverted() {
        let vectors = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let e = Expr::from(vectors.numbered().unwrap());
        let _ = e.inverse();
    }
}
