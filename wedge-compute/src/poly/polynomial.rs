//! Sparse multivariate polynomials with rational coefficients.

use rug::Rational;
use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap},
    ops::{Add, Mul, Neg, Sub},
};
use crate::error::{Error, InvalidArgument, Result};
use crate::symbolic::{Expr, Primary, Symbol};

/// The exponents of a monomial, one per variable.
pub type Monomial = Vec<u32>;

/// A monomial order, used to pick the leading term of a polynomial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MonomialOrder {
    /// Lexicographic order: the first variable dominates. Used to eliminate the first variables.
    Lex,

    /// Graded reverse lexicographic order: total degree first, then the monomial with the smaller
    /// exponent in the last variable where they differ is larger.
    #[default]
    GrevLex,
}

impl MonomialOrder {
    /// Compares two monomials with the same number of variables.
    pub fn cmp(self, a: &[u32], b: &[u32]) -> Ordering {
        match self {
            Self::Lex => a.cmp(b),
            Self::GrevLex => degree(a).cmp(&degree(b)).then_with(|| {
                a.iter()
                    .rev()
                    .zip(b.iter().rev())
                    .map(|(x, y)| x.cmp(y).reverse())
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
        }
    }
}

/// The total degree of a monomial.
pub(crate) fn degree(monomial: &[u32]) -> u32 {
    monomial.iter().sum()
}

/// Returns true if `a` divides `b`.
pub(crate) fn divides(a: &[u32], b: &[u32]) -> bool {
    a.iter().zip(b).all(|(x, y)| x <= y)
}

/// The least common multiple of two monomials.
pub(crate) fn lcm(a: &[u32], b: &[u32]) -> Monomial {
    a.iter().zip(b).map(|(x, y)| *x.max(y)).collect()
}

/// Returns true if the monomials share no variable.
pub(crate) fn coprime(a: &[u32], b: &[u32]) -> bool {
    a.iter().zip(b).all(|(x, y)| *x == 0 || *y == 0)
}

/// `b / a`, assuming `a` divides `b`.
pub(crate) fn quotient(b: &[u32], a: &[u32]) -> Monomial {
    b.iter().zip(a).map(|(x, y)| x - y).collect()
}

/// A polynomial in a fixed number of variables, stored as a map from monomials to nonzero
/// coefficients.
///
/// The variables are only numbered; converting to and from [`Expr`] takes the list of
/// [`Symbol`]s they stand for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polynomial {
    nvars: usize,
    terms: BTreeMap<Monomial, Rational>,
}

impl Polynomial {
    pub fn zero(nvars: usize) -> Self {
        Self { nvars, terms: BTreeMap::new() }
    }

    pub fn constant(nvars: usize, value: impl Into<Rational>) -> Self {
        let mut poly = Self::zero(nvars);
        poly.add_term(vec![0; nvars], value.into());
        poly
    }

    /// The `index`-th variable.
    pub fn variable(nvars: usize, index: usize) -> Self {
        let mut monomial = vec![0; nvars];
        monomial[index] = 1;
        let mut poly = Self::zero(nvars);
        poly.add_term(monomial, Rational::from(1));
        poly
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    /// If the polynomial is constant (possibly zero), returns its value.
    pub fn constant_value(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::new()),
            1 => self.terms.iter()
                .next()
                .filter(|(monomial, _)| degree(monomial) == 0)
                .map(|(_, coefficient)| coefficient.clone()),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.constant_value().is_some()
    }

    /// The total degree, 0 for the zero polynomial.
    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(|monomial| degree(monomial)).max().unwrap_or(0)
    }

    /// The degree in the `index`-th variable.
    pub fn degree_in(&self, index: usize) -> u32 {
        self.terms.keys().map(|monomial| monomial[index]).max().unwrap_or(0)
    }

    /// The leading monomial and coefficient under the given order.
    pub fn leading(&self, order: MonomialOrder) -> Option<(&Monomial, &Rational)> {
        self.terms.iter().max_by(|(a, _), (b, _)| order.cmp(a, b))
    }

    pub fn leading_monomial(&self, order: MonomialOrder) -> Option<&Monomial> {
        self.leading(order).map(|(monomial, _)| monomial)
    }

    /// Adds `coefficient * monomial` to the polynomial.
    pub(crate) fn add_term(&mut self, monomial: Monomial, coefficient: Rational) {
        match self.terms.entry(monomial) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().cmp0() == Ordering::Equal {
                    entry.remove();
                }
            },
            Entry::Vacant(entry) => if coefficient.cmp0() != Ordering::Equal {
                entry.insert(coefficient);
            },
        }
    }

    /// Removes and returns the coefficient of a monomial.
    pub(crate) fn take_term(&mut self, monomial: &[u32]) -> Option<Rational> {
        self.terms.remove(monomial)
    }

    pub fn scale(&self, factor: &Rational) -> Self {
        if factor.cmp0() == Ordering::Equal {
            return Self::zero(self.nvars);
        }
        Self {
            nvars: self.nvars,
            terms: self.terms.iter()
                .map(|(monomial, coefficient)| (monomial.clone(), Rational::from(coefficient * factor)))
                .collect(),
        }
    }

    /// Returns `coefficient * monomial * self`.
    pub fn mul_term(&self, monomial: &[u32], coefficient: &Rational) -> Self {
        let mut result = Self::zero(self.nvars);
        if coefficient.cmp0() == Ordering::Equal {
            return result;
        }
        for (m, c) in &self.terms {
            let product = m.iter().zip(monomial).map(|(x, y)| x + y).collect();
            result.terms.insert(product, Rational::from(c * coefficient));
        }
        result
    }

    /// Divides by the leading coefficient.
    pub fn monic(&self, order: MonomialOrder) -> Self {
        match self.leading(order) {
            Some((_, coefficient)) => self.scale(&Rational::from(coefficient.recip_ref())),
            None => self.clone(),
        }
    }

    /// The partial derivative with respect to the `index`-th variable.
    pub fn derivative(&self, index: usize) -> Self {
        let mut result = Self::zero(self.nvars);
        for (monomial, coefficient) in &self.terms {
            if monomial[index] == 0 {
                continue;
            }
            let mut lowered = monomial.clone();
            lowered[index] -= 1;
            result.add_term(lowered, Rational::from(coefficient * monomial[index]));
        }
        result
    }

    /// The `exp`-th power.
    pub fn pow(&self, exp: u32) -> Self {
        (0..exp).fold(Self::constant(self.nvars, 1), |acc, _| &acc * self)
    }

    /// Replaces the `index`-th variable by `value`.
    pub fn substitute(&self, index: usize, value: &Polynomial) -> Self {
        let mut powers = vec![Self::constant(self.nvars, 1)];
        let mut result = Self::zero(self.nvars);
        for (monomial, coefficient) in &self.terms {
            let exp = monomial[index] as usize;
            while powers.len() <= exp {
                let next = &powers[powers.len() - 1] * value;
                powers.push(next);
            }
            let mut rest = monomial.clone();
            rest[index] = 0;
            result = &result + &powers[exp].mul_term(&rest, coefficient);
        }
        result
    }

    /// The same polynomial in `nvars` variables, with the `i`-th variable renumbered `offset + i`.
    pub(crate) fn embed(&self, nvars: usize, offset: usize) -> Self {
        Self {
            nvars,
            terms: self.terms.iter()
                .map(|(monomial, coefficient)| {
                    let mut embedded = vec![0; nvars];
                    embedded[offset..offset + self.nvars].copy_from_slice(monomial);
                    (embedded, coefficient.clone())
                })
                .collect(),
        }
    }

    /// The inverse of [`Polynomial::embed`]: returns [`None`] if the polynomial depends on a
    /// variable outside `offset..offset + nvars`.
    pub(crate) fn restrict(&self, nvars: usize, offset: usize) -> Option<Self> {
        let mut result = Self::zero(nvars);
        for (monomial, coefficient) in &self.terms {
            let outside = monomial[..offset].iter().chain(&monomial[offset + nvars..]);
            if outside.copied().any(|exp| exp != 0) {
                return None;
            }
            result.terms.insert(monomial[offset..offset + nvars].to_vec(), coefficient.clone());
        }
        Some(result)
    }

    /// Divides by `divisor`, returning the quotient if the division is exact.
    pub fn div_exact(&self, divisor: &Polynomial) -> Option<Self> {
        let (divisor_monomial, divisor_coefficient) = divisor.leading(MonomialOrder::Lex)?;
        let mut result = Self::zero(self.nvars);
        let mut remainder = self.clone();
        while let Some((monomial, coefficient)) = remainder.leading(MonomialOrder::Lex) {
            if !divides(divisor_monomial, monomial) {
                return None;
            }
            let shift = quotient(monomial, divisor_monomial);
            let factor = Rational::from(coefficient / divisor_coefficient);
            remainder = &remainder - &divisor.mul_term(&shift, &factor);
            result.add_term(shift, factor);
        }
        Some(result)
    }

    /// Converts a polynomial expression in the given variables.
    ///
    /// Returns an [`InvalidArgument`] error if the expression contains vectors, functions,
    /// negative powers, or symbols other than the variables.
    pub fn from_expr(expr: &Expr, variables: &[Symbol]) -> Result<Self> {
        let invalid = |message: String| Error::new(expr.to_string(), InvalidArgument::new(message));
        let mut poly = Self::zero(variables.len());
        for term in expr.terms() {
            if !term.word.is_empty() {
                return Err(invalid(format!("`{}` is not a scalar", term.to_expr())));
            }
            let mut monomial = vec![0; variables.len()];
            for (base, exp) in &term.factors {
                let index = match base {
                    Expr::Primary(Primary::Symbol(symbol)) if *exp > 0 => {
                        variables.iter().position(|variable| variable == symbol)
                    },
                    _ => None,
                };
                let Some(index) = index else {
                    return Err(invalid(format!(
                        "`{}` is not a polynomial in the variables",
                        term.to_expr(),
                    )));
                };
                monomial[index] = *exp as u32;
            }
            poly.add_term(monomial, term.coefficient);
        }
        Ok(poly)
    }

    /// Converts the polynomial to an expression, the `i`-th variable being `variables[i]`.
    pub fn to_expr(&self, variables: &[Symbol]) -> Expr {
        self.terms.iter()
            .map(|(monomial, coefficient)| {
                monomial.iter()
                    .zip(variables)
                    .filter(|(exp, _)| **exp > 0)
                    .map(|(exp, variable)| Expr::from(variable).powi(*exp as i64))
                    .fold(Expr::from(coefficient.clone()), |acc, factor| acc * factor)
            })
            .sum()
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (monomial, coefficient) in &rhs.terms {
            result.add_term(monomial.clone(), coefficient.clone());
        }
        result
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let mut result = self.clone();
        for (monomial, coefficient) in &rhs.terms {
            result.add_term(monomial.clone(), Rational::from(-coefficient));
        }
        result
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut result = Polynomial::zero(self.nvars);
        for (monomial, coefficient) in &rhs.terms {
            result = &result + &self.mul_term(monomial, coefficient);
        }
        result
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(&Rational::from(-1))
    }
}
