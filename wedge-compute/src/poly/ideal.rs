use once_cell::unsync::OnceCell;
use rug::Rational;
use std::{borrow::Cow, collections::BTreeSet};
use tracing::debug;
use crate::error::{render_list, Error, InconsistentDeclaration, Result};
use crate::symbolic::{coefficients, get_symbols, Domain, Expr, Substitution, Symbol};
use super::groebner::{self, groebner_basis, is_unit, normal_form, square_free};
use super::polynomial::{MonomialOrder, Polynomial};

/// The order of the cached Gröbner basis.
const ORDER: MonomialOrder = MonomialOrder::GrevLex;

/// An ideal of polynomials in the parameters of some [`Domain`], with rational coefficients.
///
/// The variables of the ideal are the elements of the domain occurring in its generators, ordered
/// as [`Symbol`]s. Expressions passed to the ideal should be polynomials in elements of the
/// domain; otherwise the operations return an [`InvalidArgument`](crate::error::InvalidArgument)
/// error.
///
/// A Gröbner basis of the ideal is computed on first use and cached until the next mutation.
#[derive(Debug, Clone)]
pub struct Ideal {
    domain: Domain,
    generators: Vec<Expr>,
    variables: OnceCell<Vec<Symbol>>,
    basis: OnceCell<Vec<Polynomial>>,
}

impl Ideal {
    /// Creates the zero ideal of polynomials in the elements of `domain`.
    pub fn new(domain: impl Into<Domain>) -> Self {
        Self {
            domain: domain.into(),
            generators: Vec::new(),
            variables: OnceCell::new(),
            basis: OnceCell::new(),
        }
    }

    /// Creates the ideal generated by the given polynomials.
    pub fn with_generators(
        domain: impl Into<Domain>,
        generators: impl IntoIterator<Item = Expr>,
    ) -> Self {
        let mut ideal = Self::new(domain);
        ideal.insert(generators);
        ideal
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn generators(&self) -> &[Expr] {
        &self.generators
    }

    fn invalidate(&mut self) {
        self.variables = OnceCell::new();
        self.basis = OnceCell::new();
    }

    /// Adds a generator. Zero is ignored.
    pub fn push(&mut self, generator: Expr) {
        let generator = generator.expand();
        if !generator.is_zero() {
            self.generators.push(generator);
            self.invalidate();
        }
    }

    pub fn insert(&mut self, generators: impl IntoIterator<Item = Expr>) {
        for generator in generators {
            self.push(generator);
        }
    }

    /// Removes and returns the generator at `index`.
    ///
    /// Panics if `index` is out of bounds.
    pub fn erase(&mut self, index: usize) -> Expr {
        self.invalidate();
        self.generators.remove(index)
    }

    pub fn clear(&mut self) {
        self.generators.clear();
        self.invalidate();
    }

    /// Replaces every generator by the given function of it, dropping the ones that vanish.
    pub(crate) fn map_generators(&mut self, f: impl Fn(&Expr) -> Expr) {
        self.generators = self.generators.iter()
            .map(f)
            .filter(|generator| !generator.is_zero())
            .collect();
        self.invalidate();
    }

    /// The variables of the ideal, in increasing order.
    pub fn variables(&self) -> &[Symbol] {
        self.variables.get_or_init(|| {
            self.generators.iter()
                .flat_map(|generator| get_symbols(generator, &self.domain))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    /// The generators as polynomials in the given variables.
    fn polynomials(&self, variables: &[Symbol]) -> Result<Vec<Polynomial>> {
        self.generators.iter()
            .map(|generator| Polynomial::from_expr(generator, variables))
            .collect()
    }

    /// The reduced Gröbner basis of the ideal, in graded reverse lexicographic order over
    /// [`Ideal::variables`].
    pub fn basis(&self) -> Result<&[Polynomial]> {
        self.basis
            .get_or_try_init(|| {
                let polynomials = self.polynomials(self.variables())?;
                Ok(groebner_basis(&polynomials, ORDER))
            })
            .map(Vec::as_slice)
    }

    /// The variables of the ideal and of `expr`, in increasing order.
    fn variables_with(&self, expr: &Expr) -> Cow<'_, [Symbol]> {
        let variables = self.variables();
        let extra = get_symbols(expr, &self.domain);
        if extra.iter().all(|symbol| variables.binary_search(symbol).is_ok()) {
            return Cow::Borrowed(variables);
        }
        Cow::Owned(variables.iter()
            .cloned()
            .chain(extra)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    /// The variables of the ideal and of `expr`, and a Gröbner basis of the ideal over them.
    fn basis_with(&self, expr: &Expr) -> Result<(Cow<'_, [Symbol]>, Cow<'_, [Polynomial]>)> {
        let variables = self.variables_with(expr);
        let basis = match &variables {
            Cow::Borrowed(_) => Cow::Borrowed(self.basis()?),
            Cow::Owned(all) => Cow::Owned(groebner_basis(&self.polynomials(all)?, ORDER)),
        };
        Ok((variables, basis))
    }

    /// Returns true if the ideal has no nonzero generator.
    pub fn ideal_is_zero(&self) -> bool {
        self.generators.is_empty()
    }

    /// Returns true if the ideal contains 1.
    ///
    /// An ideal without variables is the unit ideal if and only if some generator is a nonzero
    /// number.
    pub fn ideal_is_one(&self) -> Result<bool> {
        if self.variables().is_empty() {
            return Ok(self.generators.iter().any(|generator| generator.as_number().is_some()));
        }
        Ok(is_unit(self.basis()?))
    }

    /// Returns true if `expr` belongs to the ideal.
    pub fn contains(&self, expr: &Expr) -> Result<bool> {
        Ok(self.reduce_modulo(expr)?.is_zero())
    }

    /// Returns true if some power of `expr` belongs to the ideal.
    pub fn radical_contains(&self, expr: &Expr) -> Result<bool> {
        let variables = self.variables_with(expr);
        let poly = Polynomial::from_expr(expr, &variables)?;
        Ok(groebner::radical_contains(&self.polynomials(&variables)?, &poly))
    }

    /// Returns the normal form of `expr` modulo the ideal: the unique representative of its class
    /// none of whose terms is divisible by a leading monomial of the Gröbner basis.
    pub fn reduce_modulo(&self, expr: &Expr) -> Result<Expr> {
        let (variables, basis) = self.basis_with(expr)?;
        let poly = Polynomial::from_expr(expr, &variables)?;
        Ok(normal_form(&poly, &basis, ORDER).to_expr(&variables))
    }

    /// Reduces each coefficient of `expr` modulo the ideal, where the coefficients are taken with
    /// respect to the monomials in the elements of `domain`.
    pub fn reduce_modulo_by(&self, expr: &Expr, domain: &Domain) -> Result<Expr> {
        coefficients(expr, domain)
            .iter()
            .map(|(monomial, coefficient)| -> Result<Expr> {
                Ok(self.reduce_modulo(coefficient)? * monomial)
            })
            .sum()
    }

    /// Returns the intersection of two ideals over the domain of `self`.
    pub fn intersected(&self, other: &Ideal) -> Result<Ideal> {
        if self.ideal_is_zero() || other.ideal_is_zero() {
            return Ok(Ideal::new(self.domain.clone()));
        }

        let variables = self.variables()
            .iter()
            .chain(other.variables())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        if variables.is_empty() {
            return Ok(Ideal::with_generators(self.domain.clone(), [Expr::one()]));
        }

        let meet = groebner::intersection(
            &self.polynomials(&variables)?,
            &other.polynomials(&variables)?,
            variables.len(),
        );
        Ok(Ideal::with_generators(
            self.domain.clone(),
            meet.iter().map(|poly| poly.to_expr(&variables)),
        ))
    }

    /// Replaces the generators by the reduced Gröbner basis.
    pub fn reduce(&mut self) -> Result<()> {
        let variables = self.variables().to_vec();
        let generators = self.basis()?
            .iter()
            .map(|poly| poly.to_expr(&variables))
            .collect::<Vec<_>>();
        self.generators = generators;
        self.invalidate();
        Ok(())
    }

    /// Eliminates variables by solving the generators that are linear in one of them.
    ///
    /// Repeatedly picks a generator of the form `c * x + r`, where `c` is a nonzero number and `r`
    /// does not depend on the variable `x`, preferring generators of lowest total degree, then
    /// earlier generators, then smaller variables. It solves it for `x`, substitutes the solution
    /// into the other generators and into the earlier solutions, and replaces each substituted
    /// generator by its square-free part. Returns the solutions; the generators left over replace
    /// those of the ideal.
    ///
    /// Returns an [`InconsistentDeclaration`] error, leaving the ideal unchanged, if a generator
    /// becomes a nonzero number.
    #[tracing::instrument(skip_all, fields(generators = self.generators.len()))]
    pub fn eliminate(&mut self) -> Result<Substitution> {
        let variables = self.variables().to_vec();
        let mut equations = self.polynomials(&variables)?;
        let mut solved: Vec<(usize, Polynomial)> = Vec::new();

        loop {
            equations.retain(|equation| !equation.is_zero());
            if equations.iter().any(Polynomial::is_constant) {
                let (text, _) = render_list(&self.generators);
                debug!("inconsistent generators");
                return Err(Error::new(text, InconsistentDeclaration));
            }

            let candidate = equations.iter()
                .enumerate()
                .flat_map(|(i, equation)| {
                    let solved = &solved;
                    (0..variables.len())
                        .filter(move |v| solved.iter().all(|(done, _)| done != v))
                        .filter_map(move |v| {
                            linear_coefficient(equation, v).map(|_| (equation.total_degree(), i, v))
                        })
                })
                .min();
            let Some((_, i, v)) = candidate else {
                break;
            };

            let equation = equations.remove(i);
            let Some(value) = solve_for(&equation, v) else {
                break;
            };
            debug!(variable = %variables[v], value = %value.to_expr(&variables), "eliminated");

            for equation in &mut equations {
                *equation = square_free(&equation.substitute(v, &value));
            }
            for (_, earlier) in &mut solved {
                *earlier = earlier.substitute(v, &value);
            }
            solved.push((v, value));
        }

        let substitution = solved.iter()
            .map(|(v, value)| (variables[*v].clone(), value.to_expr(&variables)))
            .collect::<Substitution>();
        self.generators = equations.iter().map(|equation| equation.to_expr(&variables)).collect();
        self.invalidate();
        Ok(substitution)
    }
}

/// If `equation` is `c * x + r` for the `v`-th variable `x`, a nonzero number `c` and a polynomial
/// `r` free of `x`, returns `c`.
fn linear_coefficient(equation: &Polynomial, v: usize) -> Option<Rational> {
    let mut coefficient = None;
    for (monomial, c) in equation.terms() {
        if monomial[v] == 0 {
            continue;
        }
        let pure = monomial[v] == 1 && monomial.iter().sum::<u32>() == 1;
        if !pure || coefficient.is_some() {
            return None;
        }
        coefficient = Some(c.clone());
    }
    coefficient
}

/// Solves `c * x + r = 0` for the `v`-th variable `x`, returning `-r / c`.
fn solve_for(equation: &Polynomial, v: usize) -> Option<Polynomial> {
    let coefficient = linear_coefficient(equation, v)?;
    let term = Polynomial::variable(equation.nvars(), v).scale(&coefficient);
    let rest = equation - &term;
    Some(rest.scale(&-coefficient.recip()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidArgument;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    fn parameters(names: &[&str]) -> (Kind, Vec<Expr>) {
        let kind = Kind::declare("param", Policy::Named, Algebra::Scalar);
        let symbols = names.iter().map(|name| Expr::from(kind.named(name).unwrap())).collect();
        (kind, symbols)
    }

    #[test]
    fn membership() {
        let (kind, p) = parameters(&["x", "y"]);
        let (x, y) = (&p[0], &p[1]);
        let ideal = Ideal::with_generators(kind, [x * y - Expr::one(), y * y - Expr::one()]);

        assert!(ideal.contains(&(x - y)).unwrap());
        assert!(!ideal.contains(x).unwrap());
        assert!(!ideal.ideal_is_one().unwrap());
        assert_eq!(ideal.reduce_modulo(&(x * x)).unwrap(), Expr::one());
    }

    #[test]
    fn unit_ideal() {
        let (kind, p) = parameters(&["x"]);
        let ideal = Ideal::with_generators(kind, [p[0].clone(), &p[0] - Expr::one()]);
        assert!(ideal.ideal_is_one().unwrap());

        let constant = Ideal::with_generators(kind, [Expr::from(3)]);
        assert!(constant.variables().is_empty());
        assert!(constant.ideal_is_one().unwrap());

        let zero = Ideal::with_generators(kind, [Expr::zero()]);
        assert!(zero.ideal_is_zero());
        assert!(!zero.ideal_is_one().unwrap());
    }

    #[test]
    fn radical_membership() {
        let (kind, p) = parameters(&["x", "y"]);
        let ideal = Ideal::with_generators(kind, [p[0].powi(2)]);
        assert!(!ideal.contains(&p[0]).unwrap());
        assert!(ideal.radical_contains(&p[0]).unwrap());
        assert!(!ideal.radical_contains(&p[1]).unwrap());
    }

    #[test]
    fn reduce_coefficients() {
        let (kind, p) = parameters(&["x"]);
        let vectors = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let e = vectors.numbered_many(2).unwrap().iter().map(Expr::from).collect::<Vec<_>>();
        let ideal = Ideal::with_generators(kind, [p[0].powi(2) - Expr::from(2)]);

        let form = p[0].powi(3) * &e[0] + (p[0].powi(2) + Expr::one()) * &e[1];
        assert_eq!(
            ideal.reduce_modulo_by(&form, &Domain::Vectors).unwrap(),
            Expr::from(2) * &p[0] * &e[0] + Expr::from(3) * &e[1],
        );
        assert!(ideal.reduce_modulo(&form).unwrap_err().is::<InvalidArgument>());
    }

    #[test]
    fn intersections() {
        let (kind, p) = parameters(&["x", "y"]);
        let (x, y) = (&p[0], &p[1]);
        let first = Ideal::with_generators(kind, [x.clone()]);
        let second = Ideal::with_generators(kind, [y.clone()]);

        let meet = first.intersected(&second).unwrap();
        assert!(meet.contains(&(x * y)).unwrap());
        assert!(!meet.contains(x).unwrap());

        assert!(first.intersected(&Ideal::new(kind)).unwrap().ideal_is_zero());
        let units = Ideal::with_generators(kind, [Expr::from(2)])
            .intersected(&Ideal::with_generators(kind, [Expr::from(5)]))
            .unwrap();
        assert!(units.ideal_is_one().unwrap());
    }

    #[test]
    fn reduced_generators() {
        let (kind, p) = parameters(&["x", "y"]);
        let (x, y) = (&p[0], &p[1]);
        let mut ideal = Ideal::with_generators(kind, [x + y, x - y, Expr::from(2) * x]);
        ideal.reduce().unwrap();
        assert_eq!(ideal.generators(), &[x.clone(), y.clone()]);
    }

    #[test]
    fn elimination() {
        let (kind, p) = parameters(&["t", "x", "y", "z"]);
        let (t, x, y, z) = (&p[0], &p[1], &p[2], &p[3]);
        let mut ideal = Ideal::with_generators(
            kind,
            [x - y.powi(2), t - y.powi(2), x - x * z],
        );

        let solution = ideal.eliminate().unwrap();
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.get(x.as_symbol().unwrap()), Some(&y.powi(2)));
        assert_eq!(solution.get(t.as_symbol().unwrap()), Some(&y.powi(2)));

        let residual = y - y * z;
        assert_eq!(ideal.generators().len(), 1);
        assert!(ideal.generators()[0] == residual || ideal.generators()[0] == -residual);
    }

    #[test]
    fn chained_elimination() {
        let (kind, p) = parameters(&["a", "b", "c"]);
        let (a, b, c) = (&p[0], &p[1], &p[2]);
        let mut ideal = Ideal::with_generators(kind, [a - b, b - c - Expr::one()]);

        let solution = ideal.eliminate().unwrap();
        assert!(ideal.ideal_is_zero());
        for generator in [a - b, b - c - Expr::one()] {
            assert!(generator.subs(&solution).is_zero());
        }
    }

    #[test]
    fn inconsistent_elimination() {
        let (kind, p) = parameters(&["x"]);
        let generators = [&p[0] - Expr::one(), &p[0] - Expr::from(2)];
        let mut ideal = Ideal::with_generators(kind, generators.clone());

        let err = ideal.eliminate().unwrap_err();
        assert!(err.is::<InconsistentDeclaration>());
        assert_eq!(ideal.generators(), &generators);
    }
}
