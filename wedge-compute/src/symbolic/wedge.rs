//! Normalization of wedge products and degree queries.

use crate::error::{Error, InhomogeneousExpression, InvalidArgument, Result};
use rug::Rational;
use std::ops::Neg;
use super::{Domain, Expr, Primary, Symbol, Term};

/// The sign picked up while sorting the factors of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    /// Returns `+1` or `-1`.
    pub fn to_rational(self) -> Rational {
        match self {
            Self::Plus => Rational::from(1),
            Self::Minus => Rational::from(-1),
        }
    }

    /// Returns [`Sign::Minus`] if `n` is odd.
    pub fn from_parity(n: usize) -> Self {
        if n % 2 == 0 { Self::Plus } else { Self::Minus }
    }
}

impl Neg for Sign {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
        }
    }
}

/// Sorts the factors of a product of simple elements into canonical order.
///
/// The factors are sorted with a stable adjacent-transposition (bubble) sort. Each transposition
/// of two [`Exterior`](super::Algebra::Exterior) elements flips the sign; all other transpositions
/// leave it unchanged. If two equal exterior elements end up next to each other, the product is
/// zero and [`None`] is returned. Repeated scalar or symmetric elements are kept.
pub fn normalize_product(factors: &[Symbol]) -> Option<(Sign, Vec<Symbol>)> {
    let mut factors = factors.to_vec();
    let mut sign = Sign::Plus;

    let mut sorted = false;
    while !sorted {
        sorted = true;
        for i in 1..factors.len() {
            if factors[i - 1] > factors[i] {
                if factors[i - 1].is_skew() && factors[i].is_skew() {
                    sign = -sign;
                }
                factors.swap(i - 1, i);
                sorted = false;
            }
        }
    }

    if factors.windows(2).any(|pair| pair[0] == pair[1] && pair[0].is_skew()) {
        return None;
    }

    Some((sign, factors))
}

impl Term {
    /// Returns the degree of the term in the elements of the given domain, counting both the
    /// factors of its wedge word and the exponents of its scalar factors. Negative powers count
    /// negatively.
    pub fn degree(&self, domain: &Domain) -> i64 {
        let word = self.word.iter().filter(|symbol| domain.contains(symbol)).count() as i64;
        let scalars = self.factors.iter()
            .filter_map(|(base, exp)| match base {
                Expr::Primary(Primary::Symbol(symbol)) if domain.contains(symbol) => Some(*exp),
                _ => None,
            })
            .sum::<i64>();
        word + scalars
    }
}

/// Returns the degree of an expression in the elements of the given domain.
///
/// Every term of the expression must have the same degree; otherwise an
/// [`InhomogeneousExpression`] error is returned. An expression whose terms all have the same
/// negative degree, such as `1 / x`, returns an [`InvalidArgument`] error. The zero expression has
/// degree 0.
pub fn homogeneous_degree(expr: &Expr, domain: &Domain) -> Result<usize> {
    let mut degrees = expr.terms().into_iter().map(|term| term.degree(domain));
    let Some(first) = degrees.next() else {
        return Ok(0);
    };

    if let Some(second) = degrees.find(|degree| *degree != first) {
        return Err(Error::new(expr.to_string(), InhomogeneousExpression { first, second }));
    }
    usize::try_from(first).map_err(|_| {
        Error::new(expr.to_string(), InvalidArgument::new(format!("negative degree {}", first)))
    })
}

/// Returns true if the expression has odd degree in the elements of the given domain.
///
/// The expression must be homogeneous, as in [`homogeneous_degree`].
pub fn is_odd(expr: &Expr, domain: &Domain) -> Result<bool> {
    Ok(homogeneous_degree(expr, domain)? % 2 == 1)
}

/// Returns the degree of an expression seen as a polynomial in the elements of the given domain:
/// the maximum degree of its terms. Terms of negative degree count as constants. Never fails; the
/// zero expression has degree 0.
pub fn polynomial_degree(expr: &Expr, domain: &Domain) -> usize {
    expr.terms()
        .into_iter()
        .map(|term| term.degree(domain))
        .max()
        .map_or(0, |degree| usize::try_from(degree).unwrap_or(0))
}
