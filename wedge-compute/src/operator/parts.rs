//! Real and imaginary parts.
//!
//! Every simple element and every function call is assumed to be real, so the imaginary part of a
//! term is its coefficient of the imaginary unit.

use crate::symbolic::{Expr, Primary, Term};
use super::AdditiveOperator;

/// Splits a term into its real part (if it does not contain `i`) or its imaginary part (if it does).
fn split(term: &Term) -> (Option<Term>, Option<Term>) {
    match term.factors.iter().position(|(base, _)| *base == Expr::Primary(Primary::I)) {
        Some(i) => {
            let mut imaginary = term.clone();
            imaginary.factors.remove(i);
            (None, Some(imaginary))
        },
        None => (Some(term.clone()), None),
    }
}

/// Maps an expression to its real part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealPart;

impl AdditiveOperator for RealPart {
    fn apply_term(&self, term: &Term) -> Expr {
        split(term).0.map(Expr::from).unwrap_or_else(Expr::zero)
    }
}

/// Maps an expression to its imaginary part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImaginaryPart;

impl AdditiveOperator for ImaginaryPart {
    fn apply_term(&self, term: &Term) -> Expr {
        split(term).1.map(Expr::from).unwrap_or_else(Expr::zero)
    }
}

impl Expr {
    /// Returns the real part of the expression.
    pub fn re(&self) -> Expr {
        RealPart.apply(self)
    }

    /// Returns the imaginary part of the expression.
    pub fn im(&self) -> Expr {
        ImaginaryPart.apply(self)
    }
}
