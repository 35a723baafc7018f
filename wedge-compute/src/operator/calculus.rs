use crate::symbolic::{Domain, Expr, Symbol};
use super::Leibniz;

/// The partial derivative with respect to a simple element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Differentiate {
    domain: Domain,
}

impl Differentiate {
    /// The partial derivative with respect to `symbol`.
    pub fn new(symbol: Symbol) -> Self {
        Self { domain: Domain::from_iter([symbol]) }
    }
}

impl Leibniz for Differentiate {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn apply_simple(&self, _: &Symbol) -> Expr {
        Expr::one()
    }
}

impl Expr {
    /// Returns the partial derivative of the expression with respect to `symbol`.
    ///
    /// Panics if the expression contains a wedge product of several vectors.
    pub fn diff(&self, symbol: &Symbol) -> Expr {
        Differentiate::new(symbol.clone()).apply(self)
    }
}
