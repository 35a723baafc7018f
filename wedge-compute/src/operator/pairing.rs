use crate::symbolic::{coefficients, Domain, Expr, Symbol};
use super::BilinearOperator;

/// The bilinear form under which distinct simple elements, and distinct wedge words of them, are
/// orthonormal.
///
/// On simple elements, `⟨a, b⟩` is 1 if `a == b` and 0 otherwise. The pairing extends to words by
/// declaring each normalized word orthonormal to every other, so that `⟨a∧b, a∧b⟩ = 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrivialPairing {
    domain: Domain,
}

impl TrivialPairing {
    /// The trivial pairing on the elements of `domain`.
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }
}

impl Default for TrivialPairing {
    /// The trivial pairing on all vectors.
    fn default() -> Self {
        Self::new(Domain::Vectors)
    }
}

impl BilinearOperator for TrivialPairing {
    fn left_domain(&self) -> &Domain {
        &self.domain
    }

    fn right_domain(&self) -> &Domain {
        &self.domain
    }

    fn apply_simple(&self, left: &Symbol, right: &Symbol) -> Expr {
        if left == right {
            Expr::one()
        } else {
            Expr::zero()
        }
    }

    fn apply(&self, left: &Expr, right: &Expr) -> Expr {
        let right = coefficients(right, &self.domain);
        coefficients(left, &self.domain)
            .iter()
            .filter_map(|(monomial, coefficient)| {
                right.get(monomial).map(|other| coefficient * other)
            })
            .sum()
    }
}
