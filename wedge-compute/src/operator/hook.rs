use crate::symbolic::{Domain, Expr, Symbol};
use super::{Derivation, LinearOperator};

/// The interior product `v ⌟ w` of a vector into a form.
///
/// The interior product is linear in `v`. For a simple element `a`, `a ⌟ -` is the skew
/// derivation sending each simple element `b` to `⟨a, b⟩`, the trivial pairing. Hence
/// `a ⌟ (a∧b∧c) = b∧c` and `b ⌟ (a∧b∧c) = -a∧c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    domain: Domain,
}

impl Hook {
    /// The interior product of the elements of `domain`.
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }

    /// Returns `v ⌟ w`.
    pub fn apply(&self, v: &Expr, w: &Expr) -> Expr {
        Contract { domain: &self.domain, form: w }.apply(v)
    }
}

impl Default for Hook {
    /// The interior product of all vectors.
    fn default() -> Self {
        Self::new(Domain::Vectors)
    }
}

/// The linear operator `v ↦ v ⌟ form`.
struct Contract<'a> {
    domain: &'a Domain,
    form: &'a Expr,
}

impl LinearOperator for Contract<'_> {
    fn domain(&self) -> &Domain {
        self.domain
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        HookBy { domain: self.domain, vector: symbol }.apply(self.form)
    }
}

/// The derivation `a ⌟ -` for a simple element `a`.
struct HookBy<'a> {
    domain: &'a Domain,
    vector: &'a Symbol,
}

impl Derivation for HookBy<'_> {
    fn domain(&self) -> &Domain {
        self.domain
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        if symbol == self.vector {
            Expr::one()
        } else {
            Expr::zero()
        }
    }
}

/// Returns the interior product `v ⌟ w` over all vectors.
pub fn hook(v: &Expr, w: &Expr) -> Expr {
    Hook::default().apply(v, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    #[test]
    fn contraction_signs() {
        let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let e = kind.numbered_many(3).unwrap().iter().map(Expr::from).collect::<Vec<_>>();
        let [a, b, c] = [&e[0], &e[1], &e[2]];
        let abc = a * b * c;

        assert_eq!(hook(a, &abc), b * c);
        assert_eq!(hook(b, &abc), -(a * c));
        assert_eq!(hook(c, &abc), a * b);
        assert_eq!(hook(c, &(&abc - a * b)), a * b);
        assert_eq!(hook(&(a + b), &(a * b)), b - a);
        assert_eq!(hook(a, &Expr::from(3)), Expr::zero());
    }

    #[test]
    fn hook_twice_vanishes() {
        let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let e = kind.numbered_many(3).unwrap().iter().map(Expr::from).collect::<Vec<_>>();
        let form = &e[0] * &e[1] * &e[2];
        let v = &e[0] + Expr::from(2) * &e[2];

        assert!(hook(&v, &hook(&v, &form)).is_zero());
    }
}
