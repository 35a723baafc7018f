//! Imposing conditions on parameters.
//!
//! Computations often start with unknown parameters, and later learn that some expression must
//! vanish. [`declare_zero`] solves the resulting conditions for the parameters and rewrites every
//! piece of state that depends on them, through the [`DependsOnParameters`] trait.
//!
//! ```
//! use wedge_compute::declare::declare_zero;
//! use wedge_compute::symbolic::{Algebra, Domain, Expr, Kind, Policy};
//!
//! let params = Kind::declare("p", Policy::Named, Algebra::Scalar);
//! let vectors = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
//! let a = Expr::from(params.named("a").unwrap());
//! let e = Expr::from(vectors.numbered().unwrap());
//!
//! let mut form = (&a - Expr::from(2)) * &e;
//! let solution = declare_zero(&mut form, &Domain::from(params), &[&a * &e - &e]).unwrap();
//! assert_eq!(solution.len(), 1);
//! assert_eq!(form, -e);
//! ```

use std::{borrow::Borrow, collections::BTreeSet};
use tracing::debug;
use crate::error::{
    render_list,
    Error,
    InconsistentDeclaration,
    InvalidArgument,
    NotImplemented,
    Result,
};
use crate::linalg::{lsolve, Basis, SubBasis, VSpace};
use crate::poly::Ideal;
use crate::symbolic::{extract::group_by_parameters, get_symbols, Domain, Expr, Substitution};

/// State that may contain parameters, and must be rewritten when their values become known.
pub trait DependsOnParameters {
    /// Replaces the parameters according to `substitution`.
    fn substitute(&mut self, substitution: &Substitution);
}

impl DependsOnParameters for () {
    fn substitute(&mut self, _: &Substitution) {}
}

impl DependsOnParameters for Expr {
    fn substitute(&mut self, substitution: &Substitution) {
        *self = self.subs(substitution);
    }
}

impl<T: DependsOnParameters> DependsOnParameters for Vec<T> {
    fn substitute(&mut self, substitution: &Substitution) {
        for item in self {
            item.substitute(substitution);
        }
    }
}

impl<T: DependsOnParameters> DependsOnParameters for Option<T> {
    fn substitute(&mut self, substitution: &Substitution) {
        if let Some(item) = self {
            item.substitute(substitution);
        }
    }
}

impl<T: DependsOnParameters + ?Sized> DependsOnParameters for &mut T {
    fn substitute(&mut self, substitution: &Substitution) {
        (**self).substitute(substitution);
    }
}

/// The values of a substitution are rewritten; its keys are not.
impl DependsOnParameters for Substitution {
    fn substitute(&mut self, substitution: &Substitution) {
        self.apply_to_values(substitution);
    }
}

/// The basis is pruned again, since vectors may become dependent.
impl DependsOnParameters for Basis {
    fn substitute(&mut self, substitution: &Substitution) {
        self.map_elements(|vector| vector.subs(substitution));
    }
}

impl DependsOnParameters for SubBasis {
    fn substitute(&mut self, substitution: &Substitution) {
        self.map_elements(|vector| vector.subs(substitution));
    }
}

/// The coordinates are kept, except those of the basis vectors that became dependent.
impl<B: Borrow<Basis> + DependsOnParameters> DependsOnParameters for VSpace<B> {
    fn substitute(&mut self, substitution: &Substitution) {
        self.modify_basis(|basis| basis.substitute(substitution));
    }
}

impl DependsOnParameters for Ideal {
    fn substitute(&mut self, substitution: &Substitution) {
        self.map_generators(|generator| generator.subs(substitution));
    }
}

impl<A: DependsOnParameters, B: DependsOnParameters> DependsOnParameters for (A, B) {
    fn substitute(&mut self, substitution: &Substitution) {
        self.0.substitute(substitution);
        self.1.substitute(substitution);
    }
}

impl<A, B, C> DependsOnParameters for (A, B, C)
where
    A: DependsOnParameters,
    B: DependsOnParameters,
    C: DependsOnParameters,
{
    fn substitute(&mut self, substitution: &Substitution) {
        self.0.substitute(substitution);
        self.1.substitute(substitution);
        self.2.substitute(substitution);
    }
}

/// Returns the equations on the parameters equivalent to the vanishing of `expr` for every value
/// of the other symbols: the real and imaginary parts of each coefficient.
fn parameter_equations(expr: &Expr, parameters: &Domain) -> Vec<Expr> {
    group_by_parameters(expr, parameters)
        .values()
        .flat_map(|value| [value.re(), value.im()])
        .filter(|equation| !equation.is_zero())
        .collect()
}

/// Declares that each of `exprs` vanishes identically, where the elements of `parameters` are
/// unknown real numbers, and rewrites `state` accordingly.
///
/// The conditions are that every coefficient of every expression, with respect to the symbols
/// other than the parameters, has vanishing real and imaginary parts. They must be linear in the
/// parameters; they are solved with [`lsolve`], and the solution is applied to `state` and
/// returned.
///
/// Returns an [`InconsistentDeclaration`] error if the conditions have no solution, or a
/// [`NotImplemented`] error if they are not linear. In both cases `state` is left unchanged.
#[tracing::instrument(skip_all, fields(expressions = exprs.len()))]
pub fn declare_zero<S: DependsOnParameters + ?Sized>(
    state: &mut S,
    parameters: &Domain,
    exprs: &[Expr],
) -> Result<Substitution> {
    let equations = exprs.iter()
        .flat_map(|expr| parameter_equations(expr, parameters))
        .collect::<Vec<_>>();
    let unknowns = equations.iter()
        .flat_map(|equation| get_symbols(equation, parameters))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();

    let (text, _) = render_list(exprs);
    let solution = match lsolve(&equations, &unknowns) {
        Err(err) if err.is::<InvalidArgument>() => {
            let feature = "conditions of degree higher than one in the parameters".to_string();
            return Err(Error::new(text, NotImplemented { feature }));
        },
        other => other?,
    };
    let Some(solution) = solution else {
        return Err(Error::new(text, InconsistentDeclaration));
    };
    debug!(equations = equations.len(), solved = solution.len(), "declared zero");
    state.substitute(&solution);
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::VectorSpace;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    struct Setup {
        parameters: Domain,
        p: Vec<Expr>,
        e: Vec<Expr>,
    }

    fn setup(names: &[&str]) -> Setup {
        let params = Kind::declare("param", Policy::Named, Algebra::Scalar);
        let vectors = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        Setup {
            parameters: Domain::from(params),
            p: names.iter().map(|name| Expr::from(params.named(name).unwrap())).collect(),
            e: vectors.numbered_many(3).unwrap().iter().map(Expr::from).collect(),
        }
    }

    #[test]
    fn coefficients_vanish() {
        let Setup { parameters, p, e } = setup(&["a", "b"]);
        let (a, b) = (&p[0], &p[1]);
        let expr = a * &e[0] + (b - Expr::one()) * &e[1] * &e[2];

        let mut state = (expr.clone(), vec![a + b]);
        let solution = declare_zero(&mut state, &parameters, &[expr.clone()]).unwrap();
        assert_eq!(solution.len(), 2);
        assert!(expr.subs(&solution).is_zero());
        assert_eq!(state.0, Expr::zero());
        assert_eq!(state.1, vec![Expr::one()]);
    }

    #[test]
    fn free_parameters_remain() {
        let Setup { parameters, p, e } = setup(&["a", "b"]);
        let (a, b) = (&p[0], &p[1]);
        let expr = (a - b) * &e[0];

        let mut value = a * b;
        let solution = declare_zero(&mut value, &parameters, &[expr.clone()]).unwrap();
        assert_eq!(solution.len(), 1);
        assert!(expr.subs(&solution).is_zero());
        assert!(value == a * a || value == b * b);
    }

    #[test]
    fn real_and_imaginary_parts() {
        let Setup { parameters, p, e } = setup(&["a", "b"]);
        let (a, b) = (&p[0], &p[1]);
        let expr = (a + Expr::i() * b - Expr::i()) * &e[0];

        let solution = declare_zero(&mut (), &parameters, &[expr.clone()]).unwrap();
        assert_eq!(solution.get(a.as_symbol().unwrap()), Some(&Expr::zero()));
        assert_eq!(solution.get(b.as_symbol().unwrap()), Some(&Expr::one()));
        assert!(expr.subs(&solution).is_zero());
    }

    #[test]
    fn complex_denominators() {
        let Setup { parameters, p, e } = setup(&["a", "b"]);
        let (a, b) = (&p[0], &p[1]);
        let expr = (a / (Expr::one() + Expr::i()) + b) * &e[0];

        let solution = declare_zero(&mut (), &parameters, &[expr.clone()]).unwrap();
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.get(a.as_symbol().unwrap()), Some(&Expr::zero()));
        assert_eq!(solution.get(b.as_symbol().unwrap()), Some(&Expr::zero()));
        assert!(expr.subs(&solution).is_zero());
    }

    #[test]
    fn inconsistent_declarations_change_nothing() {
        let Setup { parameters, p, e } = setup(&["a"]);
        let a = &p[0];
        let exprs = [(a - Expr::one()) * &e[0], (a - Expr::from(2)) * &e[1]];

        let mut state = (a.clone(), VectorSpace::new([a * &e[0], e[1].clone()]));
        let err = declare_zero(&mut state, &parameters, &exprs).unwrap_err();
        assert!(err.is::<InconsistentDeclaration>());
        assert_eq!(state.0, a.clone());
        assert_eq!(state.1.dimension(), 2);

        let constant = declare_zero(&mut state, &parameters, &[e[0].clone()]).unwrap_err();
        assert!(constant.is::<InconsistentDeclaration>());
    }

    #[test]
    fn nonlinear_declarations() {
        let Setup { parameters, p, e } = setup(&["a"]);
        let a = &p[0];
        let mut value = a.clone();
        let err = declare_zero(&mut value, &parameters, &[a * a * &e[0]]).unwrap_err();
        assert!(err.is::<NotImplemented>());
        assert_eq!(value, a.clone());
    }

    #[test]
    fn spaces_and_ideals_follow() {
        let Setup { parameters, p, e } = setup(&["a", "b"]);
        let (a, b) = (&p[0], &p[1]);

        let mut space = VectorSpace::new([e[0].clone(), &e[0] + a * &e[1]]);
        assert_eq!(space.dimension(), 2);
        let first = space.coordinates()[0].clone();
        let mut ideal = Ideal::with_generators(parameters.clone(), [a * b - Expr::one()]);
        let mut earlier = Substitution::from_iter([(b.as_symbol().unwrap().clone(), a + b)]);

        let mut state = (&mut space, &mut ideal, &mut earlier);
        declare_zero(&mut state, &parameters, &[a * &e[2]]).unwrap();

        assert_eq!(space.dimension(), 1);
        assert_eq!(space.coordinates(), &[first]);
        assert!(ideal.ideal_is_one().unwrap());
        assert_eq!(earlier.get(b.as_symbol().unwrap()), Some(b));
    }
}
