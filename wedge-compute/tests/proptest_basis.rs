use once_cell::sync::Lazy;
use proptest::prelude::*;
use wedge_compute::linalg::{Basis, VectorSpace};
use wedge_compute::operator::{BilinearOperator, TrivialPairing};
use wedge_compute::symbolic::{Algebra, Expr, Kind, Policy, Symbol};

const DIMENSION: usize = 4;

static E: Lazy<Vec<Symbol>> = Lazy::new(|| {
    Kind::declare("e", Policy::Numbered, Algebra::Exterior)
        .numbered_many(DIMENSION)
        .unwrap()
});

/// The vector with the given components along `e_0, ..., e_3`.
fn vector(components: &[i64]) -> Expr {
    components.iter()
        .zip(E.iter())
        .map(|(&c, e)| Expr::from(c) * Expr::from(e))
        .sum()
}

/// An arbitrary vector with small integer components, possibly zero.
fn arb_vector() -> impl Strategy<Value = Expr> {
    proptest::collection::vec(-2i64..=2, DIMENSION).prop_map(|components| vector(&components))
}

fn arb_vectors() -> impl Strategy<Value = Vec<Expr>> {
    proptest::collection::vec(arb_vector(), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Spaces spanned by the same vectors in different orders are equal.
    #[test]
    fn span_is_independent_of_order(
        (vectors, shuffled) in arb_vectors().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let first = VectorSpace::new(vectors);
        let second = VectorSpace::new(shuffled);
        prop_assert_eq!(first.dimension(), second.dimension());
        prop_assert!(first == second);
    }

    /// Inserting a vector of the span does not change the dimension.
    #[test]
    fn pruning_is_idempotent(
        vectors in arb_vectors(),
        coefficients in proptest::collection::vec(-3i64..=3, 6),
        at in 0usize..8,
    ) {
        let mut space = VectorSpace::new(vectors.clone());
        let dimension = space.dimension();
        let combination = vectors.iter()
            .zip(&coefficients)
            .map(|(v, &c)| Expr::from(c) * v)
            .sum::<Expr>();

        space.insert(at, [combination.clone()]);
        prop_assert_eq!(space.dimension(), dimension);
        prop_assert!(space.contains(&combination));

        space.push(Expr::zero());
        prop_assert_eq!(space.dimension(), dimension);
    }

    /// A vector is kept exactly when it raises the rank of the vectors before it.
    #[test]
    fn pruning_preserves_the_filtration(vectors in arb_vectors()) {
        let basis = Basis::new(vectors.clone());
        let kept = (0..vectors.len())
            .filter(|&i| Basis::new(vectors[..=i].to_vec()).len() > Basis::new(vectors[..i].to_vec()).len())
            .map(|i| vectors[i].clone())
            .collect::<Vec<_>>();
        prop_assert_eq!(basis.elements(), kept.as_slice());
        prop_assert_eq!(basis.extras().len(), vectors.len() - kept.len());
    }

    /// Decomposing a combination of the basis recovers its coefficients.
    #[test]
    fn components_round_trip(
        vectors in arb_vectors(),
        coefficients in proptest::collection::vec(-3i64..=3, 6),
    ) {
        let basis = Basis::new(vectors);
        let coefficients = coefficients[..basis.len()]
            .iter()
            .map(|&c| Expr::from(c))
            .collect::<Vec<_>>();
        let v = basis.combine(&coefficients);

        let components = basis.components(&v).unwrap();
        prop_assert_eq!(&components, &coefficients);
        prop_assert_eq!(basis.combine(&components), v);
    }

    /// The dual basis pairs to the identity with the basis.
    #[test]
    fn dual_basis_is_biorthogonal(vectors in arb_vectors()) {
        let basis = Basis::new(vectors);
        let dual = basis.dual().unwrap();
        prop_assert_eq!(dual.len(), basis.len());

        let pairing = TrivialPairing::default();
        for (i, d) in dual.iter().enumerate() {
            for (j, e) in basis.iter().enumerate() {
                let expected = if i == j { Expr::one() } else { Expr::zero() };
                prop_assert_eq!(pairing.apply(d, e), expected);
            }
        }
    }
}
