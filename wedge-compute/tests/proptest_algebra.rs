use once_cell::sync::Lazy;
use proptest::prelude::*;
use wedge_compute::operator::{hook, Derivation, TableDerivation};
use wedge_compute::symbolic::{
    homogeneous_degree,
    Algebra,
    Domain,
    Expr,
    Kind,
    Policy,
    Substitution,
    Symbol,
};

const DIMENSION: usize = 5;

static E: Lazy<Vec<Symbol>> = Lazy::new(|| {
    Kind::declare("e", Policy::Numbered, Algebra::Exterior)
        .numbered_many(DIMENSION)
        .unwrap()
});

/// The pairs `(j, k)` with `j < k`, indexing the basis of 2-forms.
static PAIRS: Lazy<Vec<(usize, usize)>> = Lazy::new(|| {
    (0..DIMENSION)
        .flat_map(|k| (0..k).map(move |j| (j, k)))
        .collect()
});

/// The product of the generators with the given indices, multiplied left to right.
fn product(indices: &[usize]) -> Expr {
    indices.iter()
        .map(|&i| Expr::from(&E[i]))
        .fold(Expr::one(), |acc, e| acc * e)
}

fn inversions(indices: &[usize]) -> usize {
    (0..indices.len())
        .flat_map(|i| (i + 1..indices.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| indices[i] > indices[j])
        .count()
}

/// The derivation sending `e_i` to the 2-form with the given components.
fn derivation(table: &[Vec<i64>]) -> TableDerivation {
    let values = table.iter().enumerate().map(|(i, components)| {
        let value = components.iter()
            .zip(PAIRS.iter())
            .map(|(&c, &(j, k))| Expr::from(c) * Expr::from(&E[j]) * Expr::from(&E[k]))
            .sum();
        (E[i].clone(), value)
    });
    TableDerivation::new(Substitution::from_iter(values))
}

fn arb_indices() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..DIMENSION, 0..5)
}

fn arb_table() -> impl Strategy<Value = Vec<Vec<i64>>> {
    proptest::collection::vec(proptest::collection::vec(-2i64..=2, PAIRS.len()), DIMENSION)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A product of generators is the sorted word with the sign of the sorting permutation, or
    /// zero if a generator repeats.
    #[test]
    fn products_are_skew(indices in arb_indices()) {
        let mut sorted = indices.clone();
        sorted.sort_unstable();

        let value = product(&indices);
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            prop_assert!(value.is_zero());
            prop_assert_eq!(value, Expr::zero());
        } else {
            let word = product(&sorted);
            let expected = if inversions(&indices) % 2 == 0 { word } else { -word };
            prop_assert_eq!(value, expected);
        }
    }

    #[test]
    fn transpositions_flip_sign(i in 0..DIMENSION, j in 0..DIMENSION) {
        let (a, b) = (Expr::from(&E[i]), Expr::from(&E[j]));
        prop_assert_eq!(&a * &b, -(&b * &a));
    }

    /// `D(a b) = D(a) b + (-1)^deg(a) a D(b)` for a skew derivation raising degrees by one.
    #[test]
    fn derivations_follow_the_graded_leibniz_rule(
        table in arb_table(),
        left in arb_indices(),
        right in arb_indices(),
    ) {
        let d = derivation(&table);
        let (a, b) = (product(&left), product(&right));
        let sign = if left.len() % 2 == 0 { Expr::one() } else { -Expr::one() };

        let lhs = d.apply(&(&a * &b));
        let rhs = d.apply(&a) * &b + sign * &a * d.apply(&b);
        prop_assert_eq!(lhs, rhs);
    }

    /// Contracting with a vector lowers degrees by one, and contracting twice gives zero.
    #[test]
    fn hooks_are_nilpotent(
        components in proptest::collection::vec(-2i64..=2, DIMENSION),
        indices in arb_indices(),
    ) {
        let v = components.iter()
            .zip(E.iter())
            .map(|(&c, e)| Expr::from(c) * Expr::from(e))
            .sum::<Expr>();
        let form = product(&indices);

        let contracted = hook(&v, &form);
        if !contracted.is_zero() {
            let degree = homogeneous_degree(&contracted, &Domain::Vectors).unwrap();
            prop_assert_eq!(degree + 1, indices.len());
        }
        prop_assert!(hook(&v, &contracted).is_zero());
    }
}
