//! Row reduction over expressions.
//!
//! Entries are canonical expressions and are compared to zero exactly. Pivots are chosen by
//! [`Expr::complexity`], so numeric entries are preferred. Rows are reduced fraction-free when the
//! pivot is not a number: `row = pivot * row - entry * pivot_row`. This keeps polynomial entries
//! polynomial, so that zero entries are recognized as such.

use std::collections::BTreeMap;
use crate::symbolic::{coefficients, Domain, Expr};

/// A sparse row of a matrix, mapping column indices to nonzero entries.
pub(crate) type SparseRow = BTreeMap<usize, Expr>;

/// Returns `alpha * lhs - beta * rhs`, dropping the entries that vanish.
pub(crate) fn combine(alpha: &Expr, lhs: &SparseRow, beta: &Expr, rhs: &SparseRow) -> SparseRow {
    let mut result = SparseRow::new();
    for (column, entry) in lhs {
        let value = match rhs.get(column) {
            Some(other) => alpha * entry - beta * other,
            None => alpha * entry,
        };
        if !value.is_zero() {
            result.insert(*column, value);
        }
    }
    for (column, other) in rhs {
        if !lhs.contains_key(column) {
            let value = -(beta * other);
            if !value.is_zero() {
                result.insert(*column, value);
            }
        }
    }
    result
}

/// Returns the column of the simplest entry of a nonzero row.
pub(crate) fn choose_pivot(row: &SparseRow) -> Option<usize> {
    row.iter()
        .min_by_key(|(_, entry)| entry.complexity())
        .map(|(column, _)| *column)
}

/// A row of an [`Echelon`] form.
#[derive(Debug, Clone)]
struct Row {
    /// The nonzero entries of the row.
    entries: SparseRow,

    /// The pivot column. Every later row is zero in this column.
    pivot: usize,

    /// The row as a linear combination of the accepted vectors, in order of acceptance.
    combination: Vec<Expr>,
}

/// A vector in the middle of being reduced against an [`Echelon`] form, with the invariant
///
/// ```text
/// entries = scale * v + Σ_j combination[j] * g_j
/// ```
///
/// where `v` is the vector being reduced and `g_j` the accepted vectors.
struct Reduction {
    entries: SparseRow,
    scale: Expr,
    combination: Vec<Expr>,
}

/// An incrementally built row echelon form of a sequence of vectors, used to find linearly
/// independent subsequences and to decompose vectors.
///
/// The columns are the monomials in the simple elements of the domain, numbered in order of first
/// appearance.
#[derive(Debug, Clone)]
pub(crate) struct Echelon {
    domain: Domain,
    columns: BTreeMap<Expr, usize>,
    rows: Vec<Row>,
}

impl Echelon {
    pub fn new(domain: Domain) -> Self {
        Self { domain, columns: BTreeMap::new(), rows: Vec::new() }
    }

    /// The number of accepted vectors.
    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    /// Converts a vector to a row, numbering new monomials as they appear.
    fn to_row(&mut self, vector: &Expr) -> SparseRow {
        let mut row = SparseRow::new();
        for (monomial, coefficient) in coefficients(vector, &self.domain) {
            let next = self.columns.len();
            let column = *self.columns.entry(monomial).or_insert(next);
            row.insert(column, coefficient);
        }
        row
    }

    /// Converts a vector to a row, or returns [`None`] if it contains a monomial that no accepted
    /// vector contains.
    fn existing_row(&self, vector: &Expr) -> Option<SparseRow> {
        coefficients(vector, &self.domain)
            .into_iter()
            .map(|(monomial, coefficient)| Some((*self.columns.get(&monomial)?, coefficient)))
            .collect()
    }

    /// Reduces a row against every row of the echelon form.
    fn reduce(&self, entries: SparseRow) -> Reduction {
        let mut reduction = Reduction {
            entries,
            scale: Expr::one(),
            combination: vec![Expr::zero(); self.rows.len()],
        };

        for row in &self.rows {
            let Some(entry) = reduction.entries.get(&row.pivot).cloned() else {
                continue;
            };
            let pivot = &row.entries[&row.pivot];

            if pivot.as_number().is_some() {
                let factor = &entry / pivot;
                reduction.entries = combine(&Expr::one(), &reduction.entries, &factor, &row.entries);
                for (j, coefficient) in row.combination.iter().enumerate() {
                    reduction.combination[j] -= &factor * coefficient;
                }
            } else {
                reduction.entries = combine(pivot, &reduction.entries, &entry, &row.entries);
                reduction.scale *= pivot;
                for (j, combined) in reduction.combination.iter_mut().enumerate() {
                    let value = match row.combination.get(j) {
                        Some(coefficient) => pivot * &*combined - &entry * coefficient,
                        None => pivot * &*combined,
                    };
                    *combined = value;
                }
            }
        }
        reduction
    }

    /// Adds a vector to the echelon form if it is linearly independent from the accepted vectors.
    ///
    /// Returns true if the vector was accepted.
    pub fn push(&mut self, vector: &Expr) -> bool {
        let entries = self.to_row(vector);
        let reduction = self.reduce(entries);
        let Some(pivot) = choose_pivot(&reduction.entries) else {
            return false;
        };

        let mut combination = reduction.combination;
        combination.push(reduction.scale);
        self.rows.push(Row { entries: reduction.entries, pivot, combination });
        true
    }

    /// Returns the coefficients expressing `vector` as a linear combination of the accepted
    /// vectors, or [`None`] if it is not in their span.
    pub fn decompose(&self, vector: &Expr) -> Option<Vec<Expr>> {
        let entries = self.existing_row(vector)?;
        let reduction = self.reduce(entries);
        if !reduction.entries.is_empty() {
            return None;
        }

        // 0 = scale * v + Σ c_j g_j
        Some(reduction.combination
            .iter()
            .map(|coefficient| -(coefficient / &reduction.scale))
            .collect())
    }
}

/// Inverts a square matrix by Gauss-Jordan elimination, or returns [`None`] if it is singular.
pub(crate) fn inverse(matrix: &[Vec<Expr>]) -> Option<Vec<Vec<Expr>>> {
    let n = matrix.len();
    let mut rows = matrix.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut augmented = row.clone();
            augmented.extend((0..n).map(|j| if i == j { Expr::one() } else { Expr::zero() }));
            augmented
        })
        .collect::<Vec<_>>();

    for column in 0..n {
        let pivot = (column..n)
            .filter(|&i| !rows[i][column].is_zero())
            .min_by_key(|&i| rows[i][column].complexity())?;
        rows.swap(column, pivot);

        let factor = rows[column][column].inverse();
        let normalized = rows[column].iter().map(|entry| entry * &factor).collect::<Vec<_>>();
        rows[column] = normalized;

        for i in 0..n {
            if i == column || rows[i][column].is_zero() {
                continue;
            }
            let entry = rows[i][column].clone();
            let reduced = rows[i].iter()
                .zip(&rows[column])
                .map(|(lhs, rhs)| lhs - &entry * rhs)
                .collect::<Vec<_>>();
            rows[i] = reduced;
        }
    }

    Some(rows.into_iter().map(|row| row[n..].to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    fn vectors(n: usize) -> Vec<Expr> {
        let kind = Kind::declare("v", Policy::Numbered, Algebra::Exterior);
        kind.numbered_many(n).unwrap().iter().map(Expr::from).collect()
    }

    #[test]
    fn independent_prefix() {
        let v = vectors(3);
        let mut echelon = Echelon::new(Domain::Vectors);
        assert!(echelon.push(&v[0]));
        assert!(echelon.push(&(&v[0] + &v[1])));
        assert!(!echelon.push(&(&v[1] - Expr::from(2) * &v[0])));
        assert!(!echelon.push(&Expr::zero()));
        assert!(echelon.push(&v[2]));
        assert_eq!(echelon.rank(), 3);
    }

    #[test]
    fn decomposition() {
        let v = vectors(4);
        let mut echelon = Echelon::new(Domain::Vectors);
        for generator in [v[0].clone(), &v[0] + &v[1], &v[1] + &v[2] + &v[3]] {
            echelon.push(&generator);
        }

        assert_eq!(
            echelon.decompose(&(&v[0] - &v[1])),
            Some(vec![Expr::from(2), Expr::from(-1), Expr::zero()]),
        );
        assert_eq!(echelon.decompose(&v[2]), None);
        assert_eq!(echelon.decompose(&(&v[0] * &v[1])), None);
    }

    #[test]
    fn symbolic_pivots() {
        let params = Kind::declare("p", Policy::Named, Algebra::Scalar);
        let [a, b] = ["a", "b"].map(|name| Expr::from(params.named(name).unwrap()));
        let v = vectors(2);

        let first = &a * &v[0] + &b * &v[1];
        let second = &b * &v[0] - &a * &v[1];
        let mut echelon = Echelon::new(Domain::Vectors);
        assert!(echelon.push(&first));
        assert!(echelon.push(&second));

        let target = &first + Expr::from(2) * &second;
        let components = echelon.decompose(&target).unwrap();
        assert_eq!(components, vec![Expr::one(), Expr::from(2)]);
    }

    #[test]
    fn matrix_inverse() {
        let matrix = vec![
            vec![Expr::from(2), Expr::from(1)],
            vec![Expr::from(1), Expr::from(1)],
        ];
        assert_eq!(inverse(&matrix), Some(vec![
            vec![Expr::from(1), Expr::from(-1)],
            vec![Expr::from(-1), Expr::from(2)],
        ]));

        let singular = vec![
            vec![Expr::from(1), Expr::from(2)],
            vec![Expr::from(2), Expr::from(4)],
        ];
        assert_eq!(inverse(&singular), None);
    }
}
