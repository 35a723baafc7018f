use once_cell::unsync::OnceCell;
use std::ops::Index;
use tracing::debug;
use crate::error::{Error, InvalidArgument, NotInSpan, Result};
use crate::operator::{BilinearOperator, TrivialPairing};
use crate::symbolic::{Domain, Expr};
use super::matrix::{inverse, Echelon};

/// An ordered sequence of vectors, automatically reduced to a linearly independent subsequence.
///
/// Inserted vectors are expanded and then **pruned**: the vectors are examined in order, and a
/// vector is kept if and only if it is not in the span of the vectors kept before it. The kept
/// vectors form the basis proper, and are followed in storage by the rejected ones (the
/// *extras*), which are discarded by the next insertion. Pruning preserves the filtration of the
/// input: the k-th kept vector is the first one raising the dimension of the span to k.
///
/// Vectors are decomposed with respect to the monomials in the simple elements of the basis'
/// [`Domain`] (all vectors by default); their coefficients should be scalars.
///
/// The decomposition used by [`Basis::components`] and the [dual basis](Basis::dual) are computed
/// on first use and cached until the next mutation.
#[derive(Debug, Clone)]
pub struct Basis {
    domain: Domain,
    elements: Vec<Expr>,
    size: usize,
    decomposition: OnceCell<Echelon>,
    dual: OnceCell<Vec<Expr>>,
}

impl Basis {
    /// Creates a basis of vectors from the given generators.
    pub fn new(generators: impl IntoIterator<Item = Expr>) -> Self {
        Self::with_domain(Domain::Vectors, generators)
    }

    /// Creates a basis from the given generators, decomposing vectors with respect to the elements
    /// of `domain`.
    pub fn with_domain(domain: Domain, generators: impl IntoIterator<Item = Expr>) -> Self {
        let mut basis = Self {
            domain,
            elements: Vec::new(),
            size: 0,
            decomposition: OnceCell::new(),
            dual: OnceCell::new(),
        };
        basis.insert(0, generators);
        basis
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The number of linearly independent vectors.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The linearly independent vectors.
    pub fn elements(&self) -> &[Expr] {
        &self.elements[..self.size]
    }

    /// The vectors rejected by the last pruning, because they were in the span of the vectors
    /// before them.
    pub fn extras(&self) -> &[Expr] {
        &self.elements[self.size..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.elements().iter()
    }

    pub fn get(&self, index: usize) -> Option<&Expr> {
        self.elements().get(index)
    }

    /// Inserts vectors at position `at` of the basis (clamped to its length), discards the extras,
    /// and prunes the result.
    pub fn insert(&mut self, at: usize, vectors: impl IntoIterator<Item = Expr>) {
        let at = at.min(self.size);
        self.elements.truncate(self.size);
        self.elements.splice(at..at, vectors.into_iter().map(|vector| vector.expand()));
        self.prune();
    }

    /// Appends a vector to the basis, if it is not in the span of the basis.
    pub fn push(&mut self, vector: Expr) {
        self.insert(self.size, [vector]);
    }

    /// Removes every vector.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.prune();
    }

    /// Replaces every stored vector, including the extras, by the given function of it and prunes
    /// the result again.
    pub(crate) fn map_elements(&mut self, f: impl Fn(&Expr) -> Expr) {
        self.elements = self.elements.iter().map(f).collect();
        self.prune();
    }

    /// Reorders the stored vectors so that the linearly independent ones come first, and clears
    /// the caches.
    #[tracing::instrument(skip_all, fields(candidates = self.elements.len()))]
    fn prune(&mut self) {
        let mut echelon = Echelon::new(self.domain.clone());
        let mut kept = Vec::with_capacity(self.elements.len());
        let mut extras = Vec::new();
        for vector in self.elements.drain(..) {
            if echelon.push(&vector) {
                kept.push(vector);
            } else {
                extras.push(vector);
            }
        }

        self.size = kept.len();
        kept.extend(extras);
        self.elements = kept;
        self.decomposition = OnceCell::new();
        self.dual = OnceCell::new();
        debug!(size = self.size, "pruned basis");
    }

    /// Returns the decomposition of the independent vectors, building it if needed.
    ///
    /// Panics if the rebuilt decomposition finds a different number of independent vectors than
    /// the last pruning.
    fn decomposition(&self) -> &Echelon {
        self.decomposition.get_or_init(|| {
            let mut echelon = Echelon::new(self.domain.clone());
            for vector in self.elements() {
                echelon.push(vector);
            }
            if echelon.rank() != self.size {
                panic!("pruning altered an already-initialized basis");
            }
            echelon
        })
    }

    /// Returns the coefficients expressing `vector` as a linear combination of the basis.
    ///
    /// Returns a [`NotInSpan`] error if the vector is not in the span of the basis.
    pub fn components(&self, vector: &Expr) -> Result<Vec<Expr>> {
        self.decomposition()
            .decompose(vector)
            .ok_or_else(|| Error::new(vector.to_string(), NotInSpan { dimension: self.size }))
    }

    /// Returns true if `vector` is in the span of the basis.
    pub fn contains(&self, vector: &Expr) -> bool {
        self.components(vector).is_ok()
    }

    /// Returns the linear combination of the basis with the given coefficients.
    pub fn combine(&self, components: &[Expr]) -> Expr {
        components.iter().zip(self.elements()).map(|(c, e)| c * e).sum()
    }

    /// Returns the dual basis: the vectors `d_i` in the span of the basis with
    /// `⟨d_i, e_j⟩ = δ_ij` under the [`TrivialPairing`] of the basis' domain.
    ///
    /// Returns an [`InvalidArgument`] error if the pairing is degenerate on the span of the basis,
    /// which cannot happen when the coefficients are real.
    pub fn dual(&self) -> Result<&[Expr]> {
        self.dual
            .get_or_try_init(|| {
                let pairing = TrivialPairing::new(self.domain.clone());
                let gram = self.iter()
                    .map(|e_i| self.iter().map(|e_j| pairing.apply(e_i, e_j)).collect())
                    .collect::<Vec<Vec<_>>>();
                let inverted = inverse(&gram).ok_or_else(|| {
                    Error::new("", InvalidArgument::new("the trivial pairing is degenerate on the basis"))
                })?;
                Ok(inverted.iter().map(|row| self.combine(row)).collect())
            })
            .map(Vec::as_slice)
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Index<usize> for Basis {
    type Output = Expr;

    fn index(&self, index: usize) -> &Expr {
        &self.elements()[index]
    }
}

impl<'a> IntoIterator for &'a Basis {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Expr> for Basis {
    fn from_iter<T: IntoIterator<Item = Expr>>(iter: T) -> Self {
        Self::new(iter)
    }
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
    fn pruning_keeps_first_independent() {
        let v = vectors(3);
        let basis = Basis::new([
            v[0].clone(),
            Expr::from(2) * &v[0],
            v[1].clone(),
            &v[0] + &v[1],
            v[2].clone(),
        ]);
        assert_eq!(basis.len(), 3);
        assert_eq!(basis.elements(), &[v[0].clone(), v[1].clone(), v[2].clone()]);
        assert_eq!(basis.extras(), &[Expr::from(2) * &v[0], &v[0] + &v[1]]);
    }

    #[test]
    fn insertion_discards_extras() {
        let v = vectors(3);
        let mut basis = Basis::new([v[0].clone(), v[0].clone()]);
        assert_eq!(basis.extras().len(), 1);

        basis.insert(0, [v[1].clone(), &v[0] + &v[1]]);
        assert_eq!(basis.elements(), &[v[1].clone(), &v[0] + &v[1]]);
        assert_eq!(basis.extras(), &[v[0].clone()]);

        basis.push(v[2].clone());
        assert_eq!(basis.len(), 3);
        assert!(basis.extras().is_empty());

        basis.clear();
        assert!(basis.is_empty());
    }

    #[test]
    fn components() {
        let v = vectors(4);
        let basis = Basis::new([v[0].clone(), &v[0] + &v[1], &v[1] + &v[2] + &v[3]]);
        assert_eq!(
            basis.components(&(&v[0] - &v[1])).unwrap(),
            vec![Expr::from(2), Expr::from(-1), Expr::zero()],
        );
        assert!(basis.components(&v[3]).unwrap_err().is::<NotInSpan>());
        assert!(basis.contains(&(&v[1] + &v[2] + &v[3] - &v[0])));
    }

    #[test]
    fn dual_basis() {
        let v = vectors(3);
        let basis = Basis::new([&v[0] + &v[1], &v[1] - &v[2], v[2].clone()]);
        let dual = basis.dual().unwrap();
        let pairing = TrivialPairing::default();
        for (i, d) in dual.iter().enumerate() {
            for (j, e) in basis.iter().enumerate() {
                let expected = if i == j { Expr::one() } else { Expr::zero() };
                assert_eq!(pairing.apply(d, e), expected);
            }
        }
    }

    #[test]
    fn forms_of_higher_degree() {
        let v = vectors(3);
        let basis = Basis::new([&v[0] * &v[1], &v[1] * &v[2], &v[0] * &v[1] - &v[2] * &v[1]]);
        assert_eq!(basis.len(), 2);
        assert!(!basis.contains(&(&v[0] * &v[2])));
        assert_eq!(basis.dual().unwrap().len(), 2);
    }
}
