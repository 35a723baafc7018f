use std::borrow::Borrow;
use tracing::debug;
use crate::error::{render_list, EmptyAffineSpace, Error, InvalidArgument, Result};
use crate::operator::BilinearOperator;
use crate::symbolic::{get_coefficients, Expr, Kind, Substitution, Symbol};
use super::{lsolve, Basis, SubBasis};

/// A [`Basis`] together with one coordinate per basis vector.
///
/// The coordinates are fresh scalar symbols of the [coordinate kind](Kind::coordinate). They are
/// the unknown coefficients of the [generic element](VSpace::generic_element), and the unknowns
/// solved for by [`VSpace::get_solutions`]. Coordinates are created when the basis grows and kept
/// when it changes, so there is always exactly one coordinate per basis vector.
#[derive(Debug, Clone)]
pub struct VSpace<B: Borrow<Basis>> {
    basis: B,
    coordinates: Vec<Symbol>,
}

/// A vector space: the span of a [`Basis`].
pub type VectorSpace = VSpace<Basis>;

/// A subspace with a chosen complement: the span of a [`SubBasis`].
pub type Subspace = VSpace<SubBasis>;

impl<B: Borrow<Basis>> VSpace<B> {
    /// Creates the space spanned by the given basis.
    pub fn from_basis(basis: B) -> Self {
        let mut space = Self { basis, coordinates: Vec::new() };
        space.update_coordinates();
        space
    }

    /// Makes the coordinates match the basis: keeps the existing ones, creating new ones if the
    /// basis grew and forgetting the last ones if it shrank.
    fn update_coordinates(&mut self) {
        let dimension = self.basis.borrow().len();
        while self.coordinates.len() < dimension {
            self.coordinates.push(Kind::fresh_coordinate());
        }
        self.coordinates.truncate(dimension);
    }

    /// Applies `f` to the basis, then updates the coordinates.
    pub(crate) fn modify_basis(&mut self, f: impl FnOnce(&mut B)) {
        f(&mut self.basis);
        self.update_coordinates();
    }

    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// The `i`-th basis vector.
    pub fn e(&self, i: usize) -> &Expr {
        &self.basis.borrow()[i]
    }

    pub fn coordinates(&self) -> &[Symbol] {
        &self.coordinates
    }

    pub fn dimension(&self) -> usize {
        self.basis.borrow().len()
    }

    /// Returns `Σ c_i e_i`, where `c_i` are the coordinates and `e_i` the basis vectors.
    pub fn generic_element(&self) -> Expr {
        self.coordinates.iter()
            .zip(self.basis.borrow())
            .map(|(c, e)| Expr::from(c) * e)
            .sum()
    }

    pub fn contains(&self, vector: &Expr) -> bool {
        self.basis.borrow().contains(vector)
    }

    /// Returns the components of `vector` in the basis, or a
    /// [`NotInSpan`](crate::error::NotInSpan) error.
    pub fn components(&self, vector: &Expr) -> Result<Vec<Expr>> {
        self.basis.borrow().components(vector)
    }

    /// Solves equations in the coordinates, returning the affine space of solutions as a list of
    /// independent directions together with an offset.
    ///
    /// Each equation may be a scalar or a vector; a vector equation stands for the vanishing of
    /// each of its coefficients. The solutions are the vectors `offset + Σ t_i directions[i]`. There
    /// is one direction per coordinate left free by the solution, obtained by setting that
    /// coordinate to 1 and the other free ones to 0 and subtracting the offset.
    ///
    /// Returns an [`EmptyAffineSpace`] error if the equations have no solution and the space has
    /// positive dimension; the space of dimension 0 solves every system with its zero vector.
    /// Returns an [`InvalidArgument`] error if the equations are not linear in the coordinates.
    #[tracing::instrument(skip_all, fields(equations = equations.len(), dimension = self.dimension()))]
    pub fn get_affine_solutions(&self, equations: &[Expr]) -> Result<(Vec<Expr>, Expr)> {
        if self.dimension() == 0 {
            return Ok((Vec::new(), Expr::zero()));
        }

        let domain = self.basis.borrow().domain();
        let scalar_equations = equations.iter()
            .flat_map(|equation| get_coefficients(equation, domain))
            .collect::<Vec<_>>();
        let Some(solution) = lsolve(&scalar_equations, &self.coordinates)? else {
            let (text, _) = render_list(equations);
            return Err(Error::new(text, EmptyAffineSpace));
        };

        let generic = self.generic_element().subs(&solution);
        let free = self.coordinates.iter()
            .filter(|c| !solution.contains(c))
            .collect::<Vec<_>>();
        let evaluate_at = |one: Option<&Symbol>| {
            let point = free.iter()
                .map(|&c| {
                    let value = if Some(c) == one { Expr::one() } else { Expr::zero() };
                    (c.clone(), value)
                })
                .collect::<Substitution>();
            generic.subs(&point)
        };

        let offset = evaluate_at(None);
        let directions = free.iter()
            .map(|&c| evaluate_at(Some(c)) - &offset)
            .collect::<Vec<_>>();
        debug!(solutions = directions.len(), affine = !offset.is_zero(), "solved in coordinates");
        Ok((directions, offset))
    }

    /// Solves linear homogeneous equations in the coordinates, returning a basis of the space of
    /// solutions.
    ///
    /// Returns an [`InvalidArgument`] error if the solutions only form an affine space, which
    /// [`VSpace::get_affine_solutions`] returns instead.
    pub fn get_solutions(&self, equations: &[Expr]) -> Result<Vec<Expr>> {
        let (directions, offset) = self.get_affine_solutions(equations)?;
        if !offset.is_zero() {
            let (text, _) = render_list(equations);
            return Err(Error::new(
                text,
                InvalidArgument::new("the solutions form an affine space, not a vector space"),
            ));
        }
        Ok(directions)
    }

    /// The equations stating that the generic element is orthogonal to each of the given vectors
    /// under `metric`.
    pub fn orthogonal_equations(
        &self,
        vectors: &[Expr],
        metric: &dyn BilinearOperator,
    ) -> Vec<Expr> {
        let generic = self.generic_element();
        vectors.iter().map(|vector| metric.apply(&generic, vector)).collect()
    }

    /// The subspace spanned by `generators`, with a complement orthogonal to it under `metric` if
    /// given, or spanned by basis vectors of this space otherwise.
    pub fn subspace(
        &self,
        generators: impl IntoIterator<Item = Expr>,
        metric: Option<&dyn BilinearOperator>,
    ) -> Result<Subspace> {
        let sub = Basis::with_domain(self.basis.borrow().domain().clone(), generators);
        self.complete(sub, metric)
    }

    /// The subspace of the vectors whose coordinates solve `equations`, with a complement as in
    /// [`VSpace::subspace`].
    pub fn subspace_from_equations(
        &self,
        equations: &[Expr],
        metric: Option<&dyn BilinearOperator>,
    ) -> Result<Subspace> {
        let solutions = self.get_solutions(equations)?;
        self.subspace(solutions, metric)
    }

    /// Chooses a complement of `sub` in this space.
    fn complete(&self, sub: Basis, metric: Option<&dyn BilinearOperator>) -> Result<Subspace> {
        let complement = match metric {
            Some(metric) => {
                let equations = self.orthogonal_equations(sub.elements(), metric);
                self.get_solutions(&equations)?
            },
            None => {
                let full = Basis::with_domain(
                    sub.domain().clone(),
                    sub.iter().chain(self.basis.borrow()).cloned(),
                );
                full.elements()[sub.len().min(full.len())..].to_vec()
            },
        };
        debug!(dimension = sub.len(), codimension = complement.len(), "completed subspace");
        Ok(VSpace::from_basis(SubBasis::new(sub, complement)))
    }
}

impl VectorSpace {
    /// Creates the vector space spanned by the given generators.
    pub fn new(generators: impl IntoIterator<Item = Expr>) -> Self {
        Self::from_basis(Basis::new(generators))
    }

    /// Creates a vector space of forms in the elements of `domain`.
    pub fn with_domain(
        domain: crate::symbolic::Domain,
        generators: impl IntoIterator<Item = Expr>,
    ) -> Self {
        Self::from_basis(Basis::with_domain(domain, generators))
    }

    /// Inserts generators at position `at`; see [`Basis::insert`].
    pub fn insert(&mut self, at: usize, generators: impl IntoIterator<Item = Expr>) {
        self.modify_basis(|basis| basis.insert(at, generators));
    }

    pub fn push(&mut self, generator: Expr) {
        self.modify_basis(|basis| basis.push(generator));
    }

    pub fn clear(&mut self) {
        self.modify_basis(Basis::clear);
    }
}

impl Subspace {
    /// The generators of the complement.
    pub fn complement(&self) -> &[Expr] {
        self.basis.complement()
    }

    /// The component of `vector` in the subspace, along the complement.
    pub fn project(&self, vector: &Expr) -> Result<Expr> {
        self.basis.split(vector).map(|(inside, _)| inside)
    }

    /// The component of `vector` in the complement, along the subspace.
    pub fn project_on_complement(&self, vector: &Expr) -> Result<Expr> {
        self.basis.split(vector).map(|(_, outside)| outside)
    }
}

/// Two spaces are equal if they have the same dimension and contain each other's basis.
impl<B: Borrow<Basis>, C: Borrow<Basis>> PartialEq<VSpace<C>> for VSpace<B> {
    fn eq(&self, other: &VSpace<C>) -> bool {
        self.dimension() == other.dimension()
            && other.basis.borrow().iter().all(|e| self.contains(e))
            && self.basis.borrow().iter().all(|e| other.contains(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotInSpan;
    use crate::operator::TrivialPairing;
    use crate::symbolic::{Algebra, Policy};
    use pretty_assertions::assert_eq;

    fn vectors(n: usize) -> Vec<Expr> {
        let kind = Kind::declare("v", Policy::Numbered, Algebra::Exterior);
        kind.numbered_many(n).unwrap().iter().map(Expr::from).collect()
    }

    #[test]
    fn coordinates_follow_the_basis() {
        let v = vectors(3);
        let mut space = VectorSpace::new([v[0].clone(), v[0].clone()]);
        assert_eq!(space.dimension(), 1);
        assert_eq!(space.coordinates().len(), 1);
        let first = space.coordinates()[0].clone();

        space.push(v[1].clone());
        space.push(Expr::from(2) * &v[1]);
        assert_eq!(space.coordinates().len(), 2);
        assert_eq!(space.coordinates()[0], first);
        assert_eq!(
            space.generic_element(),
            Expr::from(&first) * &v[0] + Expr::from(&space.coordinates()[1]) * &v[1],
        );

        space.clear();
        assert!(space.coordinates().is_empty());
        assert_eq!(space.generic_element(), Expr::zero());
    }

    #[test]
    fn homogeneous_solutions() {
        let v = vectors(3);
        let space = VectorSpace::new(v.clone());
        let c = space.coordinates().iter().map(Expr::from).collect::<Vec<_>>();

        let solutions = space.get_solutions(&[&c[0] - &c[1]]).unwrap();
        assert_eq!(solutions.len(), 2);
        let sub = VectorSpace::new(solutions);
        assert!(sub.contains(&(&v[0] + &v[1])));
        assert!(sub.contains(&v[2]));
        assert!(!sub.contains(&v[0]));
    }

    #[test]
    fn vector_equations() {
        let v = vectors(3);
        let space = VectorSpace::new(v.clone());
        let c = space.coordinates().iter().map(Expr::from).collect::<Vec<_>>();

        // (c0 - c2) v0 + c1 v1 = 0
        let equation = (&c[0] - &c[2]) * &v[0] + &c[1] * &v[1];
        let solutions = space.get_solutions(&[equation]).unwrap();
        assert_eq!(solutions, vec![&v[0] + &v[2]]);
    }

    #[test]
    fn affine_solutions() {
        let v = vectors(2);
        let space = VectorSpace::new(v.clone());
        let c = space.coordinates().iter().map(Expr::from).collect::<Vec<_>>();
        let equations = [&c[0] - Expr::from(3)];

        let (directions, offset) = space.get_affine_solutions(&equations).unwrap();
        assert_eq!(directions, vec![v[1].clone()]);
        assert_eq!(offset, Expr::from(3) * &v[0]);
        assert!(space.get_solutions(&equations).unwrap_err().is::<InvalidArgument>());

        let inconsistent = [c[0].clone(), c[0].clone() - Expr::one()];
        assert!(space.get_affine_solutions(&inconsistent).unwrap_err().is::<EmptyAffineSpace>());
    }

    #[test]
    fn zero_dimensional_space() {
        let space = VectorSpace::new(Vec::new());
        let (directions, offset) = space.get_affine_solutions(&[Expr::one()]).unwrap();
        assert!(directions.is_empty());
        assert!(offset.is_zero());
    }

    #[test]
    fn subspace_with_arbitrary_complement() {
        let v = vectors(3);
        let space = VectorSpace::new(v.clone());
        let sub = space.subspace([&v[0] + &v[1]], None).unwrap();
        assert_eq!(sub.dimension(), 1);
        assert_eq!(sub.complement().len(), 2);

        for e in &v {
            let inside = sub.project(e).unwrap();
            let outside = sub.project_on_complement(e).unwrap();
            assert_eq!(&inside + &outside, e.clone());
            assert!(sub.contains(&inside));
        }
    }

    #[test]
    fn subspace_with_orthogonal_complement() {
        let v = vectors(3);
        let space = VectorSpace::new(v.clone());
        let c = space.coordinates().iter().map(Expr::from).collect::<Vec<_>>();
        let pairing = TrivialPairing::default();

        let sub = space.subspace_from_equations(&[c[2].clone()], Some(&pairing)).unwrap();
        assert_eq!(sub, VectorSpace::new([v[0].clone(), v[1].clone()]));
        assert_eq!(sub.complement(), &[v[2].clone()]);

        let outside = sub.project_on_complement(&(&v[0] + &v[2])).unwrap();
        assert_eq!(outside, v[2].clone());
    }

    #[test]
    fn equality() {
        let v = vectors(3);
        let a = VectorSpace::new([v[0].clone(), v[1].clone()]);
        let b = VectorSpace::new([&v[0] + &v[1], &v[0] - &v[1]]);
        let c = VectorSpace::new([v[0].clone(), v[2].clone()]);
        assert_eq!(a, b);
        assert!(a != c);
        assert!(a.components(&v[2]).unwrap_err().is::<NotInSpan>());
    }
}
