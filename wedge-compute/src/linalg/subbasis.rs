use once_cell::unsync::OnceCell;
use std::{borrow::Borrow, ops::Deref};
use crate::error::{Error, InvalidArgument, Result};
use crate::symbolic::Expr;
use super::Basis;

/// A [`Basis`] of a subspace together with generators of a complementary subspace.
///
/// The basis and the complement are assumed to span the whole space together and to be
/// independent; [`SubBasis::split`] fails if they are not.
#[derive(Debug, Clone)]
pub struct SubBasis {
    basis: Basis,
    complement: Vec<Expr>,
    full: OnceCell<Basis>,
}

impl SubBasis {
    pub fn new(basis: Basis, complement: Vec<Expr>) -> Self {
        let complement = complement.iter().map(Expr::expand).collect();
        Self { basis, complement, full: OnceCell::new() }
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn complement(&self) -> &[Expr] {
        &self.complement
    }

    /// The basis followed by the complement.
    fn full(&self) -> &Basis {
        self.full.get_or_init(|| Basis::with_domain(
            self.basis.domain().clone(),
            self.basis.iter().chain(&self.complement).cloned(),
        ))
    }

    /// Splits a vector of the whole space into its component in the subspace and its component in
    /// the complement.
    ///
    /// Returns a [`NotInSpan`](crate::error::NotInSpan) error if the vector is not in the span of
    /// the basis and the complement, or an [`InvalidArgument`] error if they are not independent.
    pub fn split(&self, vector: &Expr) -> Result<(Expr, Expr)> {
        let full = self.full();
        if full.len() != self.basis.len() + self.complement.len() {
            return Err(Error::new(
                vector.to_string(),
                InvalidArgument::new("the complement intersects the subspace"),
            ));
        }

        let components = full.components(vector)?;
        let (inside, outside) = components.split_at(self.basis.len());
        let projection = self.basis.combine(inside);
        let rest = outside.iter().zip(&self.complement).map(|(c, e)| c * e).sum();
        Ok((projection, rest))
    }

    /// Applies `f` to the basis and the complement.
    pub(crate) fn map_elements(&mut self, f: impl Fn(&Expr) -> Expr) {
        self.basis.map_elements(&f);
        self.complement = self.complement.iter().map(f).collect();
        self.full = OnceCell::new();
    }
}

impl Deref for SubBasis {
    type Target = Basis;

    fn deref(&self) -> &Basis {
        &self.basis
    }
}

impl Borrow<Basis> for SubBasis {
    fn borrow(&self) -> &Basis {
        &self.basis
    }
}
