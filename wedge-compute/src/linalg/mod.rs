//! Linear algebra over expressions.
//!
//! A [`Basis`] keeps the linearly independent vectors of the sequence it is built from and
//! decomposes vectors in terms of them. A [`VSpace`] attaches symbolic coordinates to a basis, so
//! that linear conditions on vectors can be solved as linear equations in the coordinates with
//! [`lsolve`]. A [`Subspace`] is a space whose basis is a [`SubBasis`], which also carries a
//! complement.
//!
//! Vectors are sums of scalar coefficients times monomials in the elements of a [`Domain`]
//! (all vectors by default). Coefficients may be symbolic, in which case linear independence is
//! decided over the field of rational functions in the symbols.
//!
//! ```
//! use wedge_compute::linalg::VectorSpace;
//! use wedge_compute::symbolic::{Algebra, Expr, Kind, Policy};
//!
//! let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
//! let e = kind.numbered_many(3).unwrap().iter().map(Expr::from).collect::<Vec<_>>();
//!
//! let space = VectorSpace::new([e[0].clone(), &e[0] + &e[1], e[1].clone()]);
//! assert_eq!(space.dimension(), 2);
//! assert!(space.contains(&(&e[0] - &e[1])));
//! assert!(!space.contains(&e[2]));
//! ```
//!
//! [`Domain`]: crate::symbolic::Domain

mod basis;
mod matrix;
pub mod solve;
mod subbasis;
mod vspace;

pub use basis::Basis;
pub use solve::lsolve;
pub use subbasis::SubBasis;
pub use vspace::{Subspace, VSpace, VectorSpace};
