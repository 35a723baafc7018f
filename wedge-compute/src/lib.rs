//! Exact symbolic computation in exterior algebras.
//!
//! This crate provides the pieces needed to manipulate differential forms and other elements of
//! exterior (and symmetric) algebras with exact coefficients:
//!
//! - [`symbolic`]: the expression type [`Expr`], the registry of simple elements ([`Kind`] and
//!   [`Symbol`]), the wedge-product normalization, substitution and coefficient extraction.
//! - [`operator`]: traits describing additive, linear, bilinear, Leibniz and derivation operators,
//!   each of which is defined by its action on simple elements and then extended to arbitrary
//!   expressions, plus a handful of concrete operators (interior product, exterior derivative from
//!   a table, partial derivatives, ...).
//! - [`linalg`]: bases with automatic removal of linearly dependent generators, vector spaces with
//!   symbolic coordinates, subspaces with complements, and a linear equation solver.
//! - [`poly`]: multivariate polynomials over the rationals, Gröbner bases, and the [`Ideal`] type
//!   used to eliminate parameters.
//! - [`declare`]: imposing that a parameter-dependent expression vanishes, and rewriting every
//!   piece of state that depends on those parameters.
//!
//! ```
//! use wedge_compute::symbolic::{Algebra, Expr, Kind, Policy};
//! use wedge_compute::operator::hook;
//!
//! let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
//! let a = Expr::from(kind.numbered().unwrap());
//! let b = Expr::from(kind.numbered().unwrap());
//! let c = Expr::from(kind.numbered().unwrap());
//!
//! // skew-commutativity is applied eagerly
//! assert_eq!(&a * &b, -(&b * &a));
//! assert!((&a * &a).is_zero());
//!
//! // interior product of `a` into `a*b*c`
//! assert_eq!(hook(&a, &(&a * &b * &c)), &b * &c);
//! ```

pub mod declare;
pub mod error;
pub mod linalg;
pub mod operator;
pub mod poly;
pub mod primitive;
pub mod symbolic;

pub use error::Result;
pub use linalg::{Basis, SubBasis, Subspace, VSpace, VectorSpace};
pub use poly::Ideal;
pub use symbolic::{Domain, Expr, Kind, Substitution, Symbol};
