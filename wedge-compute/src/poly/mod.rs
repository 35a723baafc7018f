//! Polynomials in parameters, Gröbner bases and ideals.
//!
//! Parameters are scalar simple elements standing for unknown numbers. Conditions on them are
//! polynomial equations, collected in an [`Ideal`]: the ideal can decide whether a polynomial
//! vanishes whenever the conditions hold ([`Ideal::contains`], [`Ideal::radical_contains`]),
//! bring expressions to a normal form modulo the conditions, and solve the conditions that are
//! linear in some parameter ([`Ideal::eliminate`]).
//!
//! The computations are done on [`Polynomial`]s in numbered variables with exact rational
//! coefficients, through the Gröbner bases of the [`groebner`] module.

pub mod groebner;
mod ideal;
mod polynomial;

pub use ideal::Ideal;
pub use polynomial::{Monomial, MonomialOrder, Polynomial};
