//! Symbolic expressions over simple elements.
//!
//! # Expression representation
//!
//! Expressions are trees of [`Expr`] nodes, built from [`Symbol`]s (the simple elements declared
//! through a [`Kind`]), exact rational numbers, the imaginary unit, and calls to named functions.
//! Unlike a plain syntax tree, every arithmetic operation on [`Expr`] returns the expression in
//! **canonical form**:
//!
//! - a sum of terms, sorted and with like terms combined,
//! - each term a rational coefficient times a sorted product of scalar factors with integer
//!   exponents, times a normalized wedge word of vector elements.
//!
//! Positive integer powers of sums are multiplied out; negative powers of sums, non-integer powers
//! and function calls are kept as opaque factors.
//!
//! The canonical form of a polynomial expression is unique, so [`PartialEq`] on canonical
//! polynomial expressions is exact equality: `a*b == -(b*a)` holds for anticommuting `a` and `b`
//! without any further simplification step. This no longer holds once sums appear in denominators:
//! `(x + y) * (1/(x + y) + 1/(x - y))` is not brought to a common denominator, and compares unequal
//! to `(2*x) / (x - y)`. To compare rational expressions, test the difference with
//! [`Expr::is_zero`].
//!
//! ```
//! use wedge_compute::symbolic::{Algebra, Expr, Kind, Policy};
//!
//! let params = Kind::declare("p", Policy::Named, Algebra::Scalar);
//! let x = Expr::from(params.named("x").unwrap());
//! let y = Expr::from(params.named("y").unwrap());
//!
//! let square = (&x + &y).powi(2);
//! assert_eq!(square, &x * &x + Expr::from(2) * &x * &y + &y * &y);
//! ```
//!
//! Expressions built by hand from the [`Expr`] variants are not necessarily canonical; use
//! [`Expr::expand`] to bring them into canonical form.
//!
//! # Kinds and domains
//!
//! Most operations in this crate only care about the elements of some kinds: a linear operator
//! acts on vectors and treats everything else as a coefficient, an ideal treats the elements of a
//! parameter kind as variables. A [`Domain`] describes such a set of symbols.

pub mod expr;
pub mod extract;
pub mod kind;
pub mod subs;
pub mod wedge;

pub use expr::{Call, Expr, Primary, Term};
pub use extract::{coefficients, get_coefficients, get_simple, get_symbols};
pub use kind::{Algebra, Kind, Policy, Symbol};
pub use subs::Substitution;
pub use wedge::{homogeneous_degree, is_odd, normalize_product, polynomial_degree, Sign};

use std::collections::BTreeSet;

/// A set of simple elements that an operation should act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// Every element of a vector kind ([`Algebra::Exterior`] or [`Algebra::Symmetric`]).
    Vectors,

    /// Every element of the given kinds.
    Kinds(Vec<Kind>),

    /// Exactly the given symbols.
    Symbols(BTreeSet<Symbol>),
}

impl Domain {
    /// Returns true if the given symbol belongs to the domain.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Self::Vectors => !symbol.is_scalar(),
            Self::Kinds(kinds) => kinds.contains(&symbol.kind()),
            Self::Symbols(symbols) => symbols.contains(symbol),
        }
    }
}

impl From<Kind> for Domain {
    fn from(kind: Kind) -> Self {
        Self::Kinds(vec![kind])
    }
}

impl FromIterator<Symbol> for Domain {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self::Symbols(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a Symbol> for Domain {
    fn from_iter<T: IntoIterator<Item = &'a Symbol>>(iter: T) -> Self {
        Self::Symbols(iter.into_iter().cloned().collect())
    }
}
