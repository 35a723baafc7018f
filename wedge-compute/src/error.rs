//! The kinds of recoverable errors produced by this crate.
//!
//! Each kind is a plain struct implementing [`ErrorKind`](wedge_error::ErrorKind); callers
//! distinguish them with [`Error::is`] or [`Error::downcast_ref`]. Contract violations (such as
//! applying a linear operator to a polynomial) are not represented here, and panic instead.

use ariadne::Fmt;
use wedge_attrs::ErrorKind;
use wedge_error::{ErrorKind, EXPR};

pub use wedge_error::Error;

/// A [`Result`](std::result::Result) whose error is an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A structurally malformed input was passed to an operation.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("invalid argument: {}", self.message),
    labels = ["this expression"],
)]
pub struct InvalidArgument {
    /// What was wrong with the argument.
    pub message: String,
}

impl InvalidArgument {
    /// Creates an [`InvalidArgument`] error kind with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A vector is not in the span of a basis.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "vector is not in the span of the basis",
    labels = ["this vector"],
    help = format!("the basis has dimension {}", self.dimension.to_string().fg(EXPR)),
)]
pub struct NotInSpan {
    /// The dimension of the basis.
    pub dimension: usize,
}

/// The degree of an expression that mixes terms of different degrees was requested.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expression is not homogeneous",
    labels = ["this expression"],
    help = format!(
        "it contains terms of degree {} and {}",
        self.first.to_string().fg(EXPR),
        self.second.to_string().fg(EXPR),
    ),
)]
pub struct InhomogeneousExpression {
    /// The degree of the first term.
    pub first: i64,

    /// The degree of a later term that differs from the first.
    pub second: i64,
}

/// A requested algebraic condition cannot be satisfied.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the declaration is inconsistent",
    labels = ["this condition cannot hold"],
    help = "no value of the parameters satisfies every condition",
)]
pub struct InconsistentDeclaration;

/// A system of equations has no solution.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the affine space of solutions is empty",
    labels = ["these equations"],
)]
pub struct EmptyAffineSpace;

/// A documented gap in the implementation was hit.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("not implemented: {}", self.feature),
)]
pub struct NotImplemented {
    /// What is not implemented.
    pub feature: String,
}

/// Renders the given expressions as a comma-separated list, returning the text along with the
/// span of each expression in it. Used to attach the offending expressions to an [`Error`].
pub fn render_list<'a, T: std::fmt::Display + 'a>(
    items: impl IntoIterator<Item = &'a T>,
) -> (String, Vec<std::ops::Range<usize>>) {
    let mut text = String::new();
    let mut spans = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        let start = text.len();
        text.push_str(&item.to_string());
        spans.push(start..text.len());
    }
    (text, spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_are_distinguishable() {
        let err = Error::new("e1 + e2", NotInSpan { dimension: 1 });
        assert!(err.is::<NotInSpan>());
        assert!(!err.is::<InconsistentDeclaration>());
        assert_eq!(err.downcast_ref::<NotInSpan>(), Some(&NotInSpan { dimension: 1 }));
    }

    #[test]
    fn list_spans() {
        let (text, spans) = render_list(&["x + y", "z"]);
        assert_eq!(text, "x + y, z");
        assert_eq!(spans, vec![0..5, 7..8]);
    }

    #[test]
    fn invalid_argument_message() {
        let err = Error::new("x^2", InvalidArgument::new("equation is not linear"));
        assert_eq!(err.to_string(), "invalid argument: equation is not linear: x^2");
    }
}
