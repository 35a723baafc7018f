//! The registry of simple elements.
//!
//! A [`Kind`] is a family of atomic symbols, such as the generators of a Lie algebra, the
//! coordinates of a vector space, or a set of unknown parameters. Each kind is declared once with
//! [`Kind::declare`], which fixes how its elements are identified ([`Policy`]) and how they
//! multiply ([`Algebra`]). Elements of a kind are [`Symbol`]s.
//!
//! Symbols are totally ordered: first by kind (in order of declaration), then by the key their
//! policy uses to identify them. This order is the one used to sort the factors of wedge products.

use crate::error::{Error, InvalidArgument, Result};
use once_cell::sync::Lazy;
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{atomic::{AtomicU32, AtomicU64, Ordering as AtomicOrdering}, Arc},
};

/// How the elements of a [`Kind`] are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Each element receives the next serial number from the registry, and elements compare by
    /// serial number.
    Numbered,

    /// Each element is given a name when constructed, and elements compare by name.
    Named,

    /// Each element has both a name and a serial number, and elements compare by name, then by
    /// serial number.
    NamedAndNumbered,
}

/// How the elements of a [`Kind`] multiply with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algebra {
    /// Commuting scalars, such as coordinates and parameters. Products of scalars are ordinary
    /// monomials and may contain powers.
    Scalar,

    /// Anticommuting vectors, such as one-forms. Transposing two of them flips the sign, and a
    /// product with a repeated factor is zero.
    Exterior,

    /// Commuting vectors that are kept apart from scalars, such as the factors of a symmetric
    /// tensor. Repeated factors are allowed.
    Symmetric,
}

/// The information stored about a declared [`Kind`].
#[derive(Debug)]
pub struct KindInfo {
    /// The name of the kind, used to print the elements of [`Policy::Numbered`] kinds.
    pub name: String,

    /// How elements of the kind are identified.
    pub policy: Policy,

    /// How elements of the kind multiply.
    pub algebra: Algebra,
}

/// A family of simple elements.
///
/// Kinds are cheap to copy. Two kinds are equal if and only if they were returned by the same
/// call to [`Kind::declare`].
#[derive(Clone, Copy)]
pub struct Kind {
    id: u32,
    info: &'static KindInfo,
}

/// Process-wide state handing out kind identifiers and serial numbers.
///
/// The counters start at process start and are never reset, so symbols created at different
/// times never share a serial number.
struct Registry {
    kinds: AtomicU32,
    serials: AtomicU64,
}

static REGISTRY: Registry = Registry {
    kinds: AtomicU32::new(0),
    serials: AtomicU64::new(1),
};

impl Registry {
    fn next_kind(&self) -> u32 {
        self.kinds.fetch_add(1, AtomicOrdering::Relaxed)
    }

    fn next_serial(&self) -> u64 {
        self.serials.fetch_add(1, AtomicOrdering::Relaxed)
    }
}

/// The kind of the coordinates that [`VSpace`](crate::linalg::VSpace)s attach to their bases.
static COORDINATE: Lazy<Kind> = Lazy::new(|| Kind::declare("c", Policy::Numbered, Algebra::Scalar));

impl Kind {
    /// Declares a new kind of simple elements.
    pub fn declare(name: impl Into<String>, policy: Policy, algebra: Algebra) -> Self {
        let info = Box::leak(Box::new(KindInfo { name: name.into(), policy, algebra }));
        Self { id: REGISTRY.next_kind(), info }
    }

    /// The built-in numbered scalar kind used for the coordinates of vector spaces.
    pub fn coordinate() -> Self {
        *COORDINATE
    }

    /// Returns the name of the kind.
    pub fn name(&self) -> &'static str {
        &self.info.name
    }

    /// Returns the policy of the kind.
    pub fn policy(&self) -> Policy {
        self.info.policy
    }

    /// Returns the algebra the elements of the kind belong to.
    pub fn algebra(&self) -> Algebra {
        self.info.algebra
    }

    /// Constructs a new element of this kind.
    ///
    /// Kinds with [`Policy::Numbered`] require `None`; the other policies require a name. Passing
    /// the wrong one returns an [`InvalidArgument`] error.
    pub fn construct(&self, name: Option<&str>) -> Result<Symbol> {
        let (name, serial) = match (self.policy(), name) {
            (Policy::Numbered, None) => (None, Some(REGISTRY.next_serial())),
            (Policy::Named, Some(name)) => (Some(Arc::from(name)), None),
            (Policy::NamedAndNumbered, Some(name)) => {
                (Some(Arc::from(name)), Some(REGISTRY.next_serial()))
            },
            (policy, name) => {
                return Err(Error::new(
                    name.unwrap_or_default(),
                    InvalidArgument::new(format!(
                        "kind `{}` is {:?} and cannot be constructed {}",
                        self.name(),
                        policy,
                        if name.is_some() { "from a name" } else { "without a name" },
                    )),
                ));
            },
        };
        Ok(Symbol { kind: *self, name, serial })
    }

    /// Constructs a new element of a [`Policy::Numbered`] kind.
    pub fn numbered(&self) -> Result<Symbol> {
        self.construct(None)
    }

    /// Constructs a new coordinate, an element of [`Kind::coordinate`].
    pub(crate) fn fresh_coordinate() -> Symbol {
        Symbol { kind: Self::coordinate(), name: None, serial: Some(REGISTRY.next_serial()) }
    }

    /// Constructs `n` new elements of a [`Policy::Numbered`] kind, in increasing order.
    pub fn numbered_many(&self, n: usize) -> Result<Vec<Symbol>> {
        (0..n).map(|_| self.numbered()).collect()
    }

    /// Constructs a new element of a [`Policy::Named`] or [`Policy::NamedAndNumbered`] kind.
    pub fn named(&self, name: &str) -> Result<Symbol> {
        self.construct(Some(name))
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({}#{})", self.info.name, self.id)
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

impl PartialOrd for Kind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A simple element: an atomic symbol belonging to some [`Kind`].
///
/// Symbols are ordered by kind, then by name, then by serial number. Within a kind only the keys
/// used by its [`Policy`] are set, so this is the order the policy describes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    kind: Kind,
    name: Option<Arc<str>>,
    serial: Option<u64>,
}

impl Symbol {
    /// Returns the kind of the symbol.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the name of the symbol, if its kind is named.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the serial number of the symbol, if its kind is numbered.
    pub fn serial(&self) -> Option<u64> {
        self.serial
    }

    /// Returns true if the symbol is a scalar, i.e. it commutes with everything and may be raised
    /// to powers.
    pub fn is_scalar(&self) -> bool {
        self.kind.algebra() == Algebra::Scalar
    }

    /// Returns true if the symbol is an element of an [`Algebra::Exterior`] kind.
    pub fn is_skew(&self) -> bool {
        self.kind.algebra() == Algebra::Exterior
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.serial) {
            (Some(name), _) => write!(f, "{}", name),
            (None, Some(serial)) => write!(f, "{}{}", self.kind.name(), serial),
            (None, None) => write!(f, "{}", self.kind.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbered_elements_are_ordered_by_creation() {
        let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let a = kind.numbered().unwrap();
        let b = kind.numbered().unwrap();
        assert!(a < b);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn named_elements_compare_by_name() {
        let kind = Kind::declare("param", Policy::Named, Algebra::Scalar);
        let x1 = kind.named("x").unwrap();
        let x2 = kind.named("x").unwrap();
        let y = kind.named("y").unwrap();
        assert_eq!(x1, x2);
        assert!(x1 < y);
        assert_eq!(x1.to_string(), "x");
    }

    #[test]
    fn named_and_numbered() {
        let kind = Kind::declare("f", Policy::NamedAndNumbered, Algebra::Scalar);
        let a = kind.named("a").unwrap();
        let a2 = kind.named("a").unwrap();
        let b = kind.named("b").unwrap();
        assert_ne!(a, a2);
        assert!(a < a2);
        assert!(a2 < b);
    }

    #[test]
    fn kinds_come_first() {
        let first = Kind::declare("z", Policy::Named, Algebra::Scalar);
        let second = Kind::declare("a", Policy::Named, Algebra::Scalar);
        let z = first.named("z").unwrap();
        let a = second.named("a").unwrap();
        assert!(z < a);

        // same name, different kinds
        let a_first = first.named("a").unwrap();
        assert_ne!(a_first, a);
    }

    #[test]
    fn policy_mismatch() {
        let numbered = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        let named = Kind::declare("x", Policy::Named, Algebra::Scalar);
        assert!(numbered.named("e1").unwrap_err().is::<InvalidArgument>());
        assert!(named.numbered().unwrap_err().is::<InvalidArgument>());
    }

    #[test]
    fn coordinate_kind_is_shared() {
        assert_eq!(Kind::coordinate(), Kind::coordinate());
        assert_eq!(Kind::coordinate().algebra(), Algebra::Scalar);
    }
}
