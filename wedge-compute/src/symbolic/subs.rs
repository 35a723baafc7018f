//! Substitution of expressions for simple elements.

use std::{collections::{btree_map, BTreeMap}, fmt};
use super::{Call, Expr, Primary, Symbol};

/// A table mapping simple elements to the expressions that replace them.
///
/// Substitutions are produced by the linear solver, by [`Ideal::eliminate`] and by
/// [`declare_zero`], and are applied with [`Expr::subs`].
///
/// [`Ideal::eliminate`]: crate::poly::Ideal::eliminate
/// [`declare_zero`]: crate::declare::declare_zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Substitution {
    map: BTreeMap<Symbol, Expr>,
}

impl Substitution {
    /// Creates an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the replacement for `symbol`, returning the previous one if any.
    pub fn insert(&mut self, symbol: Symbol, value: Expr) -> Option<Expr> {
        self.map.insert(symbol, value)
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.map.get(symbol)
    }

    pub fn remove(&mut self, symbol: &Symbol) -> Option<Expr> {
        self.map.remove(symbol)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.map.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns an iterator over the replaced symbols and their replacements, ordered by symbol.
    pub fn iter(&self) -> btree_map::Iter<'_, Symbol, Expr> {
        self.map.iter()
    }

    /// Returns an iterator over the replaced symbols.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.map.keys()
    }

    /// Applies `other` to every replacement of this substitution.
    pub fn apply_to_values(&mut self, other: &Substitution) {
        for value in self.map.values_mut() {
            *value = value.subs(other);
        }
    }

    /// Returns the substitution that applies `self`, then `other`.
    ///
    /// Symbols replaced by both keep the replacement of `self` (with `other` applied to it).
    pub fn then(&self, other: &Substitution) -> Substitution {
        let mut composed = self.clone();
        composed.apply_to_values(other);
        for (symbol, value) in other {
            composed.map.entry(symbol.clone()).or_insert_with(|| value.clone());
        }
        composed
    }
}

impl FromIterator<(Symbol, Expr)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (Symbol, Expr)>>(iter: T) -> Self {
        Self { map: iter.into_iter().collect() }
    }
}

impl Extend<(Symbol, Expr)> for Substitution {
    fn extend<T: IntoIterator<Item = (Symbol, Expr)>>(&mut self, iter: T) {
        self.map.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Substitution {
    type Item = (&'a Symbol, &'a Expr);
    type IntoIter = btree_map::Iter<'a, Symbol, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl IntoIterator for Substitution {
    type Item = (Symbol, Expr);
    type IntoIter = btree_map::IntoIter<Symbol, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (symbol, value)) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", symbol, value)?;
        }
        write!(f, "}}")
    }
}

impl Expr {
    /// Replaces simple elements according to `subs`, returning the result in canonical form.
    ///
    /// The replacement is simultaneous: symbols occurring in the replacements are not replaced
    /// again.
    pub fn subs(&self, subs: &Substitution) -> Expr {
        if subs.is_empty() {
            return self.expand();
        }
        self.replace_symbols(&|symbol| subs.get(symbol).cloned())
    }

    /// Rebuilds the expression through canonical arithmetic, replacing every simple element for
    /// which `f` returns a value.
    pub fn replace_symbols(&self, f: &impl Fn(&Symbol) -> Option<Expr>) -> Expr {
        match self {
            Self::Primary(Primary::Symbol(symbol)) => f(symbol).unwrap_or_else(|| self.clone()),
            Self::Primary(Primary::Call(call)) => Self::Primary(Primary::Call(Call {
                name: call.name.clone(),
                derivatives: call.derivatives.clone(),
                args: call.args.iter().map(|arg| arg.replace_symbols(f)).collect(),
            })).expand(),
            Self::Primary(_) => self.clone(),
            Self::Add(terms) => terms.iter().map(|term| term.replace_symbols(f)).sum(),
            Self::Mul(factors) => factors.iter().map(|factor| factor.replace_symbols(f)).product(),
            Self::Wedge(word) => word.iter()
                .map(|symbol| f(symbol).unwrap_or_else(|| Expr::from(symbol)))
                .product(),
            Self::Exp(base, exp) => base.replace_symbols(f).pow(&exp.replace_symbols(f)),
        }
    }
}
