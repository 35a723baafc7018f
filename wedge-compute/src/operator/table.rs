//! Operators given by a table of values on simple elements.

use std::collections::BTreeMap;
use crate::symbolic::{Domain, Expr, Substitution, Symbol};
use super::{BilinearOperator, Derivation, LinearOperator};

/// Returns the domain made of the symbols a table has entries for.
fn table_domain(table: &Substitution) -> Domain {
    table.symbols().collect()
}

/// A derivation given by its values on simple elements, such as the exterior derivative of a Lie
/// group given by `d(e_i) = -Σ c_jk^i e_j∧e_k`.
///
/// Simple elements missing from the table are annihilated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDerivation {
    table: Substitution,
    domain: Domain,
    skew: bool,
}

impl TableDerivation {
    /// Creates a skew derivation from a table of values.
    pub fn new(table: Substitution) -> Self {
        let domain = table_domain(&table);
        Self { table, domain, skew: true }
    }

    /// Creates a derivation that does not pick up signs, for symmetric algebras.
    pub fn even(table: Substitution) -> Self {
        Self { skew: false, ..Self::new(table) }
    }

    pub fn table(&self) -> &Substitution {
        &self.table
    }
}

impl Derivation for TableDerivation {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        self.table.get(symbol).cloned().unwrap_or_else(Expr::zero)
    }

    fn skew(&self) -> bool {
        self.skew
    }
}

/// A linear operator given by its values on simple elements.
///
/// Simple elements missing from the table are mapped to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearMap {
    table: Substitution,
    domain: Domain,
}

impl LinearMap {
    pub fn new(table: Substitution) -> Self {
        let domain = table_domain(&table);
        Self { table, domain }
    }

    /// Creates a linear map acting on `domain`, mapping the elements missing from `table` to zero.
    pub fn with_domain(table: Substitution, domain: Domain) -> Self {
        Self { table, domain }
    }
}

impl LinearOperator for LinearMap {
    fn domain(&self) -> &Domain {
        &self.domain
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        self.table.get(symbol).cloned().unwrap_or_else(Expr::zero)
    }
}

/// A bilinear operator given by its values on pairs of simple elements, such as a Lie bracket
/// given by structure constants.
///
/// Pairs missing from the table are mapped to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BilinearMap {
    table: BTreeMap<(Symbol, Symbol), Expr>,
    domain: Domain,
}

impl BilinearMap {
    /// Creates a bilinear map acting on `domain` in both arguments, with an empty table.
    pub fn new(domain: Domain) -> Self {
        Self { table: BTreeMap::new(), domain }
    }

    /// Sets the value on the pair `(left, right)`.
    pub fn insert(&mut self, left: Symbol, right: Symbol, value: Expr) {
        self.table.insert((left, right), value);
    }

    /// Creates a skew-symmetric bilinear map on `domain`: each entry `B(a, b) = v` also sets
    /// `B(b, a) = -v`.
    pub fn skew(domain: Domain, entries: impl IntoIterator<Item = (Symbol, Symbol, Expr)>) -> Self {
        let mut map = Self::new(domain);
        for (left, right, value) in entries {
            map.insert(right.clone(), left.clone(), -&value);
            map.insert(left, right, value);
        }
        map
    }
}

impl BilinearOperator for BilinearMap {
    fn left_domain(&self) -> &Domain {
        &self.domain
    }

    fn right_domain(&self) -> &Domain {
        &self.domain
    }

    fn apply_simple(&self, left: &Symbol, right: &Symbol) -> Expr {
        self.table
            .get(&(left.clone(), right.clone()))
            .cloned()
            .unwrap_or_else(Expr::zero)
    }
}
