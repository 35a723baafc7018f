//! Extraction of coefficients and simple elements from expressions.

use std::collections::{BTreeMap, BTreeSet};
use super::{normalize_product, Domain, Expr, Primary, Symbol, Term};

/// Splits a term into `(outside, inside)` such that `term == outside * inside`, where `inside`
/// collects the scalar factors selected by `factor` and the word symbols selected by `letter`.
///
/// `inside` has coefficient 1; the coefficient of the term, and the sign picked up by moving the
/// selected word symbols to the right, go to `outside`.
fn split_term(
    term: &Term,
    factor: impl Fn(&Expr) -> bool,
    letter: impl Fn(&Symbol) -> bool,
) -> (Expr, Expr) {
    let (inside_factors, outside_factors): (Vec<_>, Vec<_>) = term.factors.iter()
        .cloned()
        .partition(|(base, _)| factor(base));
    let (inside_word, outside_word): (Vec<_>, Vec<_>) = term.word.iter()
        .cloned()
        .partition(|symbol| letter(symbol));

    let mut coefficient = term.coefficient.clone();
    let mut reordered = outside_word.clone();
    reordered.extend(inside_word.iter().cloned());
    if let Some((sign, _)) = normalize_product(&reordered) {
        coefficient *= sign.to_rational();
    }

    let outside = Term { coefficient, factors: outside_factors, word: outside_word };
    let inside = Term { coefficient: 1.into(), factors: inside_factors, word: inside_word };
    (outside.to_expr(), inside.to_expr())
}

/// Returns true if the factor base is one of the simple elements of the domain.
fn is_domain_symbol(base: &Expr, domain: &Domain) -> bool {
    matches!(base, Expr::Primary(Primary::Symbol(symbol)) if domain.contains(symbol))
}

/// Groups the terms of an expression by their monomial in the elements of `domain`.
///
/// Returns a map from each domain monomial (a product of domain elements with coefficient 1, or
/// `1` for the terms containing none) to its coefficient, such that
/// `expr == Σ coefficient * monomial`. Coefficients never contain domain elements as factors, but
/// may contain them inside function calls or denominators.
pub fn coefficients(expr: &Expr, domain: &Domain) -> BTreeMap<Expr, Expr> {
    let mut groups = BTreeMap::<Expr, Expr>::new();
    for term in expr.terms() {
        let (coefficient, monomial) = split_term(
            &term,
            |base| is_domain_symbol(base, domain),
            |symbol| domain.contains(symbol),
        );
        let entry = groups.entry(monomial).or_insert_with(Expr::zero);
        *entry += coefficient;
    }
    groups.retain(|_, coefficient| !coefficient.is_zero());
    groups
}

/// Returns the coefficients of the expression with respect to the elements of `domain`, ordered
/// by monomial. Requiring the expression to vanish is equivalent to requiring every coefficient to
/// vanish.
pub fn get_coefficients(expr: &Expr, domain: &Domain) -> Vec<Expr> {
    coefficients(expr, domain).into_values().collect()
}

/// Returns the elements of `domain` occurring as factors of the terms of the expression. Elements
/// occurring only inside function calls, exponents or denominators are not included.
pub fn get_simple(expr: &Expr, domain: &Domain) -> BTreeSet<Symbol> {
    let mut symbols = BTreeSet::new();
    for term in expr.terms() {
        for (base, _) in &term.factors {
            if let Expr::Primary(Primary::Symbol(symbol)) = base {
                if domain.contains(symbol) {
                    symbols.insert(symbol.clone());
                }
            }
        }
        symbols.extend(term.word.iter().filter(|symbol| domain.contains(symbol)).cloned());
    }
    symbols
}

/// Returns every element of `domain` occurring anywhere in the expression.
pub fn get_symbols(expr: &Expr, domain: &Domain) -> BTreeSet<Symbol> {
    let mut symbols = expr.symbols();
    symbols.retain(|symbol| domain.contains(symbol));
    symbols
}

/// Groups the terms of an expression by the part that does not depend on the `parameters`.
///
/// Returns a map from each independent part (a product of factors involving non-parameter symbols
/// and the whole wedge word, with coefficient 1) to its value, a polynomial in the parameters. The
/// imaginary unit and constant atoms such as `ln(2)` are part of the value. Requiring the
/// expression to vanish for every value of the non-parameter symbols is equivalent to requiring
/// every value to vanish.
pub fn group_by_parameters(expr: &Expr, parameters: &Domain) -> BTreeMap<Expr, Expr> {
    let mut groups = BTreeMap::<Expr, Expr>::new();
    for term in expr.terms() {
        let (value, independent) = split_term(
            &term,
            |base| !base.symbols().iter().all(|symbol| parameters.contains(symbol)),
            |_| true,
        );
        let entry = groups.entry(independent).or_insert_with(Expr::zero);
        *entry += value;
    }
    groups.retain(|_, value| !value.is_zero());
    groups
}
