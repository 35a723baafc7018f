//! Operators defined by their action on simple elements.
//!
//! Each trait in this module describes a class of operators by the rule used to extend an action
//! on [`Symbol`]s to arbitrary expressions:
//!
//! | trait | extension rule |
//! | --- | --- |
//! | [`AdditiveOperator`] | term by term |
//! | [`LinearOperator`] | term by term, acting on the single domain factor of each term |
//! | [`BilinearOperator`] | linear in each argument |
//! | [`Leibniz`] | product rule over commutative products, with power and chain rules |
//! | [`Derivation`] | graded product rule over wedge words |
//!
//! Implementors only supply the action on simple elements (or on single terms); the provided
//! `apply` methods do the rest. Every method returns a new expression in canonical form.
//!
//! Some ways of using an operator are contract violations rather than errors, and panic: applying
//! a linear operator to a term with two domain factors, or a Leibniz operator to a wedge product
//! of several vectors.

mod calculus;
mod hook;
mod pairing;
mod parts;
mod product;
mod table;

pub use calculus::Differentiate;
pub use hook::{hook, Hook};
pub use pairing::TrivialPairing;
pub use parts::{ImaginaryPart, RealPart};
pub use table::{BilinearMap, LinearMap, TableDerivation};

use crate::symbolic::{Domain, Expr, Primary, Symbol, Term};

/// An operator that distributes over sums: `A(a + b) = A(a) + A(b)`.
pub trait AdditiveOperator {
    /// Applies the operator to a single term of a canonical expression.
    ///
    /// Numeric terms should usually be mapped to zero.
    fn apply_term(&self, term: &Term) -> Expr;

    /// Applies the operator to an expression.
    fn apply(&self, expr: &Expr) -> Expr {
        expr.terms().iter().map(|term| self.apply_term(term)).sum()
    }
}

/// The position of the single domain factor in a term.
enum LinearFactor<'a> {
    /// The term contains no domain factor.
    None,

    /// A scalar factor (with exponent 1), at the given index of [`Term::factors`].
    Scalar(usize, &'a Symbol),

    /// A vector, at the given index of [`Term::word`].
    Letter(usize, &'a Symbol),
}

const NOT_LINEAR: &str = "linear expression expected instead of polynomial";

/// Finds the single factor of `term` that belongs to `domain`.
///
/// Panics if the term contains several domain factors, a power of one, or a domain element nested
/// inside another factor.
fn linear_factor<'a>(term: &'a Term, domain: &Domain) -> LinearFactor<'a> {
    let mut found = LinearFactor::None;
    let mut count = 0;
    for (i, (base, exp)) in term.factors.iter().enumerate() {
        match base {
            Expr::Primary(Primary::Symbol(symbol)) if domain.contains(symbol) => {
                if *exp != 1 {
                    panic!("{}", NOT_LINEAR);
                }
                found = LinearFactor::Scalar(i, symbol);
                count += 1;
            },
            _ => if base.symbols().iter().any(|symbol| domain.contains(symbol)) {
                panic!("{}", NOT_LINEAR);
            },
        }
    }
    for (i, symbol) in term.word.iter().enumerate() {
        if domain.contains(symbol) {
            found = LinearFactor::Letter(i, symbol);
            count += 1;
        }
    }

    if count > 1 {
        panic!("{}", NOT_LINEAR);
    }
    found
}

/// Replaces the single domain factor of a term by its image, keeping everything else in place.
fn apply_linear(term: &Term, domain: &Domain, image: impl FnOnce(&Symbol) -> Expr) -> Expr {
    match linear_factor(term, domain) {
        LinearFactor::None => Expr::zero(),
        LinearFactor::Scalar(i, symbol) => {
            let mut rest = term.clone();
            rest.factors.remove(i);
            let word = Expr::wedge(&rest.word);
            rest.word.clear();
            rest.to_expr() * image(symbol) * word
        },
        LinearFactor::Letter(i, symbol) => {
            let before = Term {
                coefficient: term.coefficient.clone(),
                factors: term.factors.clone(),
                word: term.word[..i].to_vec(),
            };
            before.to_expr() * image(symbol) * Expr::wedge(&term.word[i + 1..])
        },
    }
}

/// An operator that is linear over the scalars and the elements outside its domain.
///
/// Each term of the argument may contain at most one factor from the [`domain`](Self::domain); the
/// operator maps that factor with [`apply_simple`](Self::apply_simple) and multiplies the image in
/// at the position of the factor. Terms without a domain factor map to zero.
///
/// Panics with `linear expression expected instead of polynomial` if a term contains two or more
/// domain factors.
pub trait LinearOperator {
    /// The simple elements the operator acts on.
    fn domain(&self) -> &Domain;

    /// The image of a simple element of the domain.
    fn apply_simple(&self, symbol: &Symbol) -> Expr;

    /// Applies the operator to an expression.
    fn apply(&self, expr: &Expr) -> Expr {
        expr.terms()
            .iter()
            .map(|term| apply_linear(term, self.domain(), |symbol| self.apply_simple(symbol)))
            .sum()
    }
}

/// An operator of two arguments that is linear in each of them.
///
/// `B(v, w)` is computed by a linear operator over `v` which, at each simple element `a` of `v`,
/// applies to `w` the linear operator `b ↦ B(a, b)`.
pub trait BilinearOperator {
    /// The simple elements the first argument is linear in.
    fn left_domain(&self) -> &Domain;

    /// The simple elements the second argument is linear in.
    fn right_domain(&self) -> &Domain;

    /// The value of the operator on two simple elements.
    fn apply_simple(&self, left: &Symbol, right: &Symbol) -> Expr;

    /// Applies the operator to two expressions.
    fn apply(&self, left: &Expr, right: &Expr) -> Expr {
        Left { op: self, right }.apply(left)
    }
}

/// The linear operator `v ↦ B(v, w)` for a fixed `w`.
struct Left<'a, B: ?Sized> {
    op: &'a B,
    right: &'a Expr,
}

impl<B: BilinearOperator + ?Sized> LinearOperator for Left<'_, B> {
    fn domain(&self) -> &Domain {
        self.op.left_domain()
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        Right { op: self.op, left: symbol }.apply(self.right)
    }
}

/// The linear operator `w ↦ B(a, w)` for a fixed simple element `a`.
struct Right<'a, B: ?Sized> {
    op: &'a B,
    left: &'a Symbol,
}

impl<B: BilinearOperator + ?Sized> LinearOperator for Right<'_, B> {
    fn domain(&self) -> &Domain {
        self.op.right_domain()
    }

    fn apply_simple(&self, symbol: &Symbol) -> Expr {
        self.op.apply_simple(self.left, symbol)
    }
}

/// An operator satisfying the product rule `D(f g) = D(f) g + f D(g)` over commutative products,
/// such as a partial derivative.
///
/// Powers, function calls and non-integer powers are differentiated with the power and chain
/// rules. Simple elements outside the [`domain`](Self::domain) are constants.
///
/// Panics if a term contains a wedge word of two or more vectors, since such a product is not
/// commutative; use a [`Derivation`] instead.
pub trait Leibniz {
    /// The simple elements the operator does not annihilate.
    fn domain(&self) -> &Domain;

    /// The image of a simple element of the domain.
    fn apply_simple(&self, symbol: &Symbol) -> Expr;

    /// Applies the operator to an expression.
    fn apply(&self, expr: &Expr) -> Expr {
        let simple = |symbol: &Symbol| if self.domain().contains(symbol) {
            self.apply_simple(symbol)
        } else {
            Expr::zero()
        };
        let recurse = |expr: &Expr| self.apply(expr);

        expr.terms()
            .iter()
            .map(|term| {
                if term.word.len() > 1 {
                    panic!("Leibniz operator applied to a wedge product of several vectors");
                }
                let scalar = Term { word: Vec::new(), ..term.clone() };
                let word = Expr::wedge(&term.word);
                let mut result = product::differentiate_factors(&scalar, &simple, &recurse) * &word;
                if let Some(symbol) = term.word.first() {
                    result += scalar.to_expr() * simple(symbol);
                }
                result
            })
            .sum()
    }
}

/// An operator satisfying the graded product rule over wedge words:
///
/// ```text
/// D(e f g) = D(e) f g - e D(f) g + e f D(g)
/// ```
///
/// for elements `e`, `f`, `g` of an exterior kind. The sign of each summand is `(-1)^k`, where `k`
/// is the number of anticommuting vectors to the left of the differentiated one, if the derivation
/// is [`skew`](Self::skew), and always `+1` otherwise. Scalar factors are differentiated with the
/// ordinary product rule.
pub trait Derivation {
    /// The simple elements the derivation does not annihilate.
    fn domain(&self) -> &Domain;

    /// The image of a simple element of the domain.
    fn apply_simple(&self, symbol: &Symbol) -> Expr;

    /// Whether moving past an anticommuting vector flips the sign.
    fn skew(&self) -> bool {
        true
    }

    /// Applies the derivation to an expression.
    fn apply(&self, expr: &Expr) -> Expr {
        let simple = |symbol: &Symbol| if self.domain().contains(symbol) {
            self.apply_simple(symbol)
        } else {
            Expr::zero()
        };
        let recurse = |expr: &Expr| self.apply(expr);

        expr.terms()
            .iter()
            .map(|term| {
                let scalar = Term { word: Vec::new(), ..term.clone() };
                let mut result = product::differentiate_factors(&scalar, &simple, &recurse)
                    * Expr::wedge(&term.word);

                let prefix = scalar.to_expr();
                let mut passed = 0;
                for (i, symbol) in term.word.iter().enumerate() {
                    let image = simple(symbol);
                    if !image.is_zero() {
                        let summand = &prefix
                            * Expr::wedge(&term.word[..i])
                            * image
                            * Expr::wedge(&term.word[i + 1..]);
                        if self.skew() && passed % 2 == 1 {
                            result -= summand;
                        } else {
                            result += summand;
                        }
                    }
                    if symbol.is_skew() {
                        passed += 1;
                    }
                }
                result
            })
            .sum()
    }
}
