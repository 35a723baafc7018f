//! The expression type and its arithmetic.
//!
//! An [`Expr`] is a tree of sums, products, wedge words and powers whose leaves are [`Primary`]
//! values. All operators (`+`, `-`, `*`, `/`, [`Expr::pow`]) return **canonical** expressions, as
//! described in the [module-level documentation](super): a sum of [`Term`]s, each one a rational
//! coefficient times sorted scalar factors times a normalized wedge word.
//!
//! The canonical form of a term is rendered as an [`Expr::Mul`] of, in order: the coefficient (if it
//! is not 1), each scalar factor (as an [`Expr::Exp`] if its exponent is not 1), and the wedge word
//! (a single [`Primary::Symbol`] for words of length one). A sum of several terms is an
//! [`Expr::Add`] and the empty sum is the number 0.
//!
//! Multiplication is **not** commutative in general: vector elements of the same exterior kind
//! anticommute, and the order of factors in an [`Expr::Mul`] matters when it contains vectors.

mod call;
mod iter;
mod term;

pub use term::Term;
pub(crate) use term::Sum;

use crate::primitive::bit_size;
use iter::ExprIter;
use rug::{Integer, Rational};
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};
use super::Symbol;

/// A call to a named function, such as `sin(x)`, or a partial derivative of one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Call {
    /// The name of the function.
    pub name: String,

    /// The indices of the arguments the function has been differentiated with respect to, in
    /// increasing order. Empty for the function itself.
    pub derivatives: Vec<usize>,

    /// The arguments of the call.
    pub args: Vec<Expr>,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.derivatives.is_empty() {
            write!(f, "∂[")?;
            for (i, index) in self.derivatives.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", index)?;
            }
            write!(f, "]")?;
        }
        write!(f, "{}(", self.name)?;
        let mut iter = self.args.iter();
        if let Some(arg) = iter.next() {
            write!(f, "{}", arg)?;
            for arg in iter {
                write!(f, ", {}", arg)?;
            }
        }
        write!(f, ")")
    }
}

/// A single term / factor, such as a number, a simple element, or a function call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primary {
    /// An exact rational number, such as `2` or `-3/4`.
    Number(Rational),

    /// The imaginary unit `i`, with `i^2 = -1`.
    I,

    /// A simple element.
    Symbol(Symbol),

    /// A function call, such as `sin(x)` or `f(x, y)`.
    Call(Call),
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => write!(f, "{}", num),
            Self::I => write!(f, "i"),
            Self::Symbol(sym) => write!(f, "{}", sym),
            Self::Call(call) => write!(f, "{}", call),
        }
    }
}

/// A mathematical expression.
///
/// For more information about this type, see the [module-level documentation](self).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    /// A single term or factor.
    Primary(Primary),

    /// Multiple terms added together.
    Add(Vec<Expr>),

    /// Multiple factors multiplied together, in order.
    Mul(Vec<Expr>),

    /// A wedge product of vector elements, in order.
    Wedge(Vec<Symbol>),

    /// An expression raised to a power.
    Exp(Box<Expr>, Box<Expr>),
}

/// Binding strength of each kind of node, used to decide where parentheses are needed when
/// printing.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(_) => 1,
        Expr::Mul(_) => 2,
        Expr::Wedge(_) => 3,
        Expr::Exp(_, _) => 4,
        Expr::Primary(Primary::Number(num)) if num.cmp0() == Ordering::Less || *num.denom() != 1 => 2,
        Expr::Primary(_) => 5,
    }
}

/// Writes `expr`, wrapped in parentheses if it binds less tightly than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(primary) => write!(f, "{}", primary),
            Self::Add(terms) => {
                let mut iter = terms.iter();
                if let Some(term) = iter.next() {
                    write!(f, "{}", term)?;
                    for term in iter {
                        let term = term.to_string();
                        match term.strip_prefix('-') {
                            Some(rest) => write!(f, " - {}", rest)?,
                            None => write!(f, " + {}", term)?,
                        }
                    }
                }
                Ok(())
            },
            Self::Mul(factors) => {
                let mut iter = factors.iter();
                if factors.len() > 1 && factors[0] == Expr::from(-1) {
                    write!(f, "-")?;
                    iter.next();
                }
                if let Some(factor) = iter.next() {
                    write_operand(f, factor, 2)?;
                    for factor in iter {
                        write!(f, " * ")?;
                        write_operand(f, factor, 3)?;
                    }
                }
                Ok(())
            },
            Self::Wedge(symbols) => {
                let mut iter = symbols.iter();
                if let Some(symbol) = iter.next() {
                    write!(f, "{}", symbol)?;
                    for symbol in iter {
                        write!(f, "∧{}", symbol)?;
                    }
                }
                Ok(())
            },
            Self::Exp(base, exp) => {
                write_operand(f, base, 5)?;
                write!(f, "^")?;
                write_operand(f, exp, 5)
            },
        }
    }
}

impl Expr {
    /// The number 0.
    pub fn zero() -> Self {
        Self::Primary(Primary::Number(Rational::new()))
    }

    /// The number 1.
    pub fn one() -> Self {
        Self::from(1)
    }

    /// The imaginary unit.
    pub fn i() -> Self {
        Self::Primary(Primary::I)
    }

    /// Creates a canonical call to the named function.
    ///
    /// The functions `ln`, `exp`, `sin` and `cos` are known: they are evaluated at trivial points
    /// (`ln(1) = 0`, `exp(0) = 1`, `sin(0) = 0`, `cos(0) = 1`) and have derivatives. Any other name
    /// is a formal function.
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Primary(Primary::Call(Call { name: name.into(), derivatives: Vec::new(), args }))
            .expand()
    }

    /// Creates the canonical product of the given simple elements, in order.
    pub fn wedge(symbols: &[Symbol]) -> Self {
        symbols.iter().map(Self::from).product()
    }

    /// Returns the expression in canonical form.
    pub fn expand(&self) -> Self {
        Sum::expand(self).to_expr()
    }

    /// Returns the terms of the canonical form of the expression.
    pub fn terms(&self) -> Vec<Term> {
        Sum::expand(self).into_terms()
    }

    /// Returns true if the expression is zero.
    ///
    /// Terms divided by sums are brought to a common denominator first, so `a/(a + 1) + 1/(a + 1)`
    /// is recognized as nonzero and `a - a^2/(a + 1) - a/(a + 1)` as zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Primary(Primary::Number(num)) => num.cmp0() == Ordering::Equal,
            Self::Primary(_) => false,
            _ => Sum::expand(self).is_zero_fraction(),
        }
    }

    /// If the expression is a [`Primary::Number`], returns a reference to the contained number.
    pub fn as_number(&self) -> Option<&Rational> {
        match self {
            Self::Primary(Primary::Number(num)) => Some(num),
            _ => None,
        }
    }

    /// If the expression is a [`Primary::Symbol`], returns a reference to the contained symbol.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Primary(Primary::Symbol(sym)) => Some(sym),
            _ => None,
        }
    }

    /// Returns true if the expression contains no vector elements.
    pub fn is_scalar(&self) -> bool {
        self.post_order_iter().all(|expr| match expr {
            Self::Primary(Primary::Symbol(sym)) => sym.is_scalar(),
            Self::Wedge(word) => word.iter().all(Symbol::is_scalar),
            _ => true,
        })
    }

    /// Raises the expression to the given power.
    ///
    /// Integer powers of scalar expressions are multiplied out (negative powers of sums are kept
    /// as factors); other powers are kept as an opaque [`Expr::Exp`] factor.
    ///
    /// Panics when dividing by zero, or when a negative or non-integer power of an expression
    /// containing vectors is requested.
    pub fn pow(&self, exp: &Expr) -> Self {
        Sum::expand(self).pow(&Sum::expand(exp)).to_expr()
    }

    /// Raises the expression to the given integer power.
    pub fn powi(&self, exp: i64) -> Self {
        Sum::expand(self).pow_int(exp).to_expr()
    }

    /// Returns `1 / self`.
    ///
    /// Panics if the expression is zero or contains vectors.
    pub fn inverse(&self) -> Self {
        Sum::expand(self).inverse().to_expr()
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first).
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }

    /// Returns every simple element occurring anywhere in the expression, including inside
    /// function calls and exponents.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        for expr in self.post_order_iter() {
            match expr {
                Self::Primary(Primary::Symbol(sym)) => {
                    symbols.insert(sym.clone());
                },
                Self::Wedge(word) => symbols.extend(word.iter().cloned()),
                _ => {},
            }
        }
        symbols
    }

    /// A measure of how unwieldy the expression is, used to choose pivots: numbers with small
    /// numerators and denominators are the simplest expressions.
    pub fn complexity(&self) -> usize {
        let mut complexity = 0;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            complexity += match expr {
                Self::Primary(primary) => match primary {
                    Primary::Number(num) => bit_size(num),
                    Primary::I => 2,
                    Primary::Symbol(_) => 8,
                    Primary::Call(call) => {
                        stack.extend(call.args.iter());
                        8 + call.derivatives.len()
                    },
                },
                Self::Add(terms) => {
                    stack.extend(terms.iter());
                    16
                },
                Self::Mul(factors) => {
                    stack.extend(factors.iter());
                    4
                },
                Self::Wedge(word) => 8 * word.len(),
                Self::Exp(lhs, rhs) => {
                    stack.push(lhs);
                    stack.push(rhs);
                    12
                },
            };
        }
        complexity
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Self::Primary(Primary::Number(Rational::from(n)))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::Primary(Primary::Number(Rational::from(n)))
    }
}

impl From<Integer> for Expr {
    fn from(n: Integer) -> Self {
        Self::Primary(Primary::Number(Rational::from(n)))
    }
}

impl From<Rational> for Expr {
    fn from(n: Rational) -> Self {
        Self::Primary(Primary::Number(n))
    }
}

impl From<Symbol> for Expr {
    fn from(sym: Symbol) -> Self {
        Self::Primary(Primary::Symbol(sym))
    }
}

impl From<&Symbol> for Expr {
    fn from(sym: &Symbol) -> Self {
        Self::Primary(Primary::Symbol(sym.clone()))
    }
}

fn add(lhs: &Expr, rhs: &Expr) -> Expr {
    let mut sum = Sum::expand(lhs);
    sum.add(&Sum::expand(rhs));
    sum.to_expr()
}

fn sub(lhs: &Expr, rhs: &Expr) -> Expr {
    let mut sum = Sum::expand(lhs);
    sum.add(&Sum::expand(rhs).scale(&Rational::from(-1)));
    sum.to_expr()
}

fn mul(lhs: &Expr, rhs: &Expr) -> Expr {
    Sum::expand(lhs).mul(&Sum::expand(rhs)).to_expr()
}

fn div(lhs: &Expr, rhs: &Expr) -> Expr {
    Sum::expand(lhs).mul(&Sum::expand(rhs).inverse()).to_expr()
}

/// Implements a binary operator and its assigning version for every combination of owned and
/// borrowed [`Expr`]s, in terms of a function on two borrowed expressions.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $func:ident) => {
        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                $func(self, rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                $func(self, &rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                $func(&self, rhs)
            }
        }

        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                $func(&self, &rhs)
            }
        }

        impl $assign_trait<&Expr> for Expr {
            fn $assign_method(&mut self, rhs: &Expr) {
                *self = $func(self, rhs);
            }
        }

        impl $assign_trait<Expr> for Expr {
            fn $assign_method(&mut self, rhs: Expr) {
                *self = $func(self, &rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, add);
impl_binary_op!(Sub, sub, SubAssign, sub_assign, sub);
impl_binary_op!(Mul, mul, MulAssign, mul_assign, mul);
impl_binary_op!(Div, div, DivAssign, div_assign, div);

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Sum::expand(self).scale(&Rational::from(-1)).to_expr()
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        -&self
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Self {
        let mut sum = Sum::zero();
        for expr in iter {
            sum.add(&Sum::expand(&expr));
        }
        sum.to_expr()
    }
}

impl<'a> std::iter::Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Self {
        let mut sum = Sum::zero();
        for expr in iter {
            sum.add(&Sum::expand(expr));
        }
        sum.to_expr()
    }
}

/// Multiplies the expressions in iteration order.
impl std::iter::Product for Expr {
    fn product<I: Iterator<Item = Expr>>(iter: I) -> Self {
        iter.fold(Sum::one(), |product, expr| product.mul(&Sum::expand(&expr))).to_expr()
    }
}

impl<'a> std::iter::Product<&'a Expr> for Expr {
    fn product<I: Iterator<Item = &'a Expr>>(iter: I) -> Self {
        iter.fold(Sum::one(), |product, expr| product.mul(&Sum::expand(expr))).to_expr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::frac;
    use crate::symbolic::{Algebra, Kind, Policy};
    use pretty_assertions::assert_eq;

    fn scalars() -> (Expr, Expr) {
        let kind = Kind::declare("p", Policy::Named, Algebra::Scalar);
        (Expr::from(kind.named("x").unwrap()), Expr::from(kind.named("y").unwrap()))
    }

    fn vectors(n: usize) -> Vec<Expr> {
        let kind = Kind::declare("e", Policy::Numbered, Algebra::Exterior);
        kind.numbered_many(n).unwrap().iter().map(Expr::from).collect()
    }

    #[test]
    fn like_terms_combine() {
        let (x, y) = scalars();
        assert_eq!(&x + &x, Expr::from(2) * &x);
        assert_eq!(&x - &x, Expr::zero());
        assert_eq!(&x * &y - &y * &x, Expr::zero());
        assert_eq!((&x + &y) * (&x - &y), &x * &x - &y * &y);
    }

    #[test]
    fn canonical_form_is_stable() {
        let (x, y) = scalars();
        let expr = (&x + Expr::from(3) * &y).powi(3) / (&x - &y);
        assert_eq!(expr.expand(), expr);
    }

    #[test]
    fn skew_symmetry() {
        let e = vectors(3);
        assert_eq!(&e[0] * &e[1], -(&e[1] * &e[0]));
        assert!((&e[0] * &e[0]).is_zero());
        assert_eq!(&e[2] * &e[0] * &e[1], &e[0] * &e[1] * &e[2]);
        assert_eq!(Expr::wedge(&[]), Expr::one());
    }

    #[test]
    fn scalars_commute_with_vectors() {
        let (x, _) = scalars();
        let e = vectors(2);
        assert_eq!(&e[0] * &x * &e[1], &x * &e[0] * &e[1]);
        assert_eq!((&e[1] * &x * &e[0]).to_string(), format!("-{} * {}∧{}", x, e[0], e[1]));
    }

    #[test]
    fn imaginary_unit() {
        let i = Expr::i();
        assert_eq!(&i * &i, Expr::from(-1));
        assert_eq!(i.powi(3), -&i);
        assert_eq!(i.inverse(), -&i);
        assert_eq!((Expr::one() + &i) * (Expr::one() - &i), Expr::from(2));
    }

    #[test]
    fn division() {
        let (x, y) = scalars();
        assert_eq!(&x / &x, Expr::one());
        assert_eq!(Expr::from(3) / Expr::from(6), Expr::from(frac(1, 2)));
        assert_eq!((&x * &y) / &y, x.clone());

        // sums are kept as factors, but cancel against themselves
        let sum = &x + &y;
        let quotient = &y / &sum;
        assert_eq!(&quotient * &sum, y.clone());
        assert_eq!(Expr::from(2) * &x / (Expr::from(2) * &sum), &x / &sum);
    }

    #[test]
    fn rational_zero_test() {
        let (a, _) = scalars();
        let one = Expr::one();
        let denominator = &a + &one;

        let expr = &a - a.powi(2) / &denominator - &a / &denominator;
        assert!(expr.terms().len() > 1);
        assert!(expr.is_zero());
        assert!(!(&a / &denominator + &one / &denominator).is_zero());
    }

    #[test]
    fn rational_expressions_are_not_unique() {
        let (x, y) = scalars();
        let sum = (&x + &y) * ((&x + &y).inverse() + (&x - &y).inverse());
        let expected = Expr::from(2) * &x / (&x - &y);

        assert_ne!(sum, expected);
        assert!((&sum - &expected).is_zero());
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn division_by_zero() {
        let _ = Expr::one() / Expr::zero();
    }

    #[test]
    fn display() {
        let (x, y) = scalars();
        assert_eq!((&x - Expr::from(2) * &y).to_string(), "x - 2 * y");
        assert_eq!(x.powi(2).to_string(), "x^2");
        assert_eq!((Expr::from(frac(1, 2)) * &x).to_string(), "1/2 * x");
        assert_eq!((&x + &y).inverse().to_string(), "(x + y)^(-1)");
    }

    #[test]
    fn symbols_and_scalars() {
        let (x, y) = scalars();
        let e = vectors(1);
        let expr = Expr::call("sin", vec![x.clone()]) * &e[0] + &y;
        assert_eq!(expr.symbols().len(), 3);
        assert!(!expr.is_scalar());
        assert!((&x * &y).is_scalar());
    }

    #[test]
    fn complexity_prefers_small_numbers() {
        let (x, _) = scalars();
        assert!(Expr::one().complexity() < x.complexity());
        assert!(Expr::from(frac(1, 3)).complexity() < Expr::from(frac(1000, 3)).complexity());
    }
}
