//! The product, power and chain rules shared by [`Leibniz`](super::Leibniz) operators and
//! [`Derivation`](super::Derivation)s.

use crate::symbolic::{Expr, Primary, Symbol, Term};
use rug::Rational;

/// Differentiates a single factor base.
///
/// `simple` is the action on simple elements and `recurse` the operator itself, used on the
/// arguments of function calls, on exponents and on sums.
fn differentiate_base(
    base: &Expr,
    simple: &dyn Fn(&Symbol) -> Expr,
    recurse: &dyn Fn(&Expr) -> Expr,
) -> Expr {
    match base {
        Expr::Primary(Primary::Symbol(symbol)) => simple(symbol),
        Expr::Primary(Primary::Call(call)) => call.args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let inner = recurse(arg);
                if inner.is_zero() {
                    Expr::zero()
                } else {
                    call.partial(i) * inner
                }
            })
            .sum(),
        // D(b^f) = b^f (D(f) ln(b) + f D(b) / b)
        Expr::Exp(lhs, rhs) => {
            let d_exp = recurse(rhs);
            let d_base = recurse(lhs);
            let mut inner = Expr::zero();
            if !d_exp.is_zero() {
                inner += Expr::call("ln", vec![(**lhs).clone()]) * d_exp;
            }
            if !d_base.is_zero() {
                inner += (**rhs).clone() * lhs.inverse() * d_base;
            }
            if inner.is_zero() {
                inner
            } else {
                base * inner
            }
        },
        Expr::Primary(_) => Expr::zero(),
        _ => recurse(base),
    }
}

/// Differentiates the scalar part `c * f_1^k_1 * ... * f_n^k_n` of a term with the product and
/// power rules:
///
/// ```text
/// D(term) = Σ_i c * (Π_{j≠i} f_j^k_j) * k_i * f_i^(k_i - 1) * D(f_i)
/// ```
///
/// The image `D(f_i)` is placed last, so it may contain vectors. The word of `term` is ignored.
pub(super) fn differentiate_factors(
    term: &Term,
    simple: &dyn Fn(&Symbol) -> Expr,
    recurse: &dyn Fn(&Expr) -> Expr,
) -> Expr {
    let mut result = Expr::zero();
    for (i, (base, exp)) in term.factors.iter().enumerate() {
        let derivative = differentiate_base(base, simple, recurse);
        if derivative.is_zero() {
            continue;
        }

        let mut others = Term {
            coefficient: Rational::from(*exp) * &term.coefficient,
            factors: term.factors.clone(),
            word: Vec::new(),
        };
        if *exp == 1 {
            others.factors.remove(i);
        } else {
            others.factors[i].1 -= 1;
        }
        result += others.to_expr().expand() * derivative;
    }
    result
}
