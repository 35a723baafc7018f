//! Known functions: trivial evaluations and partial derivatives.

use super::{term::Sum, Call, Expr, Primary};

/// Brings the arguments of a call into canonical form and evaluates the call if it is a known
/// function at a trivial point.
///
/// Returns the canonical call in [`Err`] if it cannot be evaluated.
pub(super) fn evaluate(call: &Call) -> Result<Sum, Call> {
    let args = call.args.iter().map(Expr::expand).collect::<Vec<_>>();
    let canonical = Call { name: call.name.clone(), derivatives: call.derivatives.clone(), args };
    if !canonical.derivatives.is_empty() || canonical.args.len() != 1 {
        return Err(canonical);
    }

    let arg = &canonical.args[0];
    let value = match canonical.name.as_str() {
        "ln" if *arg == Expr::one() => Expr::zero(),
        "exp" if arg.is_zero() => Expr::one(),
        "sin" if arg.is_zero() => Expr::zero(),
        "cos" if arg.is_zero() => Expr::one(),
        _ => return Err(canonical),
    };
    Ok(Sum::expand(&value))
}

impl Call {
    /// Returns the partial derivative of the call with respect to its `index`-th argument.
    ///
    /// Known functions of one argument differentiate into known functions; anything else becomes a
    /// formal partial derivative of the function.
    pub fn partial(&self, index: usize) -> Expr {
        if self.derivatives.is_empty() && self.args.len() == 1 && index == 0 {
            let arg = &self.args[0];
            match self.name.as_str() {
                "ln" => return arg.inverse(),
                "exp" => return Expr::call("exp", vec![arg.clone()]),
                "sin" => return Expr::call("cos", vec![arg.clone()]),
                "cos" => return -Expr::call("sin", vec![arg.clone()]),
                _ => {},
            }
        }

        let mut derivatives = self.derivatives.clone();
        let position = derivatives.partition_point(|i| *i <= index);
        derivatives.insert(position, index);
        Expr::Primary(Primary::Call(Call {
            name: self.name.clone(),
            derivatives,
            args: self.args.clone(),
        }))
    }
}
