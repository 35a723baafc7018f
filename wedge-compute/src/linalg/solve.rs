//! Solving systems of linear equations.

use std::collections::BTreeMap;
use tracing::debug;
use crate::error::{render_list, Error, InvalidArgument, Result};
use crate::symbolic::{coefficients, get_symbols, Domain, Expr, Substitution, Symbol};
use super::matrix::{combine, SparseRow};

/// An equation `Σ row[j] * x_j + constant = 0`.
#[derive(Debug, Clone)]
struct Equation {
    row: SparseRow,
    constant: Expr,
}

impl Equation {
    /// Returns `self - factor * other`.
    fn sub_scaled(&self, factor: &Expr, other: &Equation) -> Equation {
        Equation {
            row: combine(&Expr::one(), &self.row, factor, &other.row),
            constant: &self.constant - factor * &other.constant,
        }
    }
}

/// Splits an equation into its coefficients in the unknowns and its constant term.
fn to_equation(
    expr: &Expr,
    domain: &Domain,
    index: &BTreeMap<&Symbol, usize>,
) -> std::result::Result<Equation, String> {
    let mut equation = Equation { row: SparseRow::new(), constant: Expr::zero() };
    for (monomial, coefficient) in coefficients(expr, domain) {
        if !get_symbols(&coefficient, domain).is_empty() {
            return Err(format!("coefficient `{}` depends on the unknowns", coefficient));
        }
        if monomial == Expr::one() {
            equation.constant = coefficient;
        } else if let Some(column) = monomial.as_symbol().and_then(|symbol| index.get(symbol)) {
            equation.row.insert(*column, coefficient);
        } else {
            return Err(format!("`{}` is not linear in the unknowns", monomial));
        }
    }
    Ok(equation)
}

/// Solves the linear system `equations = 0` for the given unknowns, by Gauss-Jordan elimination.
///
/// Returns [`None`] if the system has no solution. Otherwise, returns a substitution giving the
/// value of each determined unknown in terms of the free unknowns, which do not appear as keys.
/// Which unknowns are free depends on the pivots chosen; simple pivots are preferred.
///
/// Returns an [`InvalidArgument`] error if some equation is not linear in the unknowns.
#[tracing::instrument(skip_all, fields(equations = equations.len(), unknowns = unknowns.len()))]
pub fn lsolve(equations: &[Expr], unknowns: &[Symbol]) -> Result<Option<Substitution>> {
    let domain = unknowns.iter().collect::<Domain>();
    let index = unknowns.iter()
        .enumerate()
        .map(|(i, symbol)| (symbol, i))
        .collect::<BTreeMap<_, _>>();

    let mut remaining = Vec::with_capacity(equations.len());
    for (i, expr) in equations.iter().enumerate() {
        let equation = to_equation(expr, &domain, &index).map_err(|message| {
            let (text, spans) = render_list(equations);
            Error::with_spans(text, vec![spans[i].clone()], InvalidArgument::new(message))
        })?;
        remaining.push(equation);
    }

    let mut pivots: Vec<(usize, Equation)> = Vec::new();
    for column in 0..unknowns.len() {
        let Some(position) = remaining.iter()
            .enumerate()
            .filter_map(|(i, equation)| Some((i, equation.row.get(&column)?.complexity())))
            .min_by_key(|(_, complexity)| *complexity)
            .map(|(i, _)| i)
        else {
            continue;
        };

        let equation = remaining.remove(position);
        let factor = equation.row[&column].inverse();
        let pivot = Equation {
            row: equation.row.iter().map(|(j, entry)| (*j, entry * &factor)).collect(),
            constant: &equation.constant * &factor,
        };

        for other in remaining.iter_mut().chain(pivots.iter_mut().map(|(_, equation)| equation)) {
            if let Some(entry) = other.row.get(&column).cloned() {
                *other = other.sub_scaled(&entry, &pivot);
            }
        }
        pivots.push((column, pivot));
    }

    if remaining.iter().any(|equation| !equation.constant.is_zero()) {
        debug!("inconsistent system");
        return Ok(None);
    }

    let solution = pivots.into_iter()
        .map(|(column, equation)| {
            let free = equation.row.iter()
                .filter(|(j, _)| **j != column)
                .map(|(j, entry)| entry * Expr::from(unknowns[*j].clone()))
                .sum::<Expr>();
            (unknowns[column].clone(), -(equation.constant + free))
        })
        .collect::<Substitution>();
    debug!(rank = solution.len(), "solved system");
    Ok(Some(solution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::symbolic::{Algebra, Kind, Policy};

    fn unknowns(n: usize) -> (Vec<Symbol>, Vec<Expr>) {
        let kind = Kind::declare("x", Policy::Numbered, Algebra::Scalar);
        let symbols = kind.numbered_many(n).unwrap();
        let exprs = symbols.iter().map(Expr::from).collect();
        (symbols, exprs)
    }

    #[test]
    fn unique_solution() {
        let (symbols, x) = unknowns(2);
        let equations = [&x[0] + &x[1] - Expr::from(3), &x[0] - &x[1] - Expr::from(1)];
        let solution = lsolve(&equations, &symbols).unwrap().unwrap();
        assert_eq!(solution.get(&symbols[0]), Some(&Expr::from(2)));
        assert_eq!(solution.get(&symbols[1]), Some(&Expr::from(1)));
    }

    #[test]
    fn free_unknowns() {
        let (symbols, x) = unknowns(3);
        let equations = [&x[0] + &x[1] + Expr::one()];
        let solution = lsolve(&equations, &symbols).unwrap().unwrap();
        assert_eq!(solution.len(), 1);
        assert_eq!(solution.get(&symbols[0]), Some(&(-&x[1] - Expr::one())));
        for equation in &equations {
            assert!(equation.subs(&solution).is_zero());
        }
    }

    #[test]
    fn symbolic_coefficients() {
        let params = Kind::declare("p", Policy::Named, Algebra::Scalar);
        let a = Expr::from(params.named("a").unwrap());
        let (symbols, x) = unknowns(2);

        let equations = [&a * &x[0] + &x[1], &x[0] - &x[1] - Expr::one()];
        let solution = lsolve(&equations, &symbols).unwrap().unwrap();
        for equation in &equations {
            assert!(equation.subs(&solution).is_zero());
        }
    }

    #[test]
    fn inconsistent() {
        let (symbols, x) = unknowns(2);
        let equations = [&x[0] + &x[1], &x[0] + &x[1] - Expr::one()];
        assert_eq!(lsolve(&equations, &symbols).unwrap(), None);
    }

    #[test]
    fn nonlinear() {
        let (symbols, x) = unknowns(2);
        let err = lsolve(&[&x[0] * &x[1]], &symbols).unwrap_err();
        assert!(err.is::<InvalidArgument>());
    }
}
