//! Gröbner bases and the ideal operations built on them.
//!
//! The bases are computed with Buchberger's algorithm, skipping the pairs whose leading monomials
//! are coprime, and returned **reduced**: monic, with no term of an element divisible by the
//! leading monomial of another, sorted by decreasing leading monomial. The reduced basis of an
//! ideal is unique for a given order, so ideals can be compared through it.

use std::collections::VecDeque;
use rug::Rational;
use tracing::{debug, trace};
use super::polynomial::{coprime, divides, lcm, quotient, MonomialOrder, Polynomial};

/// Reduces `poly` modulo `basis`, returning a polynomial none of whose terms is divisible by a
/// leading monomial of the basis.
///
/// The result is the unique normal form of `poly` modulo the ideal if `basis` is a Gröbner basis
/// for `order`.
pub fn normal_form(poly: &Polynomial, basis: &[Polynomial], order: MonomialOrder) -> Polynomial {
    let mut remainder = Polynomial::zero(poly.nvars());
    let mut poly = poly.clone();
    while let Some((monomial, coefficient)) = poly.leading(order)
        .map(|(monomial, coefficient)| (monomial.clone(), coefficient.clone()))
    {
        let divisor = basis.iter()
            .filter_map(|g| g.leading(order).map(|lead| (g, lead)))
            .filter(|(_, (lead, _))| divides(lead, &monomial))
            .min_by_key(|(g, _)| g.len());

        match divisor {
            Some((g, (lead, lead_coefficient))) => {
                let factor = Rational::from(&coefficient / lead_coefficient);
                poly = &poly - &g.mul_term(&quotient(&monomial, lead), &factor);
            },
            None => {
                poly.take_term(&monomial);
                remainder.add_term(monomial, coefficient);
            },
        }
    }
    remainder
}

/// The S-polynomial of `f` and `g`, whose leading terms cancel.
fn s_polynomial(f: &Polynomial, g: &Polynomial, order: MonomialOrder) -> Polynomial {
    let (Some((f_lead, f_coefficient)), Some((g_lead, g_coefficient))) =
        (f.leading(order), g.leading(order))
    else {
        return Polynomial::zero(f.nvars());
    };
    let common = lcm(f_lead, g_lead);
    let f_part = f.mul_term(&quotient(&common, f_lead), &Rational::from(f_coefficient.recip_ref()));
    let g_part = g.mul_term(&quotient(&common, g_lead), &Rational::from(g_coefficient.recip_ref()));
    &f_part - &g_part
}

/// Computes the reduced Gröbner basis of the ideal generated by `generators`.
///
/// The basis of the zero ideal is empty, and the basis of the unit ideal is `[1]`.
#[tracing::instrument(skip_all, fields(generators = generators.len(), order = ?order))]
pub fn groebner_basis(generators: &[Polynomial], order: MonomialOrder) -> Vec<Polynomial> {
    let mut basis = generators.iter()
        .filter(|g| !g.is_zero())
        .map(|g| g.monic(order))
        .collect::<Vec<_>>();
    if let Some(unit) = basis.iter().find(|g| g.is_constant()) {
        return vec![Polynomial::constant(unit.nvars(), 1)];
    }

    let mut pairs = (0..basis.len())
        .flat_map(|j| (0..j).map(move |i| (i, j)))
        .collect::<VecDeque<_>>();
    while let Some((i, j)) = pairs.pop_front() {
        let (Some(a), Some(b)) = (basis[i].leading_monomial(order), basis[j].leading_monomial(order))
        else {
            continue;
        };
        if coprime(a, b) {
            continue;
        }

        let reduced = normal_form(&s_polynomial(&basis[i], &basis[j], order), &basis, order);
        if reduced.is_zero() {
            continue;
        }
        if reduced.is_constant() {
            debug!("unit ideal");
            return vec![Polynomial::constant(reduced.nvars(), 1)];
        }

        let k = basis.len();
        pairs.extend((0..k).map(|i| (i, k)));
        basis.push(reduced.monic(order));
        trace!(size = basis.len(), "new basis element");
    }

    let reduced = reduce_basis(basis, order);
    debug!(size = reduced.len(), "computed Gröbner basis");
    reduced
}

/// Turns a Gröbner basis into the reduced Gröbner basis of the same ideal.
fn reduce_basis(mut basis: Vec<Polynomial>, order: MonomialOrder) -> Vec<Polynomial> {
    basis.sort_by(|f, g| match (f.leading_monomial(order), g.leading_monomial(order)) {
        (Some(a), Some(b)) => order.cmp(a, b),
        _ => f.len().cmp(&g.len()),
    });

    // a leading monomial divisible by another one is at least as large, so it comes later
    let mut minimal: Vec<Polynomial> = Vec::with_capacity(basis.len());
    for f in basis {
        let Some(lead) = f.leading_monomial(order) else {
            continue;
        };
        let redundant = minimal.iter()
            .filter_map(|g| g.leading_monomial(order))
            .any(|other| divides(other, lead));
        if !redundant {
            minimal.push(f);
        }
    }

    let mut reduced = (0..minimal.len())
        .map(|i| {
            let others = minimal.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, g)| g.clone())
                .collect::<Vec<_>>();
            normal_form(&minimal[i], &others, order).monic(order)
        })
        .collect::<Vec<_>>();
    reduced.reverse();
    reduced
}

/// Returns true if `basis` is the reduced Gröbner basis of the unit ideal.
pub fn is_unit(basis: &[Polynomial]) -> bool {
    basis.len() == 1 && basis[0].is_constant() && !basis[0].is_zero()
}

/// Returns a Gröbner basis of the intersection of the ideals generated by `first` and `second`,
/// polynomials in `nvars` variables.
///
/// This is the elimination of `t` from `t * first + (1 - t) * second`.
pub fn intersection(first: &[Polynomial], second: &[Polynomial], nvars: usize) -> Vec<Polynomial> {
    let t = Polynomial::variable(nvars + 1, 0);
    let one_minus_t = &Polynomial::constant(nvars + 1, 1) - &t;
    let generators = first.iter()
        .map(|f| &t * &f.embed(nvars + 1, 1))
        .chain(second.iter().map(|g| &one_minus_t * &g.embed(nvars + 1, 1)))
        .collect::<Vec<_>>();

    groebner_basis(&generators, MonomialOrder::Lex)
        .iter()
        .filter_map(|g| g.restrict(nvars, 1))
        .collect()
}

/// Returns true if some power of `poly` is in the ideal generated by `generators`.
///
/// This holds exactly when `1` is in the ideal generated by `generators` and `1 - y * poly`, for a
/// new variable `y`.
pub fn radical_contains(generators: &[Polynomial], poly: &Polynomial) -> bool {
    let nvars = poly.nvars();
    let y = Polynomial::variable(nvars + 1, nvars);
    let mut extended = generators.iter()
        .map(|g| g.embed(nvars + 1, 0))
        .collect::<Vec<_>>();
    extended.push(&Polynomial::constant(nvars + 1, 1) - &(&y * &poly.embed(nvars + 1, 0)));
    is_unit(&groebner_basis(&extended, MonomialOrder::GrevLex))
}

/// The monic greatest common divisor of two polynomials, computed as `f * g / lcm(f, g)`.
pub fn gcd(f: &Polynomial, g: &Polynomial) -> Polynomial {
    let order = MonomialOrder::GrevLex;
    if f.is_zero() {
        return g.monic(order);
    }
    if g.is_zero() {
        return f.monic(order);
    }

    // the intersection of two principal ideals is generated by the lcm
    let multiple = intersection(std::slice::from_ref(f), std::slice::from_ref(g), f.nvars());
    multiple.first()
        .and_then(|lcm| (f * g).div_exact(lcm))
        .map(|divisor| divisor.monic(order))
        .unwrap_or_else(|| Polynomial::constant(f.nvars(), 1))
}

/// The square-free part of a polynomial: the product of its distinct irreducible factors, with the
/// leading coefficient of `poly`.
///
/// Over the rationals, the repeated factors are exactly the common factors of `poly` and all its
/// partial derivatives.
pub fn square_free(poly: &Polynomial) -> Polynomial {
    let repeated = (0..poly.nvars())
        .fold(poly.clone(), |acc, i| gcd(&acc, &poly.derivative(i)));
    poly.div_exact(&repeated).unwrap_or_else(|| poly.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn xy() -> (Polynomial, Polynomial) {
        (Polynomial::variable(2, 0), Polynomial::variable(2, 1))
    }

    #[test]
    fn linear_generators() {
        let (x, y) = xy();
        let basis = groebner_basis(&[&x - &y, &x + &y], MonomialOrder::Lex);
        assert_eq!(basis, vec![x, y]);
    }

    #[test]
    fn lex_basis() {
        let (x, y) = xy();
        let one = Polynomial::constant(2, 1);
        let generators = [&x.pow(2) + &y, &(&x * &y) - &one];
        let basis = groebner_basis(&generators, MonomialOrder::Lex);
        assert_eq!(basis, vec![&x + &y.pow(2), &y.pow(3) + &one]);

        for g in &generators {
            assert!(normal_form(g, &basis, MonomialOrder::Lex).is_zero());
        }
        assert_eq!(normal_form(&y.pow(4), &basis, MonomialOrder::Lex), -&y);
    }

    #[test]
    fn unit_and_zero_ideals() {
        let (x, _) = xy();
        let one = Polynomial::constant(2, 1);
        assert!(is_unit(&groebner_basis(&[x.clone(), &x - &one], MonomialOrder::GrevLex)));
        assert!(groebner_basis(&[Polynomial::zero(2)], MonomialOrder::GrevLex).is_empty());
    }

    #[test]
    fn intersections() {
        let (x, y) = xy();
        let meet = intersection(&[x.clone()], &[y.clone()], 2);
        assert_eq!(meet, vec![&x * &y]);

        let meet = intersection(&[x.pow(2)], &[&x * &y], 2);
        assert_eq!(meet, vec![&x.pow(2) * &y]);
    }

    #[test]
    fn radical_membership() {
        let (x, y) = xy();
        let generators = [x.pow(2), y.pow(3)];
        assert!(radical_contains(&generators, &(&x + &y)));
        assert!(!radical_contains(&generators, &(&x + &Polynomial::constant(2, 1))));
        assert!(!radical_contains(&[x.pow(2)], &y));
    }

    #[test]
    fn gcds() {
        let (x, y) = xy();
        let f = &x.pow(2) - &y.pow(2);
        let g = (&x + &y).pow(2);
        assert_eq!(gcd(&f, &g), &x + &y);
        assert_eq!(gcd(&f, &Polynomial::zero(2)), f);
        assert_eq!(gcd(&x, &y), Polynomial::constant(2, 1));
    }

    #[test]
    fn square_free_parts() {
        let (x, y) = xy();
        let f = &x * &(&x - &y).pow(2);
        assert_eq!(square_free(&f), &x.pow(2) - &(&x * &y));

        let constant = Polynomial::constant(2, 3);
        assert_eq!(square_free(&constant), constant);
        assert_eq!(square_free(&y.pow(2).scale(&Rational::from(2))), y.scale(&Rational::from(2)));
    }
}
