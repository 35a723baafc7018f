//! Functions to construct [`Integer`]s and [`Rational`]s from various types.

use rug::{Integer, Rational};

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given value.
pub fn rat<T>(n: T) -> Rational
where
    Rational: From<T>,
{
    Rational::from(n)
}

/// Creates the [`Rational`] `num / den`, reduced to lowest terms.
///
/// Panics if `den` is zero.
pub fn frac(num: i64, den: i64) -> Rational {
    assert!(den != 0, "division by zero");
    Rational::from((int(num), int(den)))
}

/// Returns the number of bits needed to store the numerator and denominator of the given
/// [`Rational`]. Used to rank numbers by how unwieldy they are.
pub fn bit_size(n: &Rational) -> usize {
    (n.numer().significant_bits() + n.denom().significant_bits()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_are_reduced() {
        assert_eq!(frac(4, -6), frac(-2, 3));
        assert_eq!(frac(0, 5), rat(0));
        assert_eq!(frac(10, 5), rat(2));
    }

    #[test]
    fn bit_sizes() {
        assert_eq!(bit_size(&rat(1)), 2);
        assert_eq!(bit_size(&frac(3, 4)), 5);
        assert!(bit_size(&frac(1, 1 << 20)) > bit_size(&frac(1, 2)));
    }
}
