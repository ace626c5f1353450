// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Non-negative mixed fractions.
//!
//! A [`Fraction`] is an integer part plus a proper fraction. Arithmetic is done
//! on the improper form in 128-bit intermediates and every result is reduced by
//! the greatest common divisor. A result that cannot be stored in `u32` parts is
//! an error, never a silent wraparound.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors raised by fraction construction and arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FractionError {
    #[error("The denominator of a fraction must not be zero")]
    ZeroDenominator,

    #[error("The fraction {fraction}/{denominator} is not less than one")]
    ImproperFraction { fraction: u32, denominator: u32 },

    #[error("The result of the subtraction would be negative")]
    NegativeResult,

    #[error("The result does not fit in a fraction")]
    Overflow,

    #[error("The value {0} cannot be represented as a non-negative fraction")]
    InvalidValue(f64),

    #[error("'{0}' is not a fraction")]
    InvalidText(String),
}

/// A non-negative number `integer + fraction / denominator` with `fraction < denominator`.
#[derive(Debug, Clone, Copy)]
pub struct Fraction {
    integer: u32,
    fraction: u32,
    denominator: u32,
}

impl Fraction {
    /// Creates a fraction from its parts. The parts are kept as given; use
    /// [`Fraction::reduce`] to bring them to lowest terms.
    pub fn new(integer: u32, fraction: u32, denominator: u32) -> Result<Self, FractionError> {
        if denominator == 0 {
            return Err(FractionError::ZeroDenominator);
        }
        if fraction >= denominator {
            return Err(FractionError::ImproperFraction {
                fraction,
                denominator,
            });
        }
        Ok(Fraction {
            integer,
            fraction,
            denominator,
        })
    }

    /// A whole number.
    pub fn from_integer(integer: u32) -> Self {
        Fraction {
            integer,
            fraction: 0,
            denominator: 1,
        }
    }

    pub fn integer(&self) -> u32 {
        self.integer
    }

    pub fn fraction(&self) -> u32 {
        self.fraction
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Brings the fractional part to lowest terms. A zero fraction gets denominator 1.
    pub fn reduce(&mut self) {
        if self.fraction == 0 {
            self.denominator = 1;
            return;
        }
        let divisor = gcd(u128::from(self.fraction), u128::from(self.denominator)) as u32;
        self.fraction /= divisor;
        self.denominator /= divisor;
    }

    pub fn checked_add(self, other: Fraction) -> Result<Fraction, FractionError> {
        let numerator = self.numerator() * other.denominator() as u128
            + other.numerator() * self.denominator() as u128;
        let denominator = u128::from(self.denominator) * u128::from(other.denominator);
        Fraction::from_improper(numerator, denominator)
    }

    /// Subtracts `other`, which must not be greater than `self`.
    pub fn checked_sub(self, other: Fraction) -> Result<Fraction, FractionError> {
        let left = self.numerator() * u128::from(other.denominator);
        let right = other.numerator() * u128::from(self.denominator);
        if right > left {
            return Err(FractionError::NegativeResult);
        }
        let denominator = u128::from(self.denominator) * u128::from(other.denominator);
        Fraction::from_improper(left - right, denominator)
    }

    pub fn checked_mul(self, other: Fraction) -> Result<Fraction, FractionError> {
        let numerator = self
            .numerator()
            .checked_mul(other.numerator())
            .ok_or(FractionError::Overflow)?;
        let denominator = u128::from(self.denominator) * u128::from(other.denominator);
        Fraction::from_improper(numerator, denominator)
    }

    /// Converts a decimal to the nearest fraction with the given denominator,
    /// then reduces it. A fractional part that rounds up to a whole carries into
    /// the integer part.
    pub fn from_decimal(value: f64, denominator: u32) -> Result<Fraction, FractionError> {
        if denominator == 0 {
            return Err(FractionError::ZeroDenominator);
        }
        if !value.is_finite() || value < 0.0 || value >= 4294967296.0 {
            return Err(FractionError::InvalidValue(value));
        }

        let whole = value.floor();
        let mut integer = whole as u64;
        let mut fraction = ((value - whole) * f64::from(denominator)).round() as u64;
        if fraction >= u64::from(denominator) {
            integer += 1;
            fraction = 0;
        }
        let integer = u32::try_from(integer).map_err(|_| FractionError::Overflow)?;

        let mut result = Fraction {
            integer,
            fraction: fraction as u32,
            denominator,
        };
        result.reduce();
        Ok(result)
    }

    pub fn to_decimal(self) -> f64 {
        f64::from(self.integer) + f64::from(self.fraction) / f64::from(self.denominator)
    }

    fn numerator(&self) -> u128 {
        u128::from(self.integer) * u128::from(self.denominator) + u128::from(self.fraction)
    }

    fn from_improper(numerator: u128, denominator: u128) -> Result<Fraction, FractionError> {
        if denominator == 0 {
            return Err(FractionError::ZeroDenominator);
        }
        let integer = numerator / denominator;
        let remainder = numerator % denominator;
        let (fraction, denominator) = if remainder == 0 {
            (0, 1)
        } else {
            let divisor = gcd(remainder, denominator);
            (remainder / divisor, denominator / divisor)
        };

        Ok(Fraction {
            integer: u32::try_from(integer).map_err(|_| FractionError::Overflow)?,
            fraction: u32::try_from(fraction).map_err(|_| FractionError::Overflow)?,
            denominator: u32::try_from(denominator).map_err(|_| FractionError::Overflow)?,
        })
    }
}

/// Euclid's algorithm.
fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.numerator() * u128::from(other.denominator);
        let right = other.numerator() * u128::from(self.denominator);
        left.cmp(&right)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.integer, self.fraction) {
            (integer, 0) => write!(f, "{}", integer),
            (0, fraction) => write!(f, "{}/{}", fraction, self.denominator),
            (integer, fraction) => write!(f, "{} {}/{}", integer, fraction, self.denominator),
        }
    }
}

impl FromStr for Fraction {
    type Err = FractionError;

    /// Parses `"I"`, `"N/D"` or `"I N/D"`. A bare `"N/D"` may be improper and is normalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FractionError::InvalidText(s.to_string());
        let parts: Vec<&str> = s.split_whitespace().collect();

        let parse_ratio = |text: &str| -> Result<(u32, u32), FractionError> {
            let (n, d) = text.split_once('/').ok_or_else(invalid)?;
            let n = n.parse::<u32>().map_err(|_| invalid())?;
            let d = d.parse::<u32>().map_err(|_| invalid())?;
            Ok((n, d))
        };

        match parts.as_slice() {
            [single] if single.contains('/') => {
                let (n, d) = parse_ratio(single)?;
                if d == 0 {
                    return Err(FractionError::ZeroDenominator);
                }
                Fraction::from_improper(u128::from(n), u128::from(d))
            }
            [single] => Ok(Fraction::from_integer(
                single.parse::<u32>().map_err(|_| invalid())?,
            )),
            [integer, ratio] => {
                let integer = integer.parse::<u32>().map_err(|_| invalid())?;
                let (n, d) = parse_ratio(ratio)?;
                Fraction::new(integer, n, d)
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn frac(integer: u32, fraction: u32, denominator: u32) -> Fraction {
        Fraction::new(integer, fraction, denominator).unwrap()
    }

    fn assert_parts(f: Fraction, integer: u32, fraction: u32, denominator: u32) {
        assert_eq!(
            (f.integer(), f.fraction(), f.denominator()),
            (integer, fraction, denominator),
            "{:?}",
            f
        );
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(Fraction::new(1, 0, 0), Err(FractionError::ZeroDenominator));
        assert_eq!(
            Fraction::new(1, 4, 4),
            Err(FractionError::ImproperFraction {
                fraction: 4,
                denominator: 4
            })
        );
        assert_parts(frac(2, 2, 4), 2, 2, 4);
    }

    #[test]
    fn test_reduce() {
        let mut f = frac(1, 6, 8);
        f.reduce();
        assert_parts(f, 1, 3, 4);

        let mut zero = frac(3, 0, 12);
        zero.reduce();
        assert_parts(zero, 3, 0, 1);
    }

    #[test]
    fn test_add_carries_into_integer() {
        let sum = frac(1, 3, 4).checked_add(frac(0, 1, 2)).unwrap();
        assert_parts(sum, 2, 1, 4);

        let sum = frac(0, 1, 3).checked_add(frac(0, 2, 3)).unwrap();
        assert_parts(sum, 1, 0, 1);
    }

    #[test]
    fn test_sub() {
        let diff = frac(2, 1, 4).checked_sub(frac(0, 1, 2)).unwrap();
        assert_parts(diff, 1, 3, 4);

        let zero = frac(1, 1, 2).checked_sub(frac(1, 2, 4)).unwrap();
        assert_parts(zero, 0, 0, 1);

        assert_eq!(
            frac(0, 1, 3).checked_sub(frac(0, 1, 2)),
            Err(FractionError::NegativeResult)
        );
    }

    #[test]
    fn test_mul() {
        let product = frac(1, 1, 2).checked_mul(frac(2, 2, 3)).unwrap();
        assert_parts(product, 4, 0, 1);

        let product = frac(0, 2, 3).checked_mul(frac(0, 3, 4)).unwrap();
        assert_parts(product, 0, 1, 2);
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Fraction::from_integer(u32::MAX);
        assert_eq!(
            big.checked_add(Fraction::from_integer(1)),
            Err(FractionError::Overflow)
        );
        assert_eq!(
            big.checked_mul(Fraction::from_integer(2)),
            Err(FractionError::Overflow)
        );

        // Coprime denominators whose product exceeds u32.
        let a = frac(0, 1, 65537);
        let b = frac(0, 1, 65539);
        assert_eq!(a.checked_add(b), Err(FractionError::Overflow));
    }

    #[test]
    fn test_comparisons() {
        assert!(frac(0, 1, 2) == frac(0, 2, 4));
        assert!(frac(1, 1, 3) > frac(1, 1, 4));
        assert!(frac(1, 1, 3) >= frac(1, 2, 6));
        assert!(frac(0, 99, 100) < Fraction::from_integer(1));
        assert!(!(frac(2, 0, 5) > Fraction::from_integer(2)));
    }

    #[test]
    fn test_decimal_conversion() {
        assert_parts(Fraction::from_decimal(2.5, 4).unwrap(), 2, 1, 2);
        assert_parts(Fraction::from_decimal(0.33, 3).unwrap(), 0, 1, 3);
        // 1.999 rounds up to a whole number of eighths and carries.
        assert_parts(Fraction::from_decimal(1.999, 8).unwrap(), 2, 0, 1);
        assert_eq!(frac(3, 3, 4).to_decimal(), 3.75);

        assert_eq!(
            Fraction::from_decimal(-0.5, 2),
            Err(FractionError::InvalidValue(-0.5))
        );
        assert_eq!(
            Fraction::from_decimal(1.0, 0),
            Err(FractionError::ZeroDenominator)
        );
        assert!(Fraction::from_decimal(f64::NAN, 2).is_err());
    }

    #[test]
    fn test_text_round_trip() {
        for (text, expected) in [
            ("7", frac(7, 0, 1)),
            ("3/8", frac(0, 3, 8)),
            ("2 1/3", frac(2, 1, 3)),
        ] {
            let parsed: Fraction = text.parse().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), text);
        }

        let improper: Fraction = "9/4".parse().unwrap();
        assert_parts(improper, 2, 1, 4);

        assert!("".parse::<Fraction>().is_err());
        assert!("1 5/4".parse::<Fraction>().is_err());
        assert!("a/b".parse::<Fraction>().is_err());
        assert!("1 2 3".parse::<Fraction>().is_err());
        assert_eq!("1/0".parse::<Fraction>(), Err(FractionError::ZeroDenominator));
    }

    #[test]
    fn test_arithmetic_keeps_proper_reduced_results() {
        let mut rng = StdRng::seed_from_u64(0x0f0f_5eed);

        let random_fraction = |rng: &mut StdRng| {
            let denominator = rng.gen_range(1..=5000u32);
            frac(
                rng.gen_range(0..=100u32),
                rng.gen_range(0..denominator),
                denominator,
            )
        };

        for _ in 0..2000 {
            let a = random_fraction(&mut rng);
            let b = random_fraction(&mut rng);
            let (larger, smaller) = if a >= b { (a, b) } else { (b, a) };

            let results = [
                a.checked_add(b).unwrap(),
                larger.checked_sub(smaller).unwrap(),
                a.checked_mul(b).unwrap(),
            ];
            for result in results {
                assert!(result.fraction() < result.denominator(), "{:?}", result);
                let mut reduced = result;
                reduced.reduce();
                assert_parts(reduced, result.integer(), result.fraction(), result.denominator());
            }

            // Subtracting what was added gets back to the start.
            assert_eq!(a.checked_add(b).unwrap().checked_sub(b).unwrap(), a);
        }
    }
}
