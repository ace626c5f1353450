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

//! Fixed-point decimal parameter types.
//!
//! Each type stores a signed integer holding the value times a power of ten.
//! Conversions from floats round to the nearest step and saturate at the
//! type's limits. Text is parsed exactly, without going through a float.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};

/// Error returned when text is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a decimal number")]
pub struct BcdParseError(String);

/// Parses decimal text into a value scaled by `10^digits`, rounding half away
/// from zero past the last kept digit. Magnitudes that overflow saturate.
fn parse_scaled(text: &str, digits: u32) -> Result<i64, BcdParseError> {
    let invalid = || BcdParseError(text.to_string());
    let trimmed = text.trim();

    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
    {
        return Err(invalid());
    }

    let mut magnitude: i64 = 0;
    for b in whole.bytes() {
        magnitude = magnitude
            .saturating_mul(10)
            .saturating_add(i64::from(b - b'0'));
    }

    let mut fraction_digits = fraction.bytes();
    for _ in 0..digits {
        let digit = fraction_digits.next().map_or(0, |b| i64::from(b - b'0'));
        magnitude = magnitude.saturating_mul(10).saturating_add(digit);
    }
    if fraction_digits.next().is_some_and(|b| b >= b'5') {
        magnitude = magnitude.saturating_add(1);
    }

    Ok(if negative { -magnitude } else { magnitude })
}

/// Writes a scaled value with its trailing fractional zeros removed.
fn format_scaled(f: &mut fmt::Formatter<'_>, raw: i64, scale: i64, digits: usize) -> fmt::Result {
    let sign = if raw < 0 { "-" } else { "" };
    let magnitude = raw.unsigned_abs();
    let scale = scale.unsigned_abs();
    let whole = magnitude / scale;
    let fraction = magnitude % scale;
    if fraction == 0 {
        return write!(f, "{}{}", sign, whole);
    }
    let fraction = format!("{:0width$}", fraction, width = digits);
    write!(f, "{}{}.{}", sign, whole, fraction.trim_end_matches('0'))
}

macro_rules! bcd_type {
    (
        $(#[$meta:meta])*
        $name:ident($raw:ty), scale: $scale:expr, digits: $digits:expr, limit: $limit:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($raw);

        impl $name {
            /// Number of raw steps per unit.
            pub const SCALE: i64 = $scale;
            /// Decimal digits kept after the point.
            pub const DIGITS: u32 = $digits;
            pub const MIN: $name = $name(-$limit);
            pub const MAX: $name = $name($limit);
            pub const ZERO: $name = $name(0);

            /// Creates a value from a raw scaled integer, saturating at the limits.
            pub fn from_raw(raw: i64) -> Self {
                $name(raw.clamp(-$limit, $limit) as $raw)
            }

            pub fn raw(self) -> $raw {
                self.0
            }

            /// Rounds to the nearest step and saturates. NaN becomes zero.
            pub fn from_f64(value: f64) -> Self {
                if value.is_nan() {
                    return Self::ZERO;
                }
                let limit = $limit as f64;
                $name((value * Self::SCALE as f64).round().clamp(-limit, limit) as $raw)
            }

            pub fn to_f64(self) -> f64 {
                f64::from(self.0) / Self::SCALE as f64
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> f64 {
                value.to_f64()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                format_scaled(f, i64::from(self.0), Self::SCALE, $digits)
            }
        }

        impl FromStr for $name {
            type Err = BcdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_scaled(s, Self::DIGITS).map(Self::from_raw)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct BcdVisitor;

                impl<'v> Visitor<'v> for BcdVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a decimal number or decimal text")
                    }

                    fn visit_str<E: de::Error>(self, v: &str) -> Result<$name, E> {
                        v.parse().map_err(E::custom)
                    }

                    fn visit_f64<E: de::Error>(self, v: f64) -> Result<$name, E> {
                        Ok($name::from_f64(v))
                    }

                    fn visit_i64<E: de::Error>(self, v: i64) -> Result<$name, E> {
                        Ok($name::from_raw(v.saturating_mul($name::SCALE)))
                    }

                    fn visit_u64<E: de::Error>(self, v: u64) -> Result<$name, E> {
                        let v = i64::try_from(v).unwrap_or(i64::MAX);
                        Ok($name::from_raw(v.saturating_mul($name::SCALE)))
                    }
                }

                deserializer.deserialize_any(BcdVisitor)
            }
        }
    };
}

bcd_type!(
    /// A small parameter with three decimal places, between -29.999 and 29.999.
    SmallBcd(i16), scale: 1_000, digits: 3, limit: 29_999
);

bcd_type!(
    /// A large parameter with six decimal places, between -1999.999999 and 1999.999999.
    LargeBcd(i32), scale: 1_000_000, digits: 6, limit: 1_999_999_999
);

bcd_type!(
    /// A parameter with three decimal places and an extended range, between
    /// -1999999.999 and 1999999.999.
    SmallExtBcd(i32), scale: 1_000, digits: 3, limit: 1_999_999_999
);
