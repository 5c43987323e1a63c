//! Fixed-point price value.
//!
//! # Responsibility
//! - Represent `decimal(10,2)` prices without floating-point error.
//! - Convert between decimal text and integer cents.
//!
//! # Invariants
//! - Stored value is always integer cents.
//! - Text form always renders exactly two fraction digits.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Largest value representable by `decimal(10,2)`, in cents (`99999999.99`).
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;

/// Fixed-point price with two fraction digits.
///
/// Negative values are representable so that validation, not construction,
/// decides whether a price is acceptable for persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Creates a price from integer cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the price in integer cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns whether the value fits `decimal(10,2)` in magnitude.
    pub fn fits_precision(self) -> bool {
        self.0.unsigned_abs() <= MAX_PRICE_CENTS as u64
    }
}

/// Decimal text could not be parsed as a two-digit fixed-point value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceParseError {
    input: String,
}

impl Display for PriceParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid price `{}`; expected digits with at most 2 fraction digits",
            self.input
        )
    }
}

impl Error for PriceParseError {}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || PriceParseError {
            input: value.to_string(),
        };

        let trimmed = value.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) || fraction.len() > 2 {
            return Err(invalid());
        }

        let whole_value: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a decimal string with at most 2 fraction digits")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PriceVisitor)
    }
}
