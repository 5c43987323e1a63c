//! Field-level validation rules shared by all catalog records.
//!
//! # Responsibility
//! - Express required/max-length/range rules as explicit functions.
//! - Report the offending field so callers can render precise messages.
//!
//! # Invariants
//! - Lengths are counted in characters, not bytes.
//! - Whitespace-only strings count as missing for required fields.
//! - Text fields never contain NUL.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level constraint failure detected before a write is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required string field is empty or whitespace-only.
    Required { field: &'static str },
    /// String field contains a NUL character, which the store cannot measure.
    ContainsNul { field: &'static str },
    /// String field exceeds its declared maximum length.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Numeric field must be greater than or equal to zero.
    Negative { field: &'static str, value: String },
    /// Price does not fit `decimal(10,2)`.
    PrecisionOverflow { field: &'static str, value: String },
    /// Model-year range is reversed.
    InvalidYearRange { year_start: i32, year_end: i32 },
}

impl ValidationError {
    /// Returns the qualified name of the field that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::ContainsNul { field }
            | Self::TooLong { field, .. }
            | Self::Negative { field, .. }
            | Self::PrecisionOverflow { field, .. } => field,
            Self::InvalidYearRange { .. } => "car.year_end",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{field} is required"),
            Self::ContainsNul { field } => write!(f, "{field} must not contain NUL characters"),
            Self::TooLong { field, max, actual } => write!(
                f,
                "{field} must be at most {max} characters, got {actual}"
            ),
            Self::Negative { field, value } => write!(
                f,
                "{field} must be greater than or equal to 0, got {value}"
            ),
            Self::PrecisionOverflow { field, value } => {
                write!(f, "{field} does not fit decimal(10,2), got {value}")
            }
            Self::InvalidYearRange {
                year_start,
                year_end,
            } => write!(
                f,
                "car.year_end ({year_end}) must be >= car.year_start ({year_start})"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required string field against its maximum length.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.contains('\0') {
        return Err(ValidationError::ContainsNul { field });
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }

    Ok(())
}

/// Checks that an integer field is not negative.
pub(crate) fn require_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_non_negative, require_text, ValidationError};

    #[test]
    fn require_text_rejects_blank_values() {
        assert_eq!(
            require_text("manufacturer.name", "   ", 100),
            Err(ValidationError::Required {
                field: "manufacturer.name"
            })
        );
    }

    #[test]
    fn require_text_counts_characters_not_bytes() {
        let name = "é".repeat(50);
        assert!(require_text("car.make", &name, 50).is_ok());

        let err = require_text("car.make", &format!("{name}x"), 50).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "car.make",
                max: 50,
                actual: 51
            }
        );
    }

    #[test]
    fn require_text_rejects_embedded_nul() {
        assert_eq!(
            require_text("manufacturer.name", "\0Bosch", 100),
            Err(ValidationError::ContainsNul {
                field: "manufacturer.name"
            })
        );
        assert!(require_text("part.description", "Fits\tall trims", 255).is_ok());
    }

    #[test]
    fn require_non_negative_accepts_zero() {
        assert!(require_non_negative("part.stock_quantity", 0).is_ok());
        assert!(require_non_negative("part.stock_quantity", -1).is_err());
    }
}
