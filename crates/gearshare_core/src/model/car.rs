//! Car variant domain model.
//!
//! # Responsibility
//! - Define the car record (make/model over an inclusive model-year range).
//!
//! # Invariants
//! - `make` and `model` are required, at most 50 characters each.
//! - `year_start <= year_end`.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const CAR_MAKE_MAX: usize = 50;
pub const CAR_MODEL_MAX: usize = 50;

/// Surrogate key of a car row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarId(pub i64);

impl Display for CarId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insert payload for a car; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year_start: i32,
    pub year_end: i32,
}

impl NewCar {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year_start: i32,
        year_end: i32,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year_start,
            year_end,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.make, &self.model, self.year_start, self.year_end)
    }

    pub fn with_id(self, car_id: CarId) -> Car {
        Car {
            car_id,
            make: self.make,
            model: self.model,
            year_start: self.year_start,
            year_end: self.year_end,
        }
    }
}

/// Persisted car record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub car_id: CarId,
    pub make: String,
    pub model: String,
    /// First model year covered, inclusive.
    pub year_start: i32,
    /// Last model year covered, inclusive.
    pub year_end: i32,
}

impl Car {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.make, &self.model, self.year_start, self.year_end)
    }

    /// Returns whether `year` falls inside the covered model-year range.
    pub fn covers_year(&self, year: i32) -> bool {
        (self.year_start..=self.year_end).contains(&year)
    }
}

fn validate_fields(
    make: &str,
    model: &str,
    year_start: i32,
    year_end: i32,
) -> Result<(), ValidationError> {
    require_text("car.make", make, CAR_MAKE_MAX)?;
    require_text("car.model", model, CAR_MODEL_MAX)?;
    if year_start > year_end {
        return Err(ValidationError::InvalidYearRange {
            year_start,
            year_end,
        });
    }
    Ok(())
}
