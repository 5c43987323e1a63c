//! Manufacturer domain model.
//!
//! # Responsibility
//! - Define the manufacturer record and its insert payload.
//! - Validate name/country constraints before persistence.
//!
//! # Invariants
//! - `name` is required, at most 100 characters and unique across rows.
//! - `country` is required and at most 50 characters.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MANUFACTURER_NAME_MAX: usize = 100;
pub const MANUFACTURER_COUNTRY_MAX: usize = 50;

/// Surrogate key of a manufacturer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManufacturerId(pub i64);

impl Display for ManufacturerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insert payload for a manufacturer; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewManufacturer {
    pub name: String,
    pub country: String,
}

impl NewManufacturer {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }

    /// Validates field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.country)
    }

    /// Attaches an id, producing the persisted record shape.
    pub fn with_id(self, manufacturer_id: ManufacturerId) -> Manufacturer {
        Manufacturer {
            manufacturer_id,
            name: self.name,
            country: self.country,
        }
    }
}

/// Persisted manufacturer record.
///
/// Owned parts are not embedded; query them by `manufacturer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    pub country: String,
}

impl Manufacturer {
    /// Validates field constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.country)
    }
}

fn validate_fields(name: &str, country: &str) -> Result<(), ValidationError> {
    require_text("manufacturer.name", name, MANUFACTURER_NAME_MAX)?;
    require_text("manufacturer.country", country, MANUFACTURER_COUNTRY_MAX)?;
    Ok(())
}
