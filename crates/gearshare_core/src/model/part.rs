//! Part domain model.
//!
//! # Responsibility
//! - Define the part record and its insert payload.
//! - Validate text, price and stock constraints before persistence.
//!
//! # Invariants
//! - `sku` is required, at most 50 characters and unique across rows.
//! - `price` is non-negative and fits `decimal(10,2)`.
//! - `stock_quantity` is non-negative and defaults to 0.
//! - Every part references exactly one manufacturer.

use crate::model::manufacturer::ManufacturerId;
use crate::model::price::Price;
use crate::model::validation::{require_non_negative, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const PART_SKU_MAX: usize = 50;
pub const PART_NAME_MAX: usize = 100;
pub const PART_DESCRIPTION_MAX: usize = 255;

/// Surrogate key of a part row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub i64);

impl Display for PartId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insert payload for a part; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPart {
    /// External stock-keeping identifier.
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: i32,
    pub manufacturer_id: ManufacturerId,
}

impl NewPart {
    /// Creates a part payload with zero stock.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
        manufacturer_id: ManufacturerId,
    ) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            description: description.into(),
            price,
            stock_quantity: 0,
            manufacturer_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.sku,
            &self.name,
            &self.description,
            self.price,
            self.stock_quantity,
        )
    }

    pub fn with_id(self, part_id: PartId) -> Part {
        Part {
            part_id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            manufacturer_id: self.manufacturer_id,
        }
    }
}

/// Persisted part record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub part_id: PartId,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock_quantity: i32,
    pub manufacturer_id: ManufacturerId,
}

impl Part {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.sku,
            &self.name,
            &self.description,
            self.price,
            self.stock_quantity,
        )
    }

    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

fn validate_fields(
    sku: &str,
    name: &str,
    description: &str,
    price: Price,
    stock_quantity: i32,
) -> Result<(), ValidationError> {
    require_text("part.sku", sku, PART_SKU_MAX)?;
    require_text("part.name", name, PART_NAME_MAX)?;
    require_text("part.description", description, PART_DESCRIPTION_MAX)?;

    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "part.price",
            value: price.to_string(),
        });
    }
    if !price.fits_precision() {
        return Err(ValidationError::PrecisionOverflow {
            field: "part.price",
            value: price.to_string(),
        });
    }

    require_non_negative("part.stock_quantity", i64::from(stock_quantity))?;
    Ok(())
}
