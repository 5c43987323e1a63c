//! Catalog domain model.
//!
//! # Responsibility
//! - Define record shapes for manufacturers, cars, parts and compatibility
//!   links.
//! - Provide explicit validation functions for every field constraint.
//!
//! # Invariants
//! - Relations are expressed through id fields only; no record embeds
//!   another record.
//! - Every record type exposes `validate()` and repositories call it on
//!   every write.

pub mod car;
pub mod compatibility;
pub mod manufacturer;
pub mod part;
pub mod price;
pub mod validation;
