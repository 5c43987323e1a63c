//! Catalog core for the GearShare auto-parts marketplace.
//! This crate owns the schema and every integrity rule of the catalog.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::car::{Car, CarId, NewCar};
pub use model::compatibility::PartCompatibility;
pub use model::manufacturer::{Manufacturer, ManufacturerId, NewManufacturer};
pub use model::part::{NewPart, Part, PartId};
pub use model::price::{Price, PriceParseError};
pub use model::validation::ValidationError;
pub use repo::car_repo::{CarRepository, SqliteCarRepository};
pub use repo::compatibility_repo::{CompatibilityRepository, SqliteCompatibilityRepository};
pub use repo::manufacturer_repo::{ManufacturerRepository, SqliteManufacturerRepository};
pub use repo::part_repo::{PartListQuery, PartRepository, SqlitePartRepository};
pub use repo::{
    ConstraintViolation, EntityKey, ForeignKeyViolation, ListQuery, RepoError, RepoResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
