//! Runtime configuration for the catalog core.
//!
//! # Responsibility
//! - Resolve store location and logging settings from the environment.
//!
//! # Invariants
//! - Loading never fails; unset or blank variables fall back to defaults.
//! - An absent database path means an in-memory store.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "GEARSHARE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "GEARSHARE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "GEARSHARE_LOG_DIR";

/// Settings consumed by store bootstrap and logging init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file path. `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory. `None` leaves file logging disabled.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}
