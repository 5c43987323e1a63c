//! Catalog schema migrations.
//!
//! The schema version lives in `PRAGMA user_version`. Opening a store brings
//! it up to [`latest_version`]; a store written by a newer build is refused.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - Pending steps run under one `BEGIN IMMEDIATE` transaction, so concurrent
//!   openers of the same file serialize and only the first one migrates.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, TransactionBehavior};

/// One schema step: the SQL that moves the store to `version`.
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    SchemaStep {
        version: 2,
        name: "part_compatibilities",
        sql: include_str!("0002_part_compatibilities.sql"),
    },
];

/// Returns the newest schema version this build can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Returns the schema version recorded in the connected database.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the connected store up to [`latest_version`].
///
/// The version is re-read after the write lock is taken; a store another
/// connection migrated in the meantime is left untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let latest = latest_version();
    if is_up_to_date(current_version(conn)?, latest)? {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let from_version = current_version(&tx)?;
    if is_up_to_date(from_version, latest)? {
        debug!("event=db_migrate module=db status=skipped version={from_version}");
        return Ok(());
    }

    for step in SCHEMA_STEPS.iter().filter(|step| step.version > from_version) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

fn is_up_to_date(db_version: u32, latest: u32) -> DbResult<bool> {
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }
    Ok(db_version == latest)
}
