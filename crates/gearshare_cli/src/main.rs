//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gearshare_core` linkage and open the configured catalog store.
//! - Keep output deterministic for quick local sanity checks.

use gearshare_core::db::migrations::current_version;
use gearshare_core::db::open_configured_db;
use gearshare_core::{
    init_logging_from_config, CarRepository, CoreConfig, ListQuery, ManufacturerRepository,
    PartListQuery, PartRepository, RepoResult, SqliteCarRepository, SqliteManufacturerRepository,
    SqlitePartRepository,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gearshare_core ping={}", gearshare_core::ping());
    println!("gearshare_core version={}", gearshare_core::core_version());

    let config = CoreConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    let conn = match open_configured_db(&config) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("failed to open catalog store: {err}");
            return ExitCode::FAILURE;
        }
    };

    match config.db_path.as_deref() {
        Some(path) => println!("store=file path={}", path.display()),
        None => println!("store=memory"),
    }

    match current_version(&conn) {
        Ok(version) => println!("schema_version={version}"),
        Err(err) => {
            eprintln!("failed to read schema version: {err}");
            return ExitCode::FAILURE;
        }
    }

    match row_counts(&conn) {
        Ok((manufacturers, cars, parts)) => {
            println!("manufacturers={manufacturers} cars={cars} parts={parts}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to read catalog: {err}");
            ExitCode::FAILURE
        }
    }
}

fn row_counts(conn: &rusqlite::Connection) -> RepoResult<(usize, usize, usize)> {
    let manufacturers = SqliteManufacturerRepository::try_new(conn)?
        .list_manufacturers(&ListQuery::default())?
        .len();
    let cars = SqliteCarRepository::try_new(conn)?
        .list_cars(&ListQuery::default())?
        .len();
    let parts = SqlitePartRepository::try_new(conn)?
        .list_parts(&PartListQuery::default())?
        .len();
    Ok((manufacturers, cars, parts))
}
