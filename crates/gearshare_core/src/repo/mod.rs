//! Catalog persistence boundary.
//!
//! # Responsibility
//! - Define per-entity repository contracts and SQLite implementations.
//! - Enforce validation, uniqueness and referential rules on every write.
//! - Report integrity failures as semantic errors naming the rule that failed.
//!
//! # Invariants
//! - Write paths call `validate()` before any SQL mutation.
//! - Multi-step writes run in one `BEGIN IMMEDIATE` transaction and roll back
//!   on any error.
//! - Read paths reject persisted rows that fail validation.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::car::CarId;
use crate::model::compatibility::PartCompatibility;
use crate::model::manufacturer::ManufacturerId;
use crate::model::part::PartId;
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{ffi, Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod car_repo;
pub mod compatibility_repo;
pub mod manufacturer_repo;
pub mod part_repo;

pub type RepoResult<T> = Result<T, RepoError>;

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("manufacturers", &["manufacturer_id", "name", "country"]),
    ("cars", &["car_id", "make", "model", "year_start", "year_end"]),
    (
        "parts",
        &[
            "part_id",
            "sku",
            "name",
            "description",
            "price_cents",
            "stock_quantity",
            "manufacturer_id",
        ],
    ),
    ("part_compatibilities", &["part_id", "car_id"]),
];

/// Identity of a catalog row, used by `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKey {
    Manufacturer(ManufacturerId),
    Car(CarId),
    Part(PartId),
    Compatibility(PartCompatibility),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manufacturer(id) => write!(f, "manufacturer {id}"),
            Self::Car(id) => write!(f, "car {id}"),
            Self::Part(id) => write!(f, "part {id}"),
            Self::Compatibility(link) => {
                write!(f, "compatibility (part {}, car {})", link.part_id, link.car_id)
            }
        }
    }
}

/// Uniqueness or key collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    DuplicateManufacturerName { name: String },
    DuplicateSku { sku: String },
    DuplicateCompatibility(PartCompatibility),
    /// Explicit id passed to a `*_with_id` insert is already taken.
    DuplicateId { table: &'static str, id: i64 },
    /// Unique, key, CHECK or NOT NULL failure raised by the engine without
    /// repository context.
    Engine { message: String },
}

impl ConstraintViolation {
    /// Returns the name of the violated index or key.
    pub fn constraint(&self) -> &str {
        match self {
            Self::DuplicateManufacturerName { .. } => "ux_manufacturers_name",
            Self::DuplicateSku { .. } => "ux_parts_sku",
            Self::DuplicateCompatibility(_) => "pk_part_compatibilities",
            Self::DuplicateId { table, .. } => primary_key_name(table),
            Self::Engine { message } => message.as_str(),
        }
    }
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateManufacturerName { name } => {
                write!(f, "manufacturer name `{name}` already exists")
            }
            Self::DuplicateSku { sku } => write!(f, "part sku `{sku}` already exists"),
            Self::DuplicateCompatibility(link) => write!(
                f,
                "part {} is already linked to car {}",
                link.part_id, link.car_id
            ),
            Self::DuplicateId { table, id } => write!(f, "{table} id {id} already exists"),
            Self::Engine { message } => write!(f, "{message}"),
        }
    }
}

fn primary_key_name(table: &str) -> &'static str {
    match table {
        "manufacturers" => "pk_manufacturers",
        "cars" => "pk_cars",
        "parts" => "pk_parts",
        _ => "primary_key",
    }
}

/// Missing reference or delete blocked by dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignKeyViolation {
    MissingManufacturer(ManufacturerId),
    MissingPart(PartId),
    MissingCar(CarId),
    /// Restrict rule: the manufacturer still owns parts.
    ManufacturerHasParts {
        manufacturer_id: ManufacturerId,
        part_count: u64,
    },
    /// Raised by the engine without repository context.
    Engine { message: String },
}

impl ForeignKeyViolation {
    /// Returns the foreign-key column involved.
    pub fn constraint(&self) -> &str {
        match self {
            Self::MissingManufacturer(_) | Self::ManufacturerHasParts { .. } => {
                "parts.manufacturer_id"
            }
            Self::MissingPart(_) => "part_compatibilities.part_id",
            Self::MissingCar(_) => "part_compatibilities.car_id",
            Self::Engine { message } => message.as_str(),
        }
    }
}

impl Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingManufacturer(id) => write!(f, "manufacturer {id} does not exist"),
            Self::MissingPart(id) => write!(f, "part {id} does not exist"),
            Self::MissingCar(id) => write!(f, "car {id} does not exist"),
            Self::ManufacturerHasParts {
                manufacturer_id,
                part_count,
            } => write!(
                f,
                "manufacturer {manufacturer_id} still owns {part_count} part(s)"
            ),
            Self::Engine { message } => write!(f, "{message}"),
        }
    }
}

/// Error returned by every catalog repository operation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    ConstraintViolation(ConstraintViolation),
    ForeignKeyViolation(ForeignKeyViolation),
    NotFound(EntityKey),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::ConstraintViolation(err) => write!(f, "constraint violation: {err}"),
            Self::ForeignKeyViolation(err) => write!(f, "foreign key violation: {err}"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "catalog repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ConstraintViolation> for RepoError {
    fn from(value: ConstraintViolation) -> Self {
        Self::ConstraintViolation(value)
    }
}

impl From<ForeignKeyViolation> for RepoError {
    fn from(value: ForeignKeyViolation) -> Self {
        Self::ForeignKeyViolation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    /// Classifies engine constraint failures; everything else is transport.
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE
                | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                | ffi::SQLITE_CONSTRAINT_CHECK
                | ffi::SQLITE_CONSTRAINT_NOTNULL => {
                    return Self::ConstraintViolation(ConstraintViolation::Engine { message });
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Self::ForeignKeyViolation(ForeignKeyViolation::Engine { message });
                }
                _ => {}
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Paging options shared by list operations. Rows are ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Checks that `conn` carries the full, current catalog schema.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Starts a write transaction that takes the database write lock up front.
///
/// Dropping the returned transaction without commit rolls it back.
pub(crate) fn begin_immediate(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

/// Returns whether a row with `id` exists in `table`.
///
/// `table` and `key_column` must be trusted identifiers.
pub(crate) fn row_exists(
    conn: &Connection,
    table: &str,
    key_column: &str,
    id: i64,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE {key_column} = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Appends `LIMIT`/`OFFSET` clauses and their bind values.
pub(crate) fn push_paging(sql: &mut String, bind_values: &mut Vec<Value>, query: &ListQuery) {
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }
    } else if query.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(query.offset)));
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
