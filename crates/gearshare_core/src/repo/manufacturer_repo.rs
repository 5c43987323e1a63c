//! Manufacturer repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `manufacturers` with name uniqueness.
//! - Restrict deletion while parts still reference the manufacturer.
//!
//! # Invariants
//! - A manufacturer that owns parts is never deleted; parts are never
//!   cascaded away with it.

use crate::model::manufacturer::{Manufacturer, ManufacturerId, NewManufacturer};
use crate::repo::{
    begin_immediate, ensure_connection_ready, push_paging, row_exists, ConstraintViolation,
    EntityKey, ForeignKeyViolation, ListQuery, RepoError, RepoResult,
};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const MANUFACTURER_SELECT_SQL: &str = "SELECT
    manufacturer_id,
    name,
    country
FROM manufacturers";

/// Repository interface for manufacturer operations.
pub trait ManufacturerRepository {
    /// Inserts a manufacturer and returns the store-assigned id.
    fn create_manufacturer(&self, manufacturer: &NewManufacturer) -> RepoResult<ManufacturerId>;
    /// Inserts a manufacturer under its caller-provided id.
    fn create_manufacturer_with_id(&self, manufacturer: &Manufacturer)
        -> RepoResult<ManufacturerId>;
    fn get_manufacturer(&self, id: ManufacturerId) -> RepoResult<Option<Manufacturer>>;
    fn find_manufacturer_by_name(&self, name: &str) -> RepoResult<Option<Manufacturer>>;
    fn list_manufacturers(&self, query: &ListQuery) -> RepoResult<Vec<Manufacturer>>;
    /// Counts parts that reference the manufacturer.
    fn count_parts_for_manufacturer(&self, id: ManufacturerId) -> RepoResult<u64>;
    fn update_manufacturer(&self, manufacturer: &Manufacturer) -> RepoResult<()>;
    /// Deletes a manufacturer that owns no parts.
    fn delete_manufacturer(&self, id: ManufacturerId) -> RepoResult<()>;
}

/// SQLite-backed manufacturer repository.
pub struct SqliteManufacturerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteManufacturerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(
        &self,
        id: Option<ManufacturerId>,
        name: &str,
        country: &str,
    ) -> RepoResult<ManufacturerId> {
        let tx = begin_immediate(self.conn)?;

        if let Some(id) = id {
            if row_exists(&tx, "manufacturers", "manufacturer_id", id.0)? {
                return Err(ConstraintViolation::DuplicateId {
                    table: "manufacturers",
                    id: id.0,
                }
                .into());
            }
        }
        if name_owner(&tx, name)?.is_some() {
            warn!("event=manufacturer_create module=repo status=rejected constraint=ux_manufacturers_name");
            return Err(ConstraintViolation::DuplicateManufacturerName {
                name: name.to_string(),
            }
            .into());
        }

        tx.execute(
            "INSERT INTO manufacturers (manufacturer_id, name, country)
             VALUES (?1, ?2, ?3);",
            params![id.map(|value| value.0), name, country],
        )?;
        let assigned = ManufacturerId(tx.last_insert_rowid());
        tx.commit()?;

        debug!("event=manufacturer_create module=repo status=ok manufacturer_id={assigned}");
        Ok(assigned)
    }
}

impl ManufacturerRepository for SqliteManufacturerRepository<'_> {
    fn create_manufacturer(&self, manufacturer: &NewManufacturer) -> RepoResult<ManufacturerId> {
        manufacturer.validate()?;
        self.insert(None, &manufacturer.name, &manufacturer.country)
    }

    fn create_manufacturer_with_id(
        &self,
        manufacturer: &Manufacturer,
    ) -> RepoResult<ManufacturerId> {
        manufacturer.validate()?;
        self.insert(
            Some(manufacturer.manufacturer_id),
            &manufacturer.name,
            &manufacturer.country,
        )
    }

    fn get_manufacturer(&self, id: ManufacturerId) -> RepoResult<Option<Manufacturer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MANUFACTURER_SELECT_SQL} WHERE manufacturer_id = ?1;"))?;
        let mut rows = stmt.query([id.0])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_manufacturer_row(row)?));
        }
        Ok(None)
    }

    fn find_manufacturer_by_name(&self, name: &str) -> RepoResult<Option<Manufacturer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MANUFACTURER_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_manufacturer_row(row)?));
        }
        Ok(None)
    }

    fn list_manufacturers(&self, query: &ListQuery) -> RepoResult<Vec<Manufacturer>> {
        let mut sql = format!("{MANUFACTURER_SELECT_SQL} ORDER BY manufacturer_id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        push_paging(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut manufacturers = Vec::new();
        while let Some(row) = rows.next()? {
            manufacturers.push(parse_manufacturer_row(row)?);
        }
        Ok(manufacturers)
    }

    fn count_parts_for_manufacturer(&self, id: ManufacturerId) -> RepoResult<u64> {
        count_owned_parts(self.conn, id)
    }

    fn update_manufacturer(&self, manufacturer: &Manufacturer) -> RepoResult<()> {
        manufacturer.validate()?;
        let id = manufacturer.manufacturer_id;

        let tx = begin_immediate(self.conn)?;
        if !row_exists(&tx, "manufacturers", "manufacturer_id", id.0)? {
            return Err(RepoError::NotFound(EntityKey::Manufacturer(id)));
        }
        if matches!(name_owner(&tx, &manufacturer.name)?, Some(owner) if owner != id) {
            warn!("event=manufacturer_update module=repo status=rejected manufacturer_id={id} constraint=ux_manufacturers_name");
            return Err(ConstraintViolation::DuplicateManufacturerName {
                name: manufacturer.name.clone(),
            }
            .into());
        }

        tx.execute(
            "UPDATE manufacturers
             SET
                name = ?2,
                country = ?3
             WHERE manufacturer_id = ?1;",
            params![id.0, manufacturer.name, manufacturer.country],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_manufacturer(&self, id: ManufacturerId) -> RepoResult<()> {
        let tx = begin_immediate(self.conn)?;
        if !row_exists(&tx, "manufacturers", "manufacturer_id", id.0)? {
            return Err(RepoError::NotFound(EntityKey::Manufacturer(id)));
        }

        let part_count = count_owned_parts(&tx, id)?;
        if part_count > 0 {
            warn!(
                "event=manufacturer_delete module=repo status=rejected manufacturer_id={id} reason=restrict part_count={part_count}"
            );
            return Err(ForeignKeyViolation::ManufacturerHasParts {
                manufacturer_id: id,
                part_count,
            }
            .into());
        }

        tx.execute(
            "DELETE FROM manufacturers WHERE manufacturer_id = ?1;",
            [id.0],
        )?;
        tx.commit()?;

        debug!("event=manufacturer_delete module=repo status=ok manufacturer_id={id}");
        Ok(())
    }
}

fn name_owner(conn: &Connection, name: &str) -> RepoResult<Option<ManufacturerId>> {
    let owner = conn
        .query_row(
            "SELECT manufacturer_id FROM manufacturers WHERE name = ?1;",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(owner.map(ManufacturerId))
}

fn count_owned_parts(conn: &Connection, id: ManufacturerId) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM parts WHERE manufacturer_id = ?1;",
        [id.0],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative part count `{count}`")))
}

fn parse_manufacturer_row(row: &Row<'_>) -> RepoResult<Manufacturer> {
    let manufacturer = Manufacturer {
        manufacturer_id: ManufacturerId(row.get("manufacturer_id")?),
        name: row.get("name")?,
        country: row.get("country")?,
    };
    manufacturer.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "manufacturers row {}: {err}",
            manufacturer.manufacturer_id
        ))
    })?;
    Ok(manufacturer)
}
