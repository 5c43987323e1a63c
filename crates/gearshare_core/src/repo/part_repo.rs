//! Part repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `parts` with SKU uniqueness.
//! - Guarantee every part references an existing manufacturer.
//!
//! # Invariants
//! - Existence, uniqueness and the write share one immediate transaction.
//! - Deleting a part removes its compatibility links in the same
//!   transaction.

use crate::model::manufacturer::ManufacturerId;
use crate::model::part::{NewPart, Part, PartId};
use crate::model::price::Price;
use crate::repo::{
    begin_immediate, ensure_connection_ready, push_paging, row_exists, ConstraintViolation,
    EntityKey, ForeignKeyViolation, ListQuery, RepoError, RepoResult,
};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub(crate) const PART_SELECT_SQL: &str = "SELECT
    parts.part_id AS part_id,
    parts.sku AS sku,
    parts.name AS name,
    parts.description AS description,
    parts.price_cents AS price_cents,
    parts.stock_quantity AS stock_quantity,
    parts.manufacturer_id AS manufacturer_id
FROM parts";

/// Query options for listing parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartListQuery {
    /// Restricts results to parts owned by one manufacturer.
    pub manufacturer_id: Option<ManufacturerId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for part operations.
pub trait PartRepository {
    fn create_part(&self, part: &NewPart) -> RepoResult<PartId>;
    /// Inserts a part under its caller-provided id.
    fn create_part_with_id(&self, part: &Part) -> RepoResult<PartId>;
    fn get_part(&self, id: PartId) -> RepoResult<Option<Part>>;
    fn find_part_by_sku(&self, sku: &str) -> RepoResult<Option<Part>>;
    fn list_parts(&self, query: &PartListQuery) -> RepoResult<Vec<Part>>;
    fn update_part(&self, part: &Part) -> RepoResult<()>;
    /// Deletes a part together with its compatibility links.
    fn delete_part(&self, id: PartId) -> RepoResult<()>;
}

/// SQLite-backed part repository.
pub struct SqlitePartRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePartRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, id: Option<PartId>, part: &NewPart) -> RepoResult<PartId> {
        let tx = begin_immediate(self.conn)?;

        if let Some(id) = id {
            if row_exists(&tx, "parts", "part_id", id.0)? {
                return Err(ConstraintViolation::DuplicateId {
                    table: "parts",
                    id: id.0,
                }
                .into());
            }
        }
        ensure_manufacturer_exists(&tx, part.manufacturer_id)?;
        if sku_owner(&tx, &part.sku)?.is_some() {
            warn!("event=part_create module=repo status=rejected constraint=ux_parts_sku");
            return Err(ConstraintViolation::DuplicateSku {
                sku: part.sku.clone(),
            }
            .into());
        }

        tx.execute(
            "INSERT INTO parts (
                part_id,
                sku,
                name,
                description,
                price_cents,
                stock_quantity,
                manufacturer_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.map(|value| value.0),
                part.sku,
                part.name,
                part.description,
                part.price.cents(),
                part.stock_quantity,
                part.manufacturer_id.0,
            ],
        )?;
        let assigned = PartId(tx.last_insert_rowid());
        tx.commit()?;

        debug!(
            "event=part_create module=repo status=ok part_id={assigned} manufacturer_id={}",
            part.manufacturer_id
        );
        Ok(assigned)
    }
}

impl PartRepository for SqlitePartRepository<'_> {
    fn create_part(&self, part: &NewPart) -> RepoResult<PartId> {
        part.validate()?;
        self.insert(None, part)
    }

    fn create_part_with_id(&self, part: &Part) -> RepoResult<PartId> {
        part.validate()?;
        let payload = NewPart {
            sku: part.sku.clone(),
            name: part.name.clone(),
            description: part.description.clone(),
            price: part.price,
            stock_quantity: part.stock_quantity,
            manufacturer_id: part.manufacturer_id,
        };
        self.insert(Some(part.part_id), &payload)
    }

    fn get_part(&self, id: PartId) -> RepoResult<Option<Part>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PART_SELECT_SQL} WHERE parts.part_id = ?1;"))?;
        let mut rows = stmt.query([id.0])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_part_row(row)?));
        }
        Ok(None)
    }

    fn find_part_by_sku(&self, sku: &str) -> RepoResult<Option<Part>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PART_SELECT_SQL} WHERE parts.sku = ?1;"))?;
        let mut rows = stmt.query([sku])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_part_row(row)?));
        }
        Ok(None)
    }

    fn list_parts(&self, query: &PartListQuery) -> RepoResult<Vec<Part>> {
        let mut sql = format!("{PART_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(manufacturer_id) = query.manufacturer_id {
            sql.push_str(" AND parts.manufacturer_id = ?");
            bind_values.push(Value::Integer(manufacturer_id.0));
        }

        sql.push_str(" ORDER BY parts.part_id ASC");
        let page = ListQuery {
            limit: query.limit,
            offset: query.offset,
        };
        push_paging(&mut sql, &mut bind_values, &page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut parts = Vec::new();
        while let Some(row) = rows.next()? {
            parts.push(parse_part_row(row)?);
        }
        Ok(parts)
    }

    fn update_part(&self, part: &Part) -> RepoResult<()> {
        part.validate()?;
        let id = part.part_id;

        let tx = begin_immediate(self.conn)?;
        if !row_exists(&tx, "parts", "part_id", id.0)? {
            return Err(RepoError::NotFound(EntityKey::Part(id)));
        }
        ensure_manufacturer_exists(&tx, part.manufacturer_id)?;
        if matches!(sku_owner(&tx, &part.sku)?, Some(owner) if owner != id) {
            warn!("event=part_update module=repo status=rejected part_id={id} constraint=ux_parts_sku");
            return Err(ConstraintViolation::DuplicateSku {
                sku: part.sku.clone(),
            }
            .into());
        }

        tx.execute(
            "UPDATE parts
             SET
                sku = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                stock_quantity = ?6,
                manufacturer_id = ?7
             WHERE part_id = ?1;",
            params![
                id.0,
                part.sku,
                part.name,
                part.description,
                part.price.cents(),
                part.stock_quantity,
                part.manufacturer_id.0,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_part(&self, id: PartId) -> RepoResult<()> {
        let tx = begin_immediate(self.conn)?;
        let unlinked = tx.execute("DELETE FROM part_compatibilities WHERE part_id = ?1;", [id.0])?;
        let changed = tx.execute("DELETE FROM parts WHERE part_id = ?1;", [id.0])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Part(id)));
        }
        tx.commit()?;

        debug!("event=part_delete module=repo status=ok part_id={id} unlinked={unlinked}");
        Ok(())
    }
}

fn ensure_manufacturer_exists(conn: &Connection, id: ManufacturerId) -> RepoResult<()> {
    if row_exists(conn, "manufacturers", "manufacturer_id", id.0)? {
        return Ok(());
    }
    warn!("event=part_write module=repo status=rejected manufacturer_id={id} constraint=parts.manufacturer_id");
    Err(ForeignKeyViolation::MissingManufacturer(id).into())
}

fn sku_owner(conn: &Connection, sku: &str) -> RepoResult<Option<PartId>> {
    let owner = conn
        .query_row("SELECT part_id FROM parts WHERE sku = ?1;", [sku], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?;
    Ok(owner.map(PartId))
}

pub(crate) fn parse_part_row(row: &Row<'_>) -> RepoResult<Part> {
    let part = Part {
        part_id: PartId(row.get("part_id")?),
        sku: row.get("sku")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: Price::from_cents(row.get("price_cents")?),
        stock_quantity: row.get("stock_quantity")?,
        manufacturer_id: ManufacturerId(row.get("manufacturer_id")?),
    };
    part.validate()
        .map_err(|err| RepoError::InvalidData(format!("parts row {}: {err}", part.part_id)))?;
    Ok(part)
}
