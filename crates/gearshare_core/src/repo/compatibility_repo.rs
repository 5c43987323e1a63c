//! Part/car compatibility repository.
//!
//! # Responsibility
//! - Create and remove fitment links between existing parts and cars.
//! - Answer the navigation queries "which cars does this part fit" and
//!   "which parts fit this car".
//!
//! # Invariants
//! - A link exists only while both its part and its car exist.
//! - `(part_id, car_id)` is unique.

use crate::model::car::{Car, CarId};
use crate::model::compatibility::PartCompatibility;
use crate::model::part::{Part, PartId};
use crate::repo::car_repo::{parse_car_row, CAR_SELECT_SQL};
use crate::repo::part_repo::{parse_part_row, PART_SELECT_SQL};
use crate::repo::{
    begin_immediate, ensure_connection_ready, row_exists, ConstraintViolation, EntityKey,
    ForeignKeyViolation, RepoError, RepoResult,
};
use log::{debug, warn};
use rusqlite::{params, Connection};

/// Repository interface for compatibility links.
pub trait CompatibilityRepository {
    /// Declares that `link.part_id` fits `link.car_id`.
    fn link(&self, link: PartCompatibility) -> RepoResult<()>;
    /// Removes an existing link.
    fn unlink(&self, link: PartCompatibility) -> RepoResult<()>;
    fn is_linked(&self, link: PartCompatibility) -> RepoResult<bool>;
    fn list_links_for_part(&self, part_id: PartId) -> RepoResult<Vec<PartCompatibility>>;
    fn list_links_for_car(&self, car_id: CarId) -> RepoResult<Vec<PartCompatibility>>;
    /// Lists cars the part fits, ordered by car id.
    fn list_cars_for_part(&self, part_id: PartId) -> RepoResult<Vec<Car>>;
    /// Lists parts that fit the car, ordered by part id.
    fn list_parts_for_car(&self, car_id: CarId) -> RepoResult<Vec<Part>>;
}

/// SQLite-backed compatibility repository.
pub struct SqliteCompatibilityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompatibilityRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn list_links(&self, column: &str, id: i64) -> RepoResult<Vec<PartCompatibility>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT part_id, car_id
             FROM part_compatibilities
             WHERE {column} = ?1
             ORDER BY part_id ASC, car_id ASC;"
        ))?;
        let mut rows = stmt.query([id])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(PartCompatibility::new(
                PartId(row.get("part_id")?),
                CarId(row.get("car_id")?),
            ));
        }
        Ok(links)
    }
}

impl CompatibilityRepository for SqliteCompatibilityRepository<'_> {
    fn link(&self, link: PartCompatibility) -> RepoResult<()> {
        let tx = begin_immediate(self.conn)?;

        if !row_exists(&tx, "parts", "part_id", link.part_id.0)? {
            warn!(
                "event=compatibility_link module=repo status=rejected part_id={} constraint=part_compatibilities.part_id",
                link.part_id
            );
            return Err(ForeignKeyViolation::MissingPart(link.part_id).into());
        }
        if !row_exists(&tx, "cars", "car_id", link.car_id.0)? {
            warn!(
                "event=compatibility_link module=repo status=rejected car_id={} constraint=part_compatibilities.car_id",
                link.car_id
            );
            return Err(ForeignKeyViolation::MissingCar(link.car_id).into());
        }
        if link_exists(&tx, link)? {
            return Err(ConstraintViolation::DuplicateCompatibility(link).into());
        }

        tx.execute(
            "INSERT INTO part_compatibilities (part_id, car_id) VALUES (?1, ?2);",
            params![link.part_id.0, link.car_id.0],
        )?;
        tx.commit()?;

        debug!(
            "event=compatibility_link module=repo status=ok part_id={} car_id={}",
            link.part_id, link.car_id
        );
        Ok(())
    }

    fn unlink(&self, link: PartCompatibility) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM part_compatibilities WHERE part_id = ?1 AND car_id = ?2;",
            params![link.part_id.0, link.car_id.0],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Compatibility(link)));
        }
        Ok(())
    }

    fn is_linked(&self, link: PartCompatibility) -> RepoResult<bool> {
        link_exists(self.conn, link)
    }

    fn list_links_for_part(&self, part_id: PartId) -> RepoResult<Vec<PartCompatibility>> {
        self.list_links("part_id", part_id.0)
    }

    fn list_links_for_car(&self, car_id: CarId) -> RepoResult<Vec<PartCompatibility>> {
        self.list_links("car_id", car_id.0)
    }

    fn list_cars_for_part(&self, part_id: PartId) -> RepoResult<Vec<Car>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CAR_SELECT_SQL}
             INNER JOIN part_compatibilities pc ON pc.car_id = cars.car_id
             WHERE pc.part_id = ?1
             ORDER BY cars.car_id ASC;"
        ))?;
        let mut rows = stmt.query([part_id.0])?;
        let mut cars = Vec::new();
        while let Some(row) = rows.next()? {
            cars.push(parse_car_row(row)?);
        }
        Ok(cars)
    }

    fn list_parts_for_car(&self, car_id: CarId) -> RepoResult<Vec<Part>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PART_SELECT_SQL}
             INNER JOIN part_compatibilities pc ON pc.part_id = parts.part_id
             WHERE pc.car_id = ?1
             ORDER BY parts.part_id ASC;"
        ))?;
        let mut rows = stmt.query([car_id.0])?;
        let mut parts = Vec::new();
        while let Some(row) = rows.next()? {
            parts.push(parse_part_row(row)?);
        }
        Ok(parts)
    }
}

fn link_exists(conn: &Connection, link: PartCompatibility) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM part_compatibilities
            WHERE part_id = ?1 AND car_id = ?2
        );",
        params![link.part_id.0, link.car_id.0],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
