//! Car repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a car removes every compatibility link that references it in
//!   the same transaction.

use crate::model::car::{Car, CarId, NewCar};
use crate::repo::{
    begin_immediate, ensure_connection_ready, push_paging, row_exists, ConstraintViolation,
    EntityKey, ListQuery, RepoError, RepoResult,
};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

pub(crate) const CAR_SELECT_SQL: &str = "SELECT
    cars.car_id AS car_id,
    cars.make AS make,
    cars.model AS model,
    cars.year_start AS year_start,
    cars.year_end AS year_end
FROM cars";

/// Repository interface for car operations.
pub trait CarRepository {
    fn create_car(&self, car: &NewCar) -> RepoResult<CarId>;
    /// Inserts a car under its caller-provided id.
    fn create_car_with_id(&self, car: &Car) -> RepoResult<CarId>;
    fn get_car(&self, id: CarId) -> RepoResult<Option<Car>>;
    fn list_cars(&self, query: &ListQuery) -> RepoResult<Vec<Car>>;
    fn update_car(&self, car: &Car) -> RepoResult<()>;
    /// Deletes a car together with its compatibility links.
    fn delete_car(&self, id: CarId) -> RepoResult<()>;
}

/// SQLite-backed car repository.
pub struct SqliteCarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCarRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn insert(&self, id: Option<CarId>, car: &NewCar) -> RepoResult<CarId> {
        let tx = begin_immediate(self.conn)?;
        if let Some(id) = id {
            if row_exists(&tx, "cars", "car_id", id.0)? {
                return Err(ConstraintViolation::DuplicateId {
                    table: "cars",
                    id: id.0,
                }
                .into());
            }
        }

        tx.execute(
            "INSERT INTO cars (car_id, make, model, year_start, year_end)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.map(|value| value.0),
                car.make,
                car.model,
                car.year_start,
                car.year_end,
            ],
        )?;
        let assigned = CarId(tx.last_insert_rowid());
        tx.commit()?;

        debug!("event=car_create module=repo status=ok car_id={assigned}");
        Ok(assigned)
    }
}

impl CarRepository for SqliteCarRepository<'_> {
    fn create_car(&self, car: &NewCar) -> RepoResult<CarId> {
        car.validate()?;
        self.insert(None, car)
    }

    fn create_car_with_id(&self, car: &Car) -> RepoResult<CarId> {
        car.validate()?;
        let payload = NewCar::new(car.make.clone(), car.model.clone(), car.year_start, car.year_end);
        self.insert(Some(car.car_id), &payload)
    }

    fn get_car(&self, id: CarId) -> RepoResult<Option<Car>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAR_SELECT_SQL} WHERE cars.car_id = ?1;"))?;
        let mut rows = stmt.query([id.0])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_car_row(row)?));
        }
        Ok(None)
    }

    fn list_cars(&self, query: &ListQuery) -> RepoResult<Vec<Car>> {
        let mut sql = format!("{CAR_SELECT_SQL} ORDER BY cars.car_id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        push_paging(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut cars = Vec::new();
        while let Some(row) = rows.next()? {
            cars.push(parse_car_row(row)?);
        }
        Ok(cars)
    }

    fn update_car(&self, car: &Car) -> RepoResult<()> {
        car.validate()?;

        let changed = self.conn.execute(
            "UPDATE cars
             SET
                make = ?2,
                model = ?3,
                year_start = ?4,
                year_end = ?5
             WHERE car_id = ?1;",
            params![car.car_id.0, car.make, car.model, car.year_start, car.year_end],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Car(car.car_id)));
        }
        Ok(())
    }

    fn delete_car(&self, id: CarId) -> RepoResult<()> {
        let tx = begin_immediate(self.conn)?;
        let unlinked = tx.execute("DELETE FROM part_compatibilities WHERE car_id = ?1;", [id.0])?;
        let changed = tx.execute("DELETE FROM cars WHERE car_id = ?1;", [id.0])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Car(id)));
        }
        tx.commit()?;

        debug!("event=car_delete module=repo status=ok car_id={id} unlinked={unlinked}");
        Ok(())
    }
}

pub(crate) fn parse_car_row(row: &Row<'_>) -> RepoResult<Car> {
    let car = Car {
        car_id: CarId(row.get("car_id")?),
        make: row.get("make")?,
        model: row.get("model")?,
        year_start: row.get("year_start")?,
        year_end: row.get("year_end")?,
    };
    car.validate()
        .map_err(|err| RepoError::InvalidData(format!("cars row {}: {err}", car.car_id)))?;
    Ok(car)
}
