use gearshare_core::db::migrations::latest_version;
use gearshare_core::db::open_db_in_memory;
use gearshare_core::{
    ConstraintViolation, EntityKey, ForeignKeyViolation, ListQuery, ManufacturerId,
    ManufacturerRepository, NewManufacturer, NewPart, PartRepository, Price, RepoError,
    SqliteManufacturerRepository, SqlitePartRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let input = NewManufacturer::new("Brembo", "Italy");
    let id = repo.create_manufacturer(&input).unwrap();

    let loaded = repo.get_manufacturer(id).unwrap().unwrap();
    assert_eq!(loaded, input.with_id(id));
}

#[test]
fn duplicate_name_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    repo.create_manufacturer(&NewManufacturer::new("Denso", "Japan"))
        .unwrap();
    let err = repo
        .create_manufacturer(&NewManufacturer::new("Denso", "USA"))
        .unwrap_err();

    match err {
        RepoError::ConstraintViolation(violation) => {
            assert_eq!(violation.constraint(), "ux_manufacturers_name");
            assert_eq!(
                violation,
                ConstraintViolation::DuplicateManufacturerName {
                    name: "Denso".to_string()
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }

    let all = repo.list_manufacturers(&ListQuery::default()).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let err = repo
        .create_manufacturer(&NewManufacturer::new("", "Germany"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let id = repo
        .create_manufacturer(&NewManufacturer::new("Mahle", "Germany"))
        .unwrap();
    let mut stored = repo.get_manufacturer(id).unwrap().unwrap();
    stored.country = "c".repeat(51);
    let err = repo.update_manufacturer(&stored).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn update_keeps_own_name_and_rejects_taken_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let bosch = repo
        .create_manufacturer(&NewManufacturer::new("Bosch", "Germany"))
        .unwrap();
    repo.create_manufacturer(&NewManufacturer::new("Valeo", "France"))
        .unwrap();

    let mut stored = repo.get_manufacturer(bosch).unwrap().unwrap();
    stored.country = "Deutschland".to_string();
    repo.update_manufacturer(&stored).unwrap();
    assert_eq!(
        repo.get_manufacturer(bosch).unwrap().unwrap().country,
        "Deutschland"
    );

    stored.name = "Valeo".to_string();
    let err = repo.update_manufacturer(&stored).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(ConstraintViolation::DuplicateManufacturerName { .. })
    ));
}

#[test]
fn update_and_delete_missing_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let ghost = NewManufacturer::new("Ghost", "Nowhere").with_id(ManufacturerId(404));
    let err = repo.update_manufacturer(&ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound(EntityKey::Manufacturer(ManufacturerId(404)))
    ));

    let err = repo.delete_manufacturer(ManufacturerId(404)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn delete_is_restricted_while_parts_exist() {
    let conn = open_db_in_memory().unwrap();
    let manufacturers = SqliteManufacturerRepository::try_new(&conn).unwrap();
    let parts = SqlitePartRepository::try_new(&conn).unwrap();

    let m1 = manufacturers
        .create_manufacturer(&NewManufacturer::new("NGK", "Japan"))
        .unwrap();
    let p1 = parts
        .create_part(&NewPart::new(
            "NGK-BKR6E",
            "Spark plug",
            "Standard nickel spark plug",
            Price::from_cents(399),
            m1,
        ))
        .unwrap();

    let err = manufacturers.delete_manufacturer(m1).unwrap_err();
    match err {
        RepoError::ForeignKeyViolation(violation) => {
            assert_eq!(
                violation,
                ForeignKeyViolation::ManufacturerHasParts {
                    manufacturer_id: m1,
                    part_count: 1,
                }
            );
            assert_eq!(violation.constraint(), "parts.manufacturer_id");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(manufacturers.get_manufacturer(m1).unwrap().is_some());
    assert!(parts.get_part(p1).unwrap().is_some());

    parts.delete_part(p1).unwrap();
    manufacturers.delete_manufacturer(m1).unwrap();
    assert!(manufacturers.get_manufacturer(m1).unwrap().is_none());
}

#[test]
fn find_by_name_count_parts_and_paging() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let first = repo
        .create_manufacturer(&NewManufacturer::new("Aisin", "Japan"))
        .unwrap();
    let second = repo
        .create_manufacturer(&NewManufacturer::new("Bilstein", "Germany"))
        .unwrap();
    let third = repo
        .create_manufacturer(&NewManufacturer::new("Continental", "Germany"))
        .unwrap();

    let found = repo.find_manufacturer_by_name("Bilstein").unwrap().unwrap();
    assert_eq!(found.manufacturer_id, second);
    assert!(repo.find_manufacturer_by_name("bilstein").unwrap().is_none());
    assert_eq!(repo.count_parts_for_manufacturer(first).unwrap(), 0);

    let page = repo
        .list_manufacturers(&ListQuery {
            limit: Some(2),
            offset: 1,
        })
        .unwrap();
    let ids: Vec<_> = page.iter().map(|item| item.manufacturer_id).collect();
    assert_eq!(ids, vec![second, third]);

    let tail = repo
        .list_manufacturers(&ListQuery {
            limit: None,
            offset: 2,
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].manufacturer_id, third);
}

#[test]
fn nul_in_name_is_rejected_before_the_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let err = repo
        .create_manufacturer(&NewManufacturer::new("\0Bosch", "Germany"))
        .unwrap_err();
    match err {
        RepoError::Validation(err) => assert_eq!(err.field(), "manufacturer.name"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(repo
        .list_manufacturers(&ListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn engine_check_failure_maps_to_constraint_violation() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO manufacturers (name, country) VALUES ('   ', 'Germany');",
        [],
    );
    let err: RepoError = result.unwrap_err().into();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(ConstraintViolation::Engine { .. })
    ));

    let result = conn.execute(
        "INSERT INTO manufacturers (name, country) VALUES ('Bosch', NULL);",
        [],
    );
    let err: RepoError = result.unwrap_err().into();
    assert!(matches!(
        err,
        RepoError::ConstraintViolation(ConstraintViolation::Engine { .. })
    ));
}

#[test]
fn create_with_id_preserves_identity_and_rejects_taken_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManufacturerRepository::try_new(&conn).unwrap();

    let imported = NewManufacturer::new("Febi", "Germany").with_id(ManufacturerId(70));
    assert_eq!(
        repo.create_manufacturer_with_id(&imported).unwrap(),
        ManufacturerId(70)
    );

    let clash = NewManufacturer::new("Lemforder", "Germany").with_id(ManufacturerId(70));
    let err = repo.create_manufacturer_with_id(&clash).unwrap_err();
    assert!(matches!(
        &err,
        RepoError::ConstraintViolation(ConstraintViolation::DuplicateId {
            table: "manufacturers",
            id: 70,
        })
    ));
    if let RepoError::ConstraintViolation(violation) = err {
        assert_eq!(violation.constraint(), "pk_manufacturers");
    }

    let next = repo
        .create_manufacturer(&NewManufacturer::new("Lemforder", "Germany"))
        .unwrap();
    assert!(next.0 > 70);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteManufacturerRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteManufacturerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("manufacturers"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE manufacturers (
            manufacturer_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteManufacturerRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "manufacturers",
            column: "country"
        })
    ));
}
