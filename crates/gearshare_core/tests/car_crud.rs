use gearshare_core::db::open_db_in_memory;
use gearshare_core::{
    CarId, CarRepository, ConstraintViolation, EntityKey, ListQuery, NewCar, RepoError,
    SqliteCarRepository, ValidationError,
};

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCarRepository::try_new(&conn).unwrap();

    let input = NewCar::new("Toyota", "Corolla", 2013, 2018);
    let id = repo.create_car(&input).unwrap();

    let loaded = repo.get_car(id).unwrap().unwrap();
    assert_eq!(loaded, input.with_id(id));
}

#[test]
fn single_year_range_is_valid_and_reversed_range_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCarRepository::try_new(&conn).unwrap();

    repo.create_car(&NewCar::new("Subaru", "Impreza", 2001, 2001))
        .unwrap();

    let err = repo
        .create_car(&NewCar::new("Subaru", "Legacy", 2005, 1999))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidYearRange {
            year_start: 2005,
            year_end: 1999,
        })
    ));
    assert_eq!(repo.list_cars(&ListQuery::default()).unwrap().len(), 1);
}

#[test]
fn update_existing_car_and_missing_car_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCarRepository::try_new(&conn).unwrap();

    let id = repo
        .create_car(&NewCar::new("BMW", "3 Series", 2012, 2015))
        .unwrap();
    let mut stored = repo.get_car(id).unwrap().unwrap();
    stored.year_end = 2019;
    repo.update_car(&stored).unwrap();
    assert_eq!(repo.get_car(id).unwrap().unwrap().year_end, 2019);

    stored.year_start = 2020;
    let err = repo.update_car(&stored).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let ghost = NewCar::new("BMW", "M3", 2014, 2018).with_id(CarId(55));
    let err = repo.update_car(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(EntityKey::Car(CarId(55)))));
    let err = repo.delete_car(CarId(55)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn create_with_id_rejects_taken_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCarRepository::try_new(&conn).unwrap();

    let car = NewCar::new("Audi", "A4", 2008, 2016).with_id(CarId(10));
    assert_eq!(repo.create_car_with_id(&car).unwrap(), CarId(10));

    let err = repo.create_car_with_id(&car).unwrap_err();
    match err {
        RepoError::ConstraintViolation(violation) => {
            assert_eq!(violation.constraint(), "pk_cars");
            assert_eq!(
                violation,
                ConstraintViolation::DuplicateId {
                    table: "cars",
                    id: 10
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_orders_by_id_with_paging() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCarRepository::try_new(&conn).unwrap();

    let ids: Vec<CarId> = [("Kia", "Rio"), ("Kia", "Ceed"), ("Kia", "Sportage")]
        .into_iter()
        .map(|(make, model)| repo.create_car(&NewCar::new(make, model, 2010, 2020)).unwrap())
        .collect();

    let page = repo
        .list_cars(&ListQuery {
            limit: Some(2),
            offset: 0,
        })
        .unwrap();
    let page_ids: Vec<_> = page.iter().map(|car| car.car_id).collect();
    assert_eq!(page_ids, ids[..2].to_vec());
}
