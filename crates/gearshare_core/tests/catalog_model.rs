use gearshare_core::{
    Car, CarId, ManufacturerId, NewCar, NewManufacturer, NewPart, Part, PartCompatibility, PartId,
    Price, ValidationError,
};

fn brake_pad(price: Price) -> NewPart {
    NewPart::new(
        "BRK-001",
        "Front brake pad set",
        "Ceramic pads for front axle",
        price,
        ManufacturerId(1),
    )
}

#[test]
fn new_part_defaults_stock_to_zero() {
    let part = brake_pad(Price::from_cents(4599));
    assert_eq!(part.stock_quantity, 0);
    assert!(part.validate().is_ok());
}

#[test]
fn part_price_must_not_be_negative() {
    let negative = brake_pad("-1".parse().unwrap());
    assert_eq!(
        negative.validate(),
        Err(ValidationError::Negative {
            field: "part.price",
            value: "-1.00".to_string(),
        })
    );

    assert!(brake_pad(Price::ZERO).validate().is_ok());
}

#[test]
fn part_price_must_fit_decimal_10_2() {
    let part = brake_pad("100000000".parse().unwrap());
    let err = part.validate().unwrap_err();
    assert!(matches!(err, ValidationError::PrecisionOverflow { .. }));
    assert_eq!(err.field(), "part.price");
}

#[test]
fn part_stock_must_not_be_negative() {
    let mut part = brake_pad(Price::from_cents(100));
    part.stock_quantity = -3;
    let err = part.validate().unwrap_err();
    assert_eq!(err.field(), "part.stock_quantity");
}

#[test]
fn part_text_fields_enforce_required_and_max_length() {
    let mut part = brake_pad(Price::from_cents(100));
    part.sku = String::new();
    assert_eq!(
        part.validate(),
        Err(ValidationError::Required { field: "part.sku" })
    );

    let mut part = brake_pad(Price::from_cents(100));
    part.description = "x".repeat(256);
    assert_eq!(
        part.validate(),
        Err(ValidationError::TooLong {
            field: "part.description",
            max: 255,
            actual: 256,
        })
    );

    part.description = "x".repeat(255);
    assert!(part.validate().is_ok());
}

#[test]
fn manufacturer_fields_enforce_limits() {
    assert!(NewManufacturer::new("Bosch", "Germany").validate().is_ok());

    let err = NewManufacturer::new("n".repeat(101), "Germany")
        .validate()
        .unwrap_err();
    assert_eq!(err.field(), "manufacturer.name");

    let err = NewManufacturer::new("Bosch", " ").validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::Required {
            field: "manufacturer.country"
        }
    );
}

#[test]
fn car_rejects_reversed_year_range() {
    let err = NewCar::new("Honda", "Civic", 2010, 2005)
        .validate()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidYearRange {
            year_start: 2010,
            year_end: 2005,
        }
    );

    assert!(NewCar::new("Honda", "Civic", 2010, 2010).validate().is_ok());
}

#[test]
fn car_covers_inclusive_year_range() {
    let car = NewCar::new("Mazda", "MX-5", 1989, 1997).with_id(CarId(7));
    assert!(car.covers_year(1989));
    assert!(car.covers_year(1997));
    assert!(!car.covers_year(1998));
}

#[test]
fn part_serialization_uses_expected_wire_fields() {
    let part: Part = brake_pad(Price::from_cents(4599)).with_id(PartId(42));

    let json = serde_json::to_value(&part).unwrap();
    assert_eq!(json["part_id"], 42);
    assert_eq!(json["sku"], "BRK-001");
    assert_eq!(json["price"], "45.99");
    assert_eq!(json["stock_quantity"], 0);
    assert_eq!(json["manufacturer_id"], 1);

    let decoded: Part = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, part);
}

#[test]
fn new_part_deserializes_without_stock_quantity() {
    let value = serde_json::json!({
        "sku": "OIL-5W30",
        "name": "Engine oil",
        "description": "5W-30 synthetic, 5L",
        "price": "32.50",
        "manufacturer_id": 3
    });

    let part: NewPart = serde_json::from_value(value).unwrap();
    assert_eq!(part.stock_quantity, 0);
    assert_eq!(part.price, Price::from_cents(3250));
}

#[test]
fn compatibility_serializes_as_id_pair() {
    let link = PartCompatibility::new(PartId(5), CarId(9));
    let json = serde_json::to_value(link).unwrap();
    assert_eq!(json, serde_json::json!({ "part_id": 5, "car_id": 9 }));

    let car: Car = NewCar::new("VW", "Golf", 2004, 2008).with_id(CarId(9));
    assert_eq!(serde_json::to_value(&car).unwrap()["car_id"], 9);
}
