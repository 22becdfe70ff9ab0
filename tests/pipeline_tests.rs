//! Integration tests for the full transform: raw records to normalized tables

use botanical_etl::models::{FlatRow, TableName, Value};
use botanical_etl::transform::{
    TransformConfig, add_alerts, clean_rows, flatten_records, format_errors, get_nested,
    normalize,
};
use serde_json::{Value as JsonValue, json};

fn fake_records() -> Vec<JsonValue> {
    vec![
        json!({
            "plant_id": 8,
            "name": "Bird of paradise",
            "scientific_name": ["Heliconia schiedeana 'Fire and Ice'"],
            "origin_location": {"country": "United States", "city": "Stamford",
                                "latitude": 41.05, "longitude": -73.53},
            "botanist": {"name": "Carl Linnaeus", "email": "carl.linnaeus@lnhm.co.uk",
                         "phone": "(146)994-1635x35992"},
            "images": {"license": 45, "license_name": "Attribution-ShareAlike 3.0",
                       "license_url": "https://creativecommons.org/licenses/by-sa/3.0/deed.en",
                       "original_url": "https://example.com/heliconia.jpg",
                       "regular_url": "https://example.com/heliconia-r.jpg",
                       "medium_url": "https://example.com/heliconia-m.jpg",
                       "small_url": "https://example.com/heliconia-s.jpg",
                       "thumbnail": "https://example.com/heliconia-t.jpg"},
            "last_watered": "Wed, 12 Nov 2025 13:54:15 GMT",
            "recording_taken": "2025-11-13 10:13:31",
            "soil_moisture": 31.4,
            "temperature": 11.2
        }),
        json!({
            "plant_id": 9,
            "name": "rubber plant",
            "scientific_name": ["Ficus elastica"],
            "origin_location": {"country": "United States", "city": "stamford",
                                "latitude": 41.05, "longitude": -73.53},
            "botanist": {"name": "Carl Linnaeus", "email": "carl.linnaeus@lnhm..co.uk",
                         "phone": "(146)994-1635x35992"},
            "images": {"license": 45, "license_name": "Attribution-ShareAlike 3.0",
                       "license_url": "https://creativecommons.org/licenses/by-sa/3.0/deed.en",
                       "original_url": "https://example.com/ficus.jpg",
                       "regular_url": "https://example.com/ficus-r.jpg",
                       "medium_url": "https://example.com/ficus-m.jpg",
                       "small_url": "https://example.com/ficus-s.jpg",
                       "thumbnail": "https://example.com/ficus-t.jpg"},
            "last_watered": "2025-11-12T13:33:20",
            "recording_taken": "2025-11-13 10:13:33",
            "soil_moisture": 29.9,
            "temperature": 12.1
        }),
        json!({
            "plant_id": 10,
            "name": "Dragon tree",
            "scientific_name": ["Dracaena marginata"],
            "origin_location": {"country": "Brazil", "city": "Resende",
                                "latitude": -22.47, "longitude": -44.45},
            "botanist": {"name": "Gertrude Jekyll", "email": "gertrude.jekyll@lnhm.co.uk",
                         "phone": "001-481-273-3691x1087"},
            "recording_taken": "2025-11-13 10:13:35",
            "soil_moisture": 95.0,
            "temperature": 41.0,
            "error": "plant on fire"
        }),
        json!({
            "plant_id": 11,
            "name": "Aloe vera",
            "scientific_name": ["Aloe barbadensis"],
            "origin_location": {"country": "Moldova", "city": "Chisinau",
                                "latitude": 47.0, "longitude": 28.86},
            "botanist": {"name": "Eliza Andrews", "email": "eliza.andrews@lnhm.co.uk",
                         "phone": "+44 123-456-7890"},
            "recording_taken": "2025-11-13 10:13:37",
            "soil_moisture": 2.0,
            "temperature": 12.5
        }),
        json!({"error": "plant not found"}),
    ]
}

#[test]
fn test_nested_accessor_never_panics() {
    let record = json!({"origin_location": {"city": "Lyon"}, "scientific_name": ["x"]});
    assert_eq!(
        get_nested(&record, &["origin_location", "city"]),
        Some(&json!("Lyon"))
    );
    assert!(get_nested(&record, &["origin_location", "city", "name"]).is_none());
    assert!(get_nested(&record, &["scientific_name", "0"]).is_none());
    assert!(get_nested(&json!(null), &["plant_id"]).is_none());
}

#[test]
fn test_flatten_is_one_to_one() {
    let records = fake_records();
    assert_eq!(flatten_records(&records).len(), records.len());
    assert!(flatten_records(&[]).is_empty());
}

#[test]
fn test_phases_in_order() {
    let mut rows = flatten_records(&fake_records());
    clean_rows(&mut rows);
    format_errors(&mut rows);
    add_alerts(&mut rows, &TransformConfig::default().alerts);

    let dragon = &rows[2];
    assert_eq!(dragon.reading_error, Value::Bool(true));
    assert_eq!(dragon.reading_alert, Value::Bool(false));
    assert_eq!(dragon.botanist_phone, Value::from("0014812733691 x1087"));

    let aloe = &rows[3];
    assert_eq!(aloe.reading_error, Value::Bool(false));
    assert_eq!(aloe.reading_alert, Value::Bool(true));

    assert_eq!(rows[1].city_name, Value::from("Stamford"));
    assert_eq!(rows[1].botanist_email, Value::from("carl.linnaeus@lnhm.co.uk"));
    assert!(matches!(rows[0].reading_last_watered, Value::Timestamp(_)));
}

#[test]
fn test_normalize_deduplicates_dimensions() {
    let tables = normalize(&fake_records(), &TransformConfig::default()).unwrap();

    let country = tables.get(TableName::Country).unwrap();
    assert_eq!(country.columns, vec!["country_id", "country_name"]);
    assert_eq!(
        country.rows,
        vec![
            vec![Value::Int(1), Value::from("United States")],
            vec![Value::Int(2), Value::from("Brazil")],
            vec![Value::Int(3), Value::from("Moldova")],
        ]
    );

    // "Stamford" and "stamford" collapse after title casing
    assert_eq!(tables.get(TableName::City).unwrap().len(), 3);
    assert_eq!(tables.get(TableName::Origin).unwrap().len(), 3);
    assert_eq!(tables.get(TableName::License).unwrap().len(), 1);
    assert_eq!(tables.get(TableName::Image).unwrap().len(), 2);
    assert_eq!(tables.get(TableName::Botanist).unwrap().len(), 3);
}

#[test]
fn test_species_without_image_is_dropped_and_plant_keeps_null() {
    let tables = normalize(&fake_records(), &TransformConfig::default()).unwrap();

    let species = tables.get(TableName::Species).unwrap();
    assert_eq!(species.len(), 2);

    let plant = tables.get(TableName::Plant).unwrap();
    assert_eq!(plant.columns, vec!["plant_id", "species_id", "origin_id"]);
    assert_eq!(plant.len(), 4);
    assert_eq!(plant.value(0, "species_id"), Some(&Value::Int(1)));
    assert_eq!(plant.value(2, "plant_id"), Some(&Value::Int(10)));
    assert!(plant.value(2, "species_id").unwrap().is_null());
    assert_eq!(plant.value(2, "origin_id"), Some(&Value::Int(2)));
}

#[test]
fn test_readings_are_append_only_and_resolved() {
    let tables = normalize(&fake_records(), &TransformConfig::default()).unwrap();
    let reading = tables.get(TableName::Reading).unwrap();

    // The record without a plant id is dropped; every other record is a reading
    assert_eq!(reading.len(), 4);
    let ids: Vec<_> = reading.column_values("reading_id").unwrap();
    assert_eq!(
        ids,
        vec![&Value::Int(1), &Value::Int(2), &Value::Int(3), &Value::Int(4)]
    );
    let plants: Vec<_> = reading.column_values("plant_id").unwrap();
    assert_eq!(
        plants,
        vec![&Value::Int(8), &Value::Int(9), &Value::Int(10), &Value::Int(11)]
    );
    assert_eq!(reading.value(0, "botanist_id"), reading.value(1, "botanist_id"));
    assert_eq!(reading.value(2, "reading_error"), Some(&Value::Bool(true)));
}

#[test]
fn test_city_without_country_is_filtered_by_null_policy() {
    let rows = vec![
        FlatRow {
            city_name: Value::from("Lyon"),
            country_name: Value::from("France"),
            ..Default::default()
        },
        FlatRow {
            city_name: Value::from("Atlantis"),
            ..Default::default()
        },
    ];
    let tables = botanical_etl::transform::normalize_rows(
        &rows,
        &botanical_etl::models::CATALOGUE,
    )
    .unwrap();

    // Atlantis has no country so the city policy drops it; Lyon resolves
    let city = tables.get(TableName::City).unwrap();
    assert_eq!(city.len(), 1);
    assert_eq!(city.value(0, "country_id"), Some(&Value::Int(1)));
}

#[test]
fn test_alert_multiplier_changes_alerts() {
    let strict = normalize(&fake_records(), &TransformConfig::default()).unwrap();
    let mut config = TransformConfig::default();
    config.alerts.stdev_multiplier = 5.0;
    let relaxed = normalize(&fake_records(), &config).unwrap();

    let alerts = |tables: &botanical_etl::NormalizedTables| {
        tables
            .get(TableName::Reading)
            .unwrap()
            .column_values("reading_alert")
            .unwrap()
            .into_iter()
            .filter(|v| **v == Value::Bool(true))
            .count()
    };
    assert!(alerts(&strict) > 0);
    assert_eq!(alerts(&relaxed), 0);
}
