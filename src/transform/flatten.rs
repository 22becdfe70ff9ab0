//! Flattening of nested plant records into denormalised rows

use serde_json::Value as JsonValue;
use tracing::debug;

use super::accessor::get_nested;
use crate::models::{FlatRow, Value};

/// Scalar at `keys`, or `Null` when any level is missing
fn scalar(record: &JsonValue, keys: &[&str]) -> Value {
    get_nested(record, keys)
        .map(Value::from_json)
        .unwrap_or(Value::Null)
}

/// Scientific names arrive as a one-element list; take its first entry
fn scientific_name(record: &JsonValue) -> Value {
    match get_nested(record, &["scientific_name"]) {
        Some(JsonValue::Array(names)) => names.first().map(Value::from_json).unwrap_or_default(),
        Some(other) => Value::from_json(other),
        None => Value::Null,
    }
}

/// Error messages may be text or any other scalar; both count as present
fn error_field(record: &JsonValue) -> Value {
    match get_nested(record, &["error"]) {
        None | Some(JsonValue::Null) => Value::Null,
        Some(JsonValue::String(message)) => Value::Text(message.clone()),
        Some(other) => Value::Text(other.to_string()),
    }
}

/// Flatten one record
///
/// A record that is not an object (or is missing every field) still yields a
/// row, just one made entirely of `Null`s.
pub fn flatten_record(record: &JsonValue) -> FlatRow {
    if !record.is_object() {
        debug!("Record is not an object, emitting an empty row");
    }

    let license_number = match get_nested(record, &["images", "license"]) {
        Some(value) if !value.is_null() => Value::from_json(value),
        _ => scalar(record, &["images", "license_number"]),
    };

    FlatRow {
        plant_id: scalar(record, &["plant_id"]),
        species_name: scalar(record, &["name"]),
        species_scientific_name: scientific_name(record),
        country_name: scalar(record, &["origin_location", "country"]),
        city_name: scalar(record, &["origin_location", "city"]),
        origin_latitude: scalar(record, &["origin_location", "latitude"]),
        origin_longitude: scalar(record, &["origin_location", "longitude"]),
        image_original_url: scalar(record, &["images", "original_url"]),
        image_regular_url: scalar(record, &["images", "regular_url"]),
        image_medium_url: scalar(record, &["images", "medium_url"]),
        image_small_url: scalar(record, &["images", "small_url"]),
        image_thumbnail_url: scalar(record, &["images", "thumbnail"]),
        license_number,
        license_name: scalar(record, &["images", "license_name"]),
        license_url: scalar(record, &["images", "license_url"]),
        botanist_name: scalar(record, &["botanist", "name"]),
        botanist_email: scalar(record, &["botanist", "email"]),
        botanist_phone: scalar(record, &["botanist", "phone"]),
        reading_last_watered: scalar(record, &["last_watered"]),
        reading_time_taken: scalar(record, &["recording_taken"]),
        reading_soil_moisture: scalar(record, &["soil_moisture"]),
        reading_temperature: scalar(record, &["temperature"]),
        reading_error: error_field(record),
        reading_alert: Value::Null,
    }
}

/// Flatten every record; row `i` always derives from record `i`
pub fn flatten_records(records: &[JsonValue]) -> Vec<FlatRow> {
    records.iter().map(flatten_record).collect()
}
