//! Flat (denormalised) plant row

use super::value::Value;

/// Names of every column of a [`FlatRow`], in output order
pub const FLAT_COLUMNS: [&str; 24] = [
    "plant_id",
    "species_name",
    "species_scientific_name",
    "country_name",
    "city_name",
    "origin_latitude",
    "origin_longitude",
    "image_original_url",
    "image_regular_url",
    "image_medium_url",
    "image_small_url",
    "image_thumbnail_url",
    "license_number",
    "license_name",
    "license_url",
    "botanist_name",
    "botanist_email",
    "botanist_phone",
    "reading_last_watered",
    "reading_time_taken",
    "reading_soil_moisture",
    "reading_temperature",
    "reading_error",
    "reading_alert",
];

/// One plant observation with every nested path pulled up to a named column
///
/// Every field is a [`Value`], so an absent nested path is simply
/// `Value::Null`. `reading_error` holds the raw error text until the error
/// formatter turns it into a boolean; `reading_alert` stays `Null` until the
/// alert engine fills it in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    pub plant_id: Value,
    pub species_name: Value,
    pub species_scientific_name: Value,
    pub country_name: Value,
    pub city_name: Value,
    pub origin_latitude: Value,
    pub origin_longitude: Value,
    pub image_original_url: Value,
    pub image_regular_url: Value,
    pub image_medium_url: Value,
    pub image_small_url: Value,
    pub image_thumbnail_url: Value,
    pub license_number: Value,
    pub license_name: Value,
    pub license_url: Value,
    pub botanist_name: Value,
    pub botanist_email: Value,
    pub botanist_phone: Value,
    pub reading_last_watered: Value,
    pub reading_time_taken: Value,
    pub reading_soil_moisture: Value,
    pub reading_temperature: Value,
    pub reading_error: Value,
    pub reading_alert: Value,
}

impl FlatRow {
    /// Look up a column by name
    ///
    /// Returns `None` only when the column name is not a flat column at all;
    /// an absent value is `Some(&Value::Null)`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let value = match column {
            "plant_id" => &self.plant_id,
            "species_name" => &self.species_name,
            "species_scientific_name" => &self.species_scientific_name,
            "country_name" => &self.country_name,
            "city_name" => &self.city_name,
            "origin_latitude" => &self.origin_latitude,
            "origin_longitude" => &self.origin_longitude,
            "image_original_url" => &self.image_original_url,
            "image_regular_url" => &self.image_regular_url,
            "image_medium_url" => &self.image_medium_url,
            "image_small_url" => &self.image_small_url,
            "image_thumbnail_url" => &self.image_thumbnail_url,
            "license_number" => &self.license_number,
            "license_name" => &self.license_name,
            "license_url" => &self.license_url,
            "botanist_name" => &self.botanist_name,
            "botanist_email" => &self.botanist_email,
            "botanist_phone" => &self.botanist_phone,
            "reading_last_watered" => &self.reading_last_watered,
            "reading_time_taken" => &self.reading_time_taken,
            "reading_soil_moisture" => &self.reading_soil_moisture,
            "reading_temperature" => &self.reading_temperature,
            "reading_error" => &self.reading_error,
            "reading_alert" => &self.reading_alert,
            _ => return None,
        };
        Some(value)
    }

    /// Check whether a name is a flat column
    pub fn has_column(column: &str) -> bool {
        FLAT_COLUMNS.contains(&column)
    }
}
