//! Database schema definitions
//!
//! One relational table per normalized table, with the same column names and
//! order as the CSV output. Identifiers are BIGINT; timestamps are stored
//! without a zone since cleaning normalises them to UTC.

use crate::models::TableName;

/// Database schema helper
pub struct DatabaseSchema;

impl DatabaseSchema {
    /// Get the schema creation SQL
    ///
    /// Note: DuckDB doesn't support CASCADE/SET NULL in foreign keys, so we use simple REFERENCES.
    pub fn create_tables_sql() -> &'static str {
        r#"
CREATE TABLE IF NOT EXISTS country (
    country_id BIGINT PRIMARY KEY,
    country_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS city (
    city_id BIGINT PRIMARY KEY,
    city_name TEXT NOT NULL,
    country_id BIGINT REFERENCES country(country_id)
);

CREATE TABLE IF NOT EXISTS origin (
    origin_id BIGINT PRIMARY KEY,
    origin_longitude DOUBLE NOT NULL,
    origin_latitude DOUBLE NOT NULL,
    city_id BIGINT REFERENCES city(city_id)
);

CREATE TABLE IF NOT EXISTS license (
    license_id BIGINT PRIMARY KEY,
    license_number BIGINT NOT NULL,
    license_name TEXT,
    license_url TEXT
);

CREATE TABLE IF NOT EXISTS image (
    image_id BIGINT PRIMARY KEY,
    image_original_url TEXT NOT NULL,
    image_regular_url TEXT,
    image_medium_url TEXT,
    image_small_url TEXT,
    image_thumbnail_url TEXT,
    license_id BIGINT REFERENCES license(license_id)
);

CREATE TABLE IF NOT EXISTS botanist (
    botanist_id BIGINT PRIMARY KEY,
    botanist_name TEXT,
    botanist_email TEXT NOT NULL,
    botanist_phone TEXT
);

CREATE TABLE IF NOT EXISTS species (
    species_id BIGINT PRIMARY KEY,
    species_name TEXT,
    species_scientific_name TEXT NOT NULL,
    image_id BIGINT REFERENCES image(image_id)
);

CREATE TABLE IF NOT EXISTS plant (
    plant_id BIGINT PRIMARY KEY,
    species_id BIGINT REFERENCES species(species_id),
    origin_id BIGINT REFERENCES origin(origin_id)
);

CREATE TABLE IF NOT EXISTS reading (
    reading_id BIGINT PRIMARY KEY,
    reading_last_watered TIMESTAMP,
    reading_time_taken TIMESTAMP,
    reading_soil_moisture DOUBLE,
    reading_temperature DOUBLE,
    reading_error BOOLEAN,
    reading_alert BOOLEAN,
    botanist_id BIGINT REFERENCES botanist(botanist_id),
    plant_id BIGINT REFERENCES plant(plant_id)
);
"#
    }
}
