//! Table specifications and materialised tables

use super::column::ForeignKey;
use super::enums::{ColumnKind, IdStrategy, NullPolicy, RowMode, TableName};
use super::value::Value;
use serde::Serialize;

/// Extraction rule for one logical table
///
/// One generic extractor and resolver consume these specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    /// Table name (also the output file stem)
    pub name: TableName,
    /// Identifier column, always the first output column
    pub id_column: &'static str,
    /// How identifiers are assigned
    pub id_strategy: IdStrategy,
    /// Flat columns copied verbatim into the table, after the id
    pub columns: &'static [&'static str],
    /// Flat columns forming the natural unique key
    pub natural_key: &'static [&'static str],
    /// Deduplicated or append-only
    pub row_mode: RowMode,
    /// Which rows are dropped for missing values
    pub null_policy: NullPolicy,
    /// References to parent tables, emitted as trailing id columns
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSpec {
    /// Output columns in order: id, data columns, foreign key ids
    pub fn output_columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(1 + self.columns.len() + self.foreign_keys.len());
        columns.push(self.id_column);
        columns.extend(self.columns.iter().copied());
        columns.extend(self.foreign_keys.iter().map(|fk| fk.id_column));
        columns
    }

    /// Every flat column the table reads, without duplicates
    pub fn projected_columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = Vec::new();
        let all = self
            .columns
            .iter()
            .chain(self.natural_key.iter())
            .chain(self.foreign_keys.iter().flat_map(|fk| fk.lookup_columns.iter()));
        for column in all {
            if !columns.contains(column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Storage type of one of this table's output columns
    ///
    /// Identifier and foreign key columns are integers; data columns are
    /// text unless listed in [`TYPED_COLUMNS`].
    pub fn column_kind(&self, column: &str) -> ColumnKind {
        if column == self.id_column || self.foreign_keys.iter().any(|fk| fk.id_column == column) {
            return ColumnKind::Integer;
        }
        TYPED_COLUMNS
            .iter()
            .find(|(name, _)| *name == column)
            .map_or(ColumnKind::Text, |(_, kind)| *kind)
    }

    /// Parent tables this table depends on
    pub fn parents(&self) -> impl Iterator<Item = TableName> + '_ {
        self.foreign_keys.iter().map(|fk| fk.parent)
    }
}

/// Data columns that are not stored as text
pub const TYPED_COLUMNS: [(&str, ColumnKind); 9] = [
    ("origin_longitude", ColumnKind::Float),
    ("origin_latitude", ColumnKind::Float),
    ("license_number", ColumnKind::Integer),
    ("reading_last_watered", ColumnKind::Timestamp),
    ("reading_time_taken", ColumnKind::Timestamp),
    ("reading_soil_moisture", ColumnKind::Float),
    ("reading_temperature", ColumnKind::Float),
    ("reading_error", ColumnKind::Boolean),
    ("reading_alert", ColumnKind::Boolean),
];

/// The nine table specifications, in dependency order
pub static CATALOGUE: [TableSpec; 9] = [
    TableSpec {
        name: TableName::Country,
        id_column: "country_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["country_name"],
        natural_key: &["country_name"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[],
    },
    TableSpec {
        name: TableName::City,
        id_column: "city_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["city_name"],
        natural_key: &["city_name"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[ForeignKey {
            parent: TableName::Country,
            lookup_columns: &["country_name"],
            id_column: "country_id",
        }],
    },
    TableSpec {
        name: TableName::Origin,
        id_column: "origin_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["origin_longitude", "origin_latitude"],
        natural_key: &["origin_latitude", "origin_longitude"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[ForeignKey {
            parent: TableName::City,
            lookup_columns: &["city_name"],
            id_column: "city_id",
        }],
    },
    TableSpec {
        name: TableName::License,
        id_column: "license_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["license_number", "license_name", "license_url"],
        natural_key: &["license_number"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[],
    },
    TableSpec {
        name: TableName::Image,
        id_column: "image_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &[
            "image_original_url",
            "image_regular_url",
            "image_medium_url",
            "image_small_url",
            "image_thumbnail_url",
        ],
        natural_key: &["image_original_url"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[ForeignKey {
            parent: TableName::License,
            lookup_columns: &["license_number"],
            id_column: "license_id",
        }],
    },
    TableSpec {
        name: TableName::Botanist,
        id_column: "botanist_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["botanist_name", "botanist_email", "botanist_phone"],
        natural_key: &["botanist_email"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[],
    },
    TableSpec {
        name: TableName::Species,
        id_column: "species_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &["species_name", "species_scientific_name"],
        natural_key: &["species_scientific_name"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[ForeignKey {
            parent: TableName::Image,
            lookup_columns: &["image_original_url"],
            id_column: "image_id",
        }],
    },
    TableSpec {
        name: TableName::Plant,
        id_column: "plant_id",
        id_strategy: IdStrategy::Natural,
        columns: &[],
        natural_key: &["plant_id"],
        row_mode: RowMode::Deduplicated,
        null_policy: NullPolicy::DropIfAnyNull,
        foreign_keys: &[
            ForeignKey {
                parent: TableName::Species,
                lookup_columns: &["species_scientific_name"],
                id_column: "species_id",
            },
            ForeignKey {
                parent: TableName::Origin,
                lookup_columns: &["origin_latitude", "origin_longitude"],
                id_column: "origin_id",
            },
        ],
    },
    TableSpec {
        name: TableName::Reading,
        id_column: "reading_id",
        id_strategy: IdStrategy::Surrogate,
        columns: &[
            "reading_last_watered",
            "reading_time_taken",
            "reading_soil_moisture",
            "reading_temperature",
            "reading_error",
            "reading_alert",
        ],
        natural_key: &[],
        row_mode: RowMode::AppendOnly,
        null_policy: NullPolicy::DropIfNullIn(&["plant_id"]),
        foreign_keys: &[
            ForeignKey {
                parent: TableName::Botanist,
                lookup_columns: &["botanist_email"],
                id_column: "botanist_id",
            },
            ForeignKey {
                parent: TableName::Plant,
                lookup_columns: &["plant_id"],
                id_column: "plant_id",
            },
        ],
    },
];

/// Look up the specification of a table
pub fn table_spec(name: TableName) -> &'static TableSpec {
    // The catalogue holds exactly one spec per variant, in `TableName::ALL` order.
    &CATALOGUE[name as usize]
}

/// A materialised table: named, ordered columns and rows of values
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub name: TableName,
    /// Identifier column (also present in `columns`)
    pub id_column: String,
    /// Ordered column names
    pub columns: Vec<String>,
    /// Rows, each with one value per column
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(name: TableName, id_column: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name,
            id_column: id_column.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Value of `column` in row `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// All values of one column, in row order
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().filter_map(|r| r.get(index)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_indexed_by_table_name() {
        for name in TableName::ALL {
            assert_eq!(table_spec(name).name, name);
        }
    }

    #[test]
    fn test_output_columns_id_first_fks_last() {
        let origin = table_spec(TableName::Origin);
        assert_eq!(
            origin.output_columns(),
            vec!["origin_id", "origin_longitude", "origin_latitude", "city_id"]
        );

        let plant = table_spec(TableName::Plant);
        assert_eq!(
            plant.output_columns(),
            vec!["plant_id", "species_id", "origin_id"]
        );
    }

    #[test]
    fn test_projected_columns_deduplicated() {
        let plant = table_spec(TableName::Plant);
        assert_eq!(
            plant.projected_columns(),
            vec![
                "plant_id",
                "species_scientific_name",
                "origin_latitude",
                "origin_longitude"
            ]
        );
    }

    #[test]
    fn test_column_kinds() {
        let botanist = table_spec(TableName::Botanist);
        assert_eq!(botanist.column_kind("botanist_id"), ColumnKind::Integer);
        assert_eq!(botanist.column_kind("botanist_phone"), ColumnKind::Text);

        let reading = table_spec(TableName::Reading);
        assert_eq!(reading.column_kind("plant_id"), ColumnKind::Integer);
        assert_eq!(reading.column_kind("reading_time_taken"), ColumnKind::Timestamp);
        assert_eq!(reading.column_kind("reading_alert"), ColumnKind::Boolean);
        assert_eq!(
            table_spec(TableName::City).column_kind("city_name"),
            ColumnKind::Text
        );
    }

    #[test]
    fn test_table_value_lookup() {
        let mut table = Table::new(
            TableName::Country,
            "country_id",
            vec!["country_id".to_string(), "country_name".to_string()],
        );
        table.rows.push(vec![Value::Int(1), Value::from("France")]);

        assert_eq!(table.value(0, "country_name"), Some(&Value::from("France")));
        assert!(table.value(1, "country_name").is_none());
        assert!(table.value(0, "city_name").is_none());
    }
}
