//! Projection, deduplication and id assignment for one table

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::TransformError;
use crate::models::{FlatRow, IdStrategy, NullPolicy, RowMode, TableName, TableSpec, Value};

/// A table row whose foreign keys are still natural-key values
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRow {
    /// Identifier (surrogate or natural)
    pub id: Value,
    /// Natural key values, in `spec.natural_key` order
    pub key: Vec<Value>,
    /// Data column values, in `spec.columns` order
    pub values: Vec<Value>,
    /// Lookup values for each foreign key, in `spec.foreign_keys` order
    pub references: Vec<Vec<Value>>,
}

/// Output of extraction for one table, prior to relationship resolution
#[derive(Debug, Clone)]
pub struct ExtractedTable<'s> {
    pub spec: &'s TableSpec,
    pub rows: Vec<ExtractedRow>,
}

impl ExtractedTable<'_> {
    /// Build the natural key to id index used by dependent tables
    pub fn key_index(&self) -> KeyIndex {
        let mut ids = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            ids.entry(row.key.clone()).or_insert_with(|| row.id.clone());
        }
        KeyIndex {
            table: self.spec.name,
            ids,
        }
    }
}

/// Natural key to identifier map of a fully extracted table
#[derive(Debug, Clone)]
pub struct KeyIndex {
    table: TableName,
    ids: HashMap<Vec<Value>, Value>,
}

impl KeyIndex {
    pub fn table(&self) -> TableName {
        self.table
    }

    /// Identifier for an exact natural key match
    pub fn lookup(&self, key: &[Value]) -> Option<&Value> {
        self.ids.get(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Reject specs that name columns a flat row does not have, or that cannot
/// produce identifiers
pub fn validate_spec(spec: &TableSpec) -> Result<(), TransformError> {
    let mut columns = spec.projected_columns();
    if let NullPolicy::DropIfNullIn(required) = spec.null_policy {
        columns.extend(required.iter().copied());
    }
    if let Some(column) = columns.into_iter().find(|c| !FlatRow::has_column(c)) {
        return Err(TransformError::UnknownColumn {
            table: spec.name,
            column: column.to_string(),
        });
    }

    if spec.id_strategy == IdStrategy::Natural && spec.natural_key.len() != 1 {
        return Err(TransformError::InvalidSpec {
            table: spec.name,
            reason: "a natural identifier needs exactly one key column".to_string(),
        });
    }
    if spec.row_mode == RowMode::Deduplicated && spec.natural_key.is_empty() {
        return Err(TransformError::InvalidSpec {
            table: spec.name,
            reason: "deduplication needs a natural key".to_string(),
        });
    }
    Ok(())
}

fn values_of(row: &FlatRow, columns: &[&str]) -> Vec<Value> {
    columns
        .iter()
        .map(|c| row.get(c).cloned().unwrap_or_default())
        .collect()
}

fn passes_null_policy(spec: &TableSpec, row: &FlatRow, projected: &[&str]) -> bool {
    let has_null = |columns: &[&str]| {
        columns
            .iter()
            .any(|c| row.get(c).is_none_or(Value::is_null))
    };
    match spec.null_policy {
        NullPolicy::DropIfAnyNull => !has_null(projected),
        NullPolicy::DropIfNullIn(required) => !has_null(required),
        NullPolicy::KeepAll => true,
    }
}

/// Project `rows` into the table described by `spec`
///
/// Rows failing the null policy are dropped. In deduplicated mode the first
/// row for each natural key wins. Surrogate ids are a dense 1-based sequence
/// in first-occurrence order; natural ids are the key value itself.
pub fn extract_table<'s>(
    spec: &'s TableSpec,
    rows: &[FlatRow],
) -> Result<ExtractedTable<'s>, TransformError> {
    validate_spec(spec)?;

    let projected = spec.projected_columns();
    let mut seen: HashSet<Vec<Value>> = HashSet::new();
    let mut extracted = Vec::new();
    let mut dropped = 0usize;
    let mut next_id: i64 = 1;

    for row in rows {
        if !passes_null_policy(spec, row, &projected) {
            dropped += 1;
            continue;
        }

        let key = values_of(row, spec.natural_key);
        if spec.row_mode == RowMode::Deduplicated && !seen.insert(key.clone()) {
            continue;
        }

        let id = match spec.id_strategy {
            IdStrategy::Surrogate => {
                let id = Value::Int(next_id);
                next_id += 1;
                id
            }
            IdStrategy::Natural => key.first().cloned().unwrap_or_default(),
        };

        extracted.push(ExtractedRow {
            id,
            key,
            values: values_of(row, spec.columns),
            references: spec
                .foreign_keys
                .iter()
                .map(|fk| values_of(row, fk.lookup_columns))
                .collect(),
        });
    }

    if dropped > 0 {
        debug!(
            "Table {}: dropped {} rows with missing values",
            spec.name, dropped
        );
    }
    info!(
        "Extracted {} rows into table {} from {} flat rows",
        extracted.len(),
        spec.name,
        rows.len()
    );

    Ok(ExtractedTable {
        spec,
        rows: extracted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForeignKey, table_spec};

    fn country_row(country: &str) -> FlatRow {
        FlatRow {
            country_name: Value::from(country),
            ..Default::default()
        }
    }

    #[test]
    fn test_dedup_by_natural_key() {
        let spec = table_spec(TableName::Country);
        let rows = vec![country_row("France"), country_row("France")];
        let table = extract_table(spec, &rows).unwrap();
        assert_eq!(table.rows.len(), 1);

        let rows = vec![
            country_row("France"),
            country_row("France"),
            country_row("Spain"),
        ];
        let table = extract_table(spec, &rows).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_surrogate_ids_dense_first_occurrence() {
        let spec = table_spec(TableName::Country);
        let rows = vec![
            country_row("Spain"),
            country_row("France"),
            country_row("Spain"),
            FlatRow::default(),
            country_row("Moldova"),
        ];
        let table = extract_table(spec, &rows).unwrap();

        let ids: Vec<_> = table.rows.iter().map(|r| r.id.clone()).collect();
        let names: Vec<_> = table.rows.iter().map(|r| r.values[0].clone()).collect();
        assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            names,
            vec![
                Value::from("Spain"),
                Value::from("France"),
                Value::from("Moldova")
            ]
        );
    }

    #[test]
    fn test_natural_id_kept_verbatim() {
        let spec = table_spec(TableName::Plant);
        let row = FlatRow {
            plant_id: Value::Int(42),
            species_scientific_name: Value::from("Ficus Lyrata"),
            origin_latitude: Value::Float(1.0),
            origin_longitude: Value::Float(2.0),
            ..Default::default()
        };
        let table = extract_table(spec, &[row.clone(), row]).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].id, Value::Int(42));
        assert_eq!(
            table.rows[0].references,
            vec![
                vec![Value::from("Ficus Lyrata")],
                vec![Value::Float(1.0), Value::Float(2.0)]
            ]
        );
    }

    #[test]
    fn test_append_only_keeps_duplicates_and_nulls() {
        let spec = table_spec(TableName::Reading);
        let row = FlatRow {
            plant_id: Value::Int(7),
            reading_temperature: Value::Float(12.5),
            ..Default::default()
        };
        let orphan = FlatRow {
            reading_temperature: Value::Float(12.5),
            ..Default::default()
        };
        let table = extract_table(spec, &[row.clone(), row, orphan]).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].id, Value::Int(2));
        assert!(table.rows[0].values[0].is_null());
    }

    #[test]
    fn test_unknown_column_rejected() {
        static BAD: TableSpec = TableSpec {
            name: TableName::Country,
            id_column: "country_id",
            id_strategy: IdStrategy::Surrogate,
            columns: &["country_code"],
            natural_key: &["country_code"],
            row_mode: RowMode::Deduplicated,
            null_policy: NullPolicy::DropIfAnyNull,
            foreign_keys: &[],
        };
        let err = extract_table(&BAD, &[]).unwrap_err();
        assert!(matches!(err, TransformError::UnknownColumn { .. }));
    }

    #[test]
    fn test_dedup_without_key_rejected() {
        static BAD: TableSpec = TableSpec {
            name: TableName::City,
            id_column: "city_id",
            id_strategy: IdStrategy::Surrogate,
            columns: &["city_name"],
            natural_key: &[],
            row_mode: RowMode::Deduplicated,
            null_policy: NullPolicy::KeepAll,
            foreign_keys: &[ForeignKey {
                parent: TableName::Country,
                lookup_columns: &["country_name"],
                id_column: "country_id",
            }],
        };
        let err = extract_table(&BAD, &[]).unwrap_err();
        assert!(matches!(err, TransformError::InvalidSpec { .. }));
    }

    #[test]
    fn test_key_index_lookup() {
        let spec = table_spec(TableName::Country);
        let table = extract_table(spec, &[country_row("Spain"), country_row("France")]).unwrap();
        let index = table.key_index();
        assert_eq!(index.table(), TableName::Country);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&[Value::from("France")]), Some(&Value::Int(2)));
        assert!(index.lookup(&[Value::from("Peru")]).is_none());
    }
}
