//! Transform stage
//!
//! Turns raw nested plant records into normalized relational tables:
//! - Flattening of nested records into one flat row per record
//! - Field cleaning (phones, emails, title case, timestamps, license numbers)
//! - Error flags and batch-relative alerts
//! - Table extraction with deduplication and identifier assignment
//! - Foreign key resolution in dependency order

pub mod accessor;
pub mod alerts;
pub mod clean;
pub mod extract;
pub mod flatten;
pub mod resolve;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::models::{CATALOGUE, FlatRow, Table, TableName, TableSpec};
use crate::validation::{RelationshipValidationError, RelationshipValidator};

pub use accessor::get_nested;
pub use alerts::{AlertConfig, BatchStats, add_alerts, format_errors};
pub use clean::clean_rows;
pub use extract::{ExtractedRow, ExtractedTable, KeyIndex, extract_table};
pub use flatten::{flatten_record, flatten_records};
pub use resolve::resolve_table;

/// Error during table extraction or relationship resolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("Table {table} names column '{column}', which flat rows do not have")]
    UnknownColumn { table: TableName, column: String },

    #[error("Invalid spec for table {table}: {reason}")]
    InvalidSpec { table: TableName, reason: String },

    #[error("Table {table} cannot resolve against {parent} before {parent} is fully extracted")]
    ParentNotExtracted { table: TableName, parent: TableName },

    #[error(transparent)]
    Relationship(#[from] RelationshipValidationError),
}

/// Settings for the transform stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub alerts: AlertConfig,
}

/// The full set of normalized tables, in dependency order
#[derive(Debug, Clone, Default)]
pub struct NormalizedTables {
    tables: Vec<Table>,
}

impl NormalizedTables {
    /// Wrap tables read back from storage, restoring dependency order
    pub fn from_tables(mut tables: Vec<Table>) -> Self {
        tables.sort_by_key(|t| t.name);
        Self { tables }
    }

    pub fn get(&self, name: TableName) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

impl<'a> IntoIterator for &'a NormalizedTables {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

/// Extract and resolve every table in `specs` from cleaned flat rows
///
/// Tables are processed in dependency order. A table is resolved only after
/// all of its parents are fully extracted, and no table is returned until
/// every table has resolved.
pub fn normalize_rows(
    rows: &[FlatRow],
    specs: &[TableSpec],
) -> Result<NormalizedTables, TransformError> {
    let order = RelationshipValidator::new().dependency_order(specs)?;

    let mut indexes: HashMap<TableName, KeyIndex> = HashMap::new();
    let mut tables = Vec::with_capacity(order.len());

    for spec in order {
        let extracted = extract_table(spec, rows)?;
        tables.push(resolve_table(&extracted, &indexes)?);
        indexes.insert(spec.name, extracted.key_index());
    }

    Ok(NormalizedTables { tables })
}

/// Run the whole transform over raw records with the default catalogue
///
/// # Example
///
/// ```rust
/// use botanical_etl::models::TableName;
/// use botanical_etl::transform::{TransformConfig, normalize};
///
/// let records = vec![serde_json::json!({
///     "plant_id": 1,
///     "name": "Venus flytrap",
///     "temperature": 12.5,
///     "soil_moisture": 30.1
/// })];
/// let tables = normalize(&records, &TransformConfig::default()).unwrap();
/// assert_eq!(tables.get(TableName::Reading).unwrap().len(), 1);
/// ```
pub fn normalize(
    records: &[JsonValue],
    config: &TransformConfig,
) -> Result<NormalizedTables, TransformError> {
    let mut rows = flatten_records(records);
    clean_rows(&mut rows);
    format_errors(&mut rows);
    add_alerts(&mut rows, &config.alerts);

    let tables = normalize_rows(&rows, &CATALOGUE)?;
    info!(
        "Normalized {} records into {} tables",
        records.len(),
        tables.len()
    );
    Ok(tables)
}
