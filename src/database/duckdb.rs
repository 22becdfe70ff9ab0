//! DuckDB load stage
//!
//! Loads normalized tables into an embedded DuckDB database. Dimension
//! tables and plants are matched on their natural key so repeated runs reuse
//! stored identifiers; readings are always appended.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use duckdb::types::{ToSqlOutput, Value as DbValue, ValueRef};
use duckdb::{Connection, Transaction, params_from_iter};
use tracing::{debug, info};

use super::schema::DatabaseSchema;
use super::{DatabaseError, DatabaseResult};
use crate::models::{
    CATALOGUE, IdStrategy, RowMode, TIMESTAMP_FORMAT, Table, TableName, TableSpec, Value,
};
use crate::transform::NormalizedTables;
use crate::validation::RelationshipValidator;

impl duckdb::ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(DbValue::Null),
            Value::Bool(b) => ToSqlOutput::Owned(DbValue::Boolean(*b)),
            Value::Int(i) => ToSqlOutput::Owned(DbValue::BigInt(*i)),
            Value::Float(f) => ToSqlOutput::Owned(DbValue::Double(*f)),
            // DuckDB casts the text to TIMESTAMP on insert
            Value::Timestamp(t) => {
                ToSqlOutput::Owned(DbValue::Text(t.format(TIMESTAMP_FORMAT).to_string()))
            }
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Rows inserted and reused per table by one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub inserted: BTreeMap<TableName, usize>,
    pub reused: BTreeMap<TableName, usize>,
}

impl LoadStats {
    pub fn inserted(&self, table: TableName) -> usize {
        self.inserted.get(&table).copied().unwrap_or(0)
    }

    pub fn reused(&self, table: TableName) -> usize {
        self.reused.get(&table).copied().unwrap_or(0)
    }

    pub fn total_inserted(&self) -> usize {
        self.inserted.values().sum()
    }
}

/// Outcome of loading one table
struct TableLoad {
    inserted: usize,
    reused: usize,
    /// Run-local id to stored id
    ids: HashMap<Value, Value>,
}

/// DuckDB loader
///
/// Supports both file-based persistence and in-memory mode.
pub struct DuckDbLoader {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    /// DuckDB connection (wrapped in Mutex for thread safety)
    connection: Mutex<Connection>,
}

impl DuckDbLoader {
    /// Open (or create) a file-based database
    pub fn new(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionFailed(format!(
                    "Failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let connection = Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: Some(path),
            connection: Mutex::new(connection),
        })
    }

    /// Create an in-memory database
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: None,
            connection: Mutex::new(connection),
        })
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    fn lock(&self) -> DatabaseResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| DatabaseError::ConnectionFailed(format!("Lock error: {}", e)))
    }

    /// Create the nine tables if they do not exist
    pub fn initialize(&self) -> DatabaseResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(DatabaseSchema::create_tables_sql())
            .map_err(|e| DatabaseError::QueryFailed(format!("Schema creation failed: {}", e)))
    }

    /// Whether every table exists
    pub fn is_initialized(&self) -> DatabaseResult<bool> {
        let conn = self.lock()?;
        let names: Vec<&str> = TableName::ALL.iter().map(TableName::as_str).collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'main' AND table_name IN ({})",
            placeholders
        );
        let count: i64 = conn
            .query_row(&sql, params_from_iter(names.iter()), |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(format!("Schema lookup failed: {}", e)))?;
        Ok(count as usize == names.len())
    }

    /// Number of stored rows in `table`
    pub fn row_count(&self, table: TableName) -> DatabaseResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| DatabaseError::QueryFailed(format!("Count of {} failed: {}", table, e)))?;
        Ok(count as usize)
    }

    /// Load every table in dependency order inside one transaction
    ///
    /// Rows whose natural key is already stored keep the stored id; foreign
    /// keys are remapped from the ids of this run to the stored ones. Any
    /// failure rolls the whole load back.
    pub fn load(&self, tables: &NormalizedTables) -> DatabaseResult<LoadStats> {
        if !self.is_initialized()? {
            return Err(DatabaseError::NotInitialized);
        }
        let order = RelationshipValidator::new()
            .dependency_order(&CATALOGUE)
            .map_err(|e| DatabaseError::InvalidInput(e.to_string()))?;

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(format!("Begin failed: {}", e)))?;

        let mut id_maps: HashMap<TableName, HashMap<Value, Value>> = HashMap::new();
        let mut stats = LoadStats::default();

        for spec in order {
            let Some(table) = tables.get(spec.name) else {
                debug!("Table {} not provided, skipping", spec.name);
                continue;
            };
            let load = load_table(&tx, spec, table, &id_maps)?;
            info!(
                "Loaded table {}: {} inserted, {} reused",
                spec.name, load.inserted, load.reused
            );
            stats.inserted.insert(spec.name, load.inserted);
            stats.reused.insert(spec.name, load.reused);
            id_maps.insert(spec.name, load.ids);
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(format!("Commit failed: {}", e)))?;

        info!("Load committed: {} rows inserted", stats.total_inserted());
        Ok(stats)
    }
}

fn query_failed(table: TableName) -> impl Fn(duckdb::Error) -> DatabaseError {
    move |e| DatabaseError::QueryFailed(format!("Table {}: {}", table, e))
}

fn load_table(
    tx: &Transaction<'_>,
    spec: &TableSpec,
    table: &Table,
    id_maps: &HashMap<TableName, HashMap<Value, Value>>,
) -> DatabaseResult<TableLoad> {
    let columns = spec.output_columns();
    if table.columns != columns {
        return Err(DatabaseError::InvalidInput(format!(
            "Table {} has columns {:?}, expected {:?}",
            spec.name, table.columns, columns
        )));
    }

    let key_positions = spec
        .natural_key
        .iter()
        .map(|key| {
            table.column_index(key).ok_or_else(|| {
                DatabaseError::InvalidInput(format!(
                    "Table {} does not output its key column {}",
                    spec.name, key
                ))
            })
        })
        .collect::<DatabaseResult<Vec<_>>>()?;
    let fk_offset = 1 + spec.columns.len();

    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.name,
        columns.join(", "),
        vec!["?"; columns.len()].join(", ")
    );
    let mut insert = tx.prepare(&insert_sql).map_err(query_failed(spec.name))?;

    let mut existing = match spec.row_mode {
        RowMode::Deduplicated => {
            let condition = spec
                .natural_key
                .iter()
                .map(|key| format!("{} IS NOT DISTINCT FROM ?", key))
                .collect::<Vec<_>>()
                .join(" AND ");
            let sql = format!(
                "SELECT {} FROM {} WHERE {} LIMIT 1",
                spec.id_column, spec.name, condition
            );
            Some(tx.prepare(&sql).map_err(query_failed(spec.name))?)
        }
        RowMode::AppendOnly => None,
    };

    let max_id: i64 = tx
        .query_row(
            &format!(
                "SELECT COALESCE(MAX({}), 0) FROM {}",
                spec.id_column, spec.name
            ),
            [],
            |row| row.get(0),
        )
        .map_err(query_failed(spec.name))?;
    let mut next_id = max_id + 1;

    let mut load = TableLoad {
        inserted: 0,
        reused: 0,
        ids: HashMap::with_capacity(table.len()),
    };

    for row in &table.rows {
        let mut values = row.clone();

        for (i, fk) in spec.foreign_keys.iter().enumerate() {
            let position = fk_offset + i;
            if values[position].is_null() {
                continue;
            }
            let stored = id_maps
                .get(&fk.parent)
                .and_then(|ids| ids.get(&values[position]))
                .cloned();
            if stored.is_none() {
                debug!(
                    "Table {}: {} {} not loaded, storing null",
                    spec.name, fk.id_column, values[position]
                );
            }
            values[position] = stored.unwrap_or(Value::Null);
        }

        if let Some(stmt) = existing.as_mut() {
            let key = key_positions.iter().map(|&p| &values[p]);
            let mut rows = stmt.query(params_from_iter(key)).map_err(query_failed(spec.name))?;
            if let Some(found) = rows.next().map_err(query_failed(spec.name))? {
                let stored: i64 = found.get(0).map_err(query_failed(spec.name))?;
                load.ids.insert(values[0].clone(), Value::Int(stored));
                load.reused += 1;
                continue;
            }
        }

        let stored = match spec.id_strategy {
            IdStrategy::Surrogate => {
                let id = Value::Int(next_id);
                next_id += 1;
                id
            }
            IdStrategy::Natural => values[0].clone(),
        };
        load.ids.insert(values[0].clone(), stored.clone());
        values[0] = stored;

        insert
            .execute(params_from_iter(values.iter()))
            .map_err(query_failed(spec.name))?;
        load.inserted += 1;
    }

    Ok(load)
}
