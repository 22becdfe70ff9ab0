//! CSV table writer and reader
//!
//! Each table is written to `<dir>/<table>.csv` with a header row of its
//! ordered columns. Writes go to a temporary file in the same directory that
//! is renamed over the target, so readers never observe a truncated file.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{ExportError, TableWriter};
use crate::atomic_io::write_atomic_with;
use crate::models::{Table, TableName, Value, table_spec};
use crate::transform::NormalizedTables;

/// Writes tables as CSV files into one directory
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    dir: PathBuf,
}

impl CsvTableWriter {
    /// Create a writer for `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the given table is written to
    pub fn table_path(&self, name: TableName) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }
}

impl TableWriter for CsvTableWriter {
    fn write(&mut self, table: &Table) -> Result<(), ExportError> {
        let target = self.table_path(table.name);
        write_atomic_with(&target, |out| -> Result<(), ExportError> {
            let mut writer = ::csv::Writer::from_writer(out);
            writer.write_record(&table.columns)?;
            for row in &table.rows {
                writer.write_record(row.iter().map(Value::to_string))?;
            }
            writer.flush()?;
            Ok(())
        })?;
        info!("Wrote {} rows to {}", table.len(), target.display());
        Ok(())
    }
}

/// Write a set of normalized tables as CSV files into `dir`
pub fn write_all(tables: &NormalizedTables, dir: impl Into<PathBuf>) -> Result<(), ExportError> {
    CsvTableWriter::new(dir).write_all(tables)
}

/// Read a CSV table back, typing each cell by its column's kind
///
/// Empty cells become `Null`. Text columns stay text whatever they contain.
pub fn read_csv_table(
    path: &Path,
    name: TableName,
    id_column: &str,
) -> Result<Table, ExportError> {
    let mut reader = ::csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if !columns.iter().any(|c| c == id_column) {
        return Err(ExportError::ValidationError(format!(
            "{} has no '{}' column",
            path.display(),
            id_column
        )));
    }

    let spec = table_spec(name);
    let kinds: Vec<_> = columns.iter().map(|c| spec.column_kind(c)).collect();

    let mut table = Table::new(name, id_column, columns);
    for record in reader.records() {
        let record = record?;
        table.rows.push(
            record
                .iter()
                .zip(&kinds)
                .map(|(raw, &kind)| Value::parse_as(raw, kind))
                .collect(),
        );
    }
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Read every table of the catalogue from `dir`
pub fn read_csv_tables(dir: &Path) -> Result<NormalizedTables, ExportError> {
    let tables = TableName::ALL
        .iter()
        .map(|&name| {
            let path = dir.join(format!("{}.csv", name));
            read_csv_table(&path, name, table_spec(name).id_column)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NormalizedTables::from_tables(tables))
}
