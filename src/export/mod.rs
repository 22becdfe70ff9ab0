//! Export functionality
//!
//! Provides writers for normalized tables:
//! - CSV (one `<table>.csv` per table, written atomically)
//!
//! and the matching CSV reader used by the load and summary stages.

pub mod csv;

use crate::models::Table;
use crate::transform::NormalizedTables;

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err.to_string())
    }
}

impl From<::csv::Error> for ExportError {
    fn from(err: ::csv::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Destination for materialised tables
pub trait TableWriter {
    /// Write one table, replacing any previous copy
    fn write(&mut self, table: &Table) -> Result<(), ExportError>;

    /// Write every table, in dependency order
    fn write_all(&mut self, tables: &NormalizedTables) -> Result<(), ExportError> {
        for table in tables {
            self.write(table)?;
        }
        Ok(())
    }
}

// Re-export for convenience
pub use self::csv::{CsvTableWriter, read_csv_table, read_csv_tables, write_all};
