//! Botanical ETL - flatten, clean and normalise plant sensor records
//!
//! Provides the stages of the pipeline:
//! - Extraction of raw plant records from the plants API
//! - Transform: flattening, field cleaning, error flags and alerts
//! - Normalisation into nine relational tables with resolved foreign keys
//! - CSV export, DuckDB loading and daily summaries

mod atomic_io;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod database;
pub mod export;
pub mod models;
pub mod source;
pub mod summary;
pub mod transform;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, PipelineConfig};
pub use database::DatabaseError;
#[cfg(feature = "duckdb-backend")]
pub use database::{DuckDbLoader, LoadStats};
pub use export::{CsvTableWriter, ExportError, TableWriter, read_csv_table, read_csv_tables};
#[cfg(feature = "api-backend")]
pub use source::HttpPlantSource;
pub use source::{PlantSource, SourceError};
pub use summary::{PlantSummary, summarize_readings, write_summary};
pub use transform::{NormalizedTables, TransformConfig, TransformError, normalize};
pub use validation::{RelationshipValidationError, RelationshipValidator};

// Re-export models
pub use models::enums::*;
pub use models::{FlatRow, Table, TableSpec, Value};
