//! Load command implementation

use crate::cli::error::CliError;
use crate::config::PipelineConfig;
#[cfg(feature = "duckdb-backend")]
use crate::database::{DuckDbLoader, LoadStats};
#[cfg(feature = "duckdb-backend")]
use crate::export::read_csv_tables;
#[cfg(feature = "duckdb-backend")]
use crate::transform::NormalizedTables;

/// Load tables into the configured DuckDB file, creating the schema if needed
#[cfg(feature = "duckdb-backend")]
pub fn load_tables(
    tables: &NormalizedTables,
    config: &PipelineConfig,
) -> Result<LoadStats, CliError> {
    let loader = DuckDbLoader::new(&config.database.path)?;
    loader.initialize()?;
    Ok(loader.load(tables)?)
}

/// Handle the load command: read the CSVs written by transform and load them
#[cfg(feature = "duckdb-backend")]
pub fn handle_load(config: &PipelineConfig) -> Result<LoadStats, CliError> {
    let tables = read_csv_tables(&config.paths.output_dir)?;
    load_tables(&tables, config)
}

#[cfg(not(feature = "duckdb-backend"))]
pub fn handle_load(_config: &PipelineConfig) -> Result<(), CliError> {
    Err(CliError::FeatureDisabled(
        "load needs the duckdb-backend feature".to_string(),
    ))
}
