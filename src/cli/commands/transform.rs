//! Transform command implementation

use crate::cli::error::CliError;
use crate::config::PipelineConfig;
use crate::export::write_all;
use crate::source::load_raw_json;
use crate::transform::{NormalizedTables, normalize};

/// Handle the transform command: raw JSON in, one CSV per table out
pub fn handle_transform(config: &PipelineConfig) -> Result<NormalizedTables, CliError> {
    let records = load_raw_json(&config.paths.input)?;
    let tables = normalize(&records, &config.transform())?;
    write_all(&tables, &config.paths.output_dir)?;
    Ok(tables)
}
