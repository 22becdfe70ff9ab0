//! Extract command implementation

use crate::cli::error::CliError;
use crate::config::PipelineConfig;
use crate::source::{
    HttpPlantSource, PlantSource, discover_max_endpoint, extract_all, read_max_endpoint,
    save_raw_json, write_max_endpoint,
};

/// Discover endpoints, fetch every plant and save the raw JSON
///
/// The discovered max endpoint is written back so the next run starts
/// probing from there. Returns the number of records saved.
pub fn extract_to_file<S: PlantSource + ?Sized>(
    source: &S,
    config: &PipelineConfig,
) -> Result<usize, CliError> {
    let extract = &config.extract;

    let start = read_max_endpoint(&extract.endpoint_file, extract.base_endpoints)?;
    let max = discover_max_endpoint(source, start, extract.probe_window, extract.probe_workers)?;
    write_max_endpoint(&extract.endpoint_file, max)?;

    let records = extract_all(source, max, extract.workers)?;
    save_raw_json(&config.paths.input, &records)?;
    Ok(records.len())
}

/// Handle the extract command against the configured plants API
pub fn handle_extract(config: &PipelineConfig) -> Result<usize, CliError> {
    let source = HttpPlantSource::from_config(&config.extract)?;
    extract_to_file(&source, config)
}
