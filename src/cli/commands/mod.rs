//! CLI command implementations

pub mod extract;
pub mod load;
pub mod summary;
pub mod transform;

use tracing::info;

use crate::cli::error::CliError;
use crate::config::PipelineConfig;

pub use extract::{extract_to_file, handle_extract};
pub use load::handle_load;
pub use summary::handle_summary;
pub use transform::handle_transform;

/// Handle the run command: extract, transform, then load
pub fn handle_run(config: &PipelineConfig) -> Result<(), CliError> {
    let extracted = handle_extract(config)?;
    info!("Extract stage saved {} records", extracted);

    let tables = handle_transform(config)?;

    #[cfg(feature = "duckdb-backend")]
    {
        let stats = load::load_tables(&tables, config)?;
        info!("Load stage inserted {} rows", stats.total_inserted());
    }
    #[cfg(not(feature = "duckdb-backend"))]
    {
        let _ = tables;
        tracing::warn!("DuckDB backend not compiled in, skipping load");
    }

    Ok(())
}
