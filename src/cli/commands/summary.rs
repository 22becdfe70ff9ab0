//! Summary command implementation

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};

use crate::cli::error::CliError;
use crate::config::PipelineConfig;
use crate::export::read_csv_table;
use crate::models::{TableName, table_spec};
use crate::summary::{summarize_readings, write_summary};

/// Handle the summary command
///
/// Summarises `reading.csv` from the output directory, optionally only the
/// readings of the last `since_hours` before `now`, into a dated CSV.
pub fn handle_summary(
    config: &PipelineConfig,
    since_hours: Option<u32>,
    now: NaiveDateTime,
) -> Result<PathBuf, CliError> {
    let spec = table_spec(TableName::Reading);
    let path = config
        .paths
        .output_dir
        .join(format!("{}.csv", TableName::Reading));
    let readings = read_csv_table(&path, TableName::Reading, spec.id_column)?;

    let since = since_hours.map(|hours| now - Duration::hours(i64::from(hours)));
    let summaries = summarize_readings(&readings, since)?;
    Ok(write_summary(
        &config.paths.summary_dir,
        now.date(),
        &summaries,
    )?)
}
