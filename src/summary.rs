//! Daily per-plant summary of readings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::atomic_io::write_atomic_with;
use crate::export::ExportError;
use crate::models::{Table, Value};
use crate::transform::clean::parse_timestamp;

/// Aggregates of one plant's readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantSummary {
    pub plant_id: i64,
    #[serde(rename = "reading_temperature")]
    pub mean_temperature: Option<f64>,
    #[serde(rename = "reading_soil_moisture")]
    pub mean_soil_moisture: Option<f64>,
    #[serde(rename = "reading_error")]
    pub error_count: usize,
    #[serde(rename = "reading_alert")]
    pub alert_count: usize,
}

#[derive(Default)]
struct Accumulator {
    temperature_sum: f64,
    temperature_count: usize,
    moisture_sum: f64,
    moisture_count: usize,
    errors: usize,
    alerts: usize,
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

fn timestamp_of(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Timestamp(t) => Some(*t),
        Value::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Header of the summary CSV
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "plant_id",
    "reading_temperature",
    "reading_soil_moisture",
    "reading_error",
    "reading_alert",
];

const REQUIRED_COLUMNS: [&str; 6] = [
    "plant_id",
    "reading_time_taken",
    "reading_temperature",
    "reading_soil_moisture",
    "reading_error",
    "reading_alert",
];

/// Group readings by plant, ordered by plant id
///
/// With `since`, only readings taken at or after it count; readings without
/// a usable time are then left out. Readings without a plant are skipped.
pub fn summarize_readings(
    readings: &Table,
    since: Option<NaiveDateTime>,
) -> Result<Vec<PlantSummary>, ExportError> {
    let index = |column: &str| {
        readings.column_index(column).ok_or_else(|| {
            ExportError::ValidationError(format!(
                "Table {} has no '{}' column",
                readings.name, column
            ))
        })
    };
    let [plant, taken, temperature, moisture, error, alert] = [
        index(REQUIRED_COLUMNS[0])?,
        index(REQUIRED_COLUMNS[1])?,
        index(REQUIRED_COLUMNS[2])?,
        index(REQUIRED_COLUMNS[3])?,
        index(REQUIRED_COLUMNS[4])?,
        index(REQUIRED_COLUMNS[5])?,
    ];

    let mut groups: BTreeMap<i64, Accumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in &readings.rows {
        let Some(plant_id) = row[plant].as_i64() else {
            skipped += 1;
            continue;
        };
        if let Some(since) = since
            && !timestamp_of(&row[taken]).is_some_and(|t| t >= since)
        {
            continue;
        }

        let acc = groups.entry(plant_id).or_default();
        if let Some(t) = row[temperature].as_f64() {
            acc.temperature_sum += t;
            acc.temperature_count += 1;
        }
        if let Some(m) = row[moisture].as_f64() {
            acc.moisture_sum += m;
            acc.moisture_count += 1;
        }
        if row[error].as_bool() == Some(true) {
            acc.errors += 1;
        }
        if row[alert].as_bool() == Some(true) {
            acc.alerts += 1;
        }
    }

    if skipped > 0 {
        debug!("Skipped {} readings without a plant", skipped);
    }

    let summaries: Vec<_> = groups
        .into_iter()
        .map(|(plant_id, acc)| PlantSummary {
            plant_id,
            mean_temperature: mean(acc.temperature_sum, acc.temperature_count),
            mean_soil_moisture: mean(acc.moisture_sum, acc.moisture_count),
            error_count: acc.errors,
            alert_count: acc.alerts,
        })
        .collect();
    info!("Summarized readings for {} plants", summaries.len());
    Ok(summaries)
}

/// Write summaries to `<dir>/<YYYY-MM-DD>.csv`, returning the path
pub fn write_summary(
    dir: &Path,
    date: NaiveDate,
    summaries: &[PlantSummary],
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.csv", date.format("%Y-%m-%d")));
    write_atomic_with(&path, |out| -> Result<(), ExportError> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        writer.write_record(SUMMARY_COLUMNS)?;
        for summary in summaries {
            writer.serialize(summary)?;
        }
        writer.flush()?;
        Ok(())
    })?;

    info!("Wrote {} summaries to {}", summaries.len(), path.display());
    Ok(path)
}
