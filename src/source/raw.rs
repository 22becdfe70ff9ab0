//! Raw extract files: the JSON array of records and the max endpoint marker

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::SourceError;
use crate::atomic_io::write_atomic;

/// Save records as a pretty-printed JSON array
pub fn save_raw_json(path: &Path, records: &[JsonValue]) -> Result<(), SourceError> {
    let content = serde_json::to_vec_pretty(records)
        .map_err(|e| SourceError::DecodeError(format!("Failed to serialize records: {}", e)))?;
    write_atomic::<SourceError>(path, &content)?;
    info!("Saved {} raw records to {}", records.len(), path.display());
    Ok(())
}

/// Load a JSON array of records
///
/// Any other top-level JSON value is rejected.
pub fn load_raw_json(path: &Path) -> Result<Vec<JsonValue>, SourceError> {
    let content = fs::read_to_string(path).map_err(|e| {
        SourceError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let value: JsonValue = serde_json::from_str(&content)
        .map_err(|e| SourceError::DecodeError(format!("{}: {}", path.display(), e)))?;

    match value {
        JsonValue::Array(records) => {
            debug!("Loaded {} raw records from {}", records.len(), path.display());
            Ok(records)
        }
        other => Err(SourceError::InvalidData(format!(
            "{} holds a JSON {}, expected an array of records",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Read the max endpoint found by a previous discovery, or `default`
pub fn read_max_endpoint(path: &Path, default: u32) -> Result<u32, SourceError> {
    if !path.exists() {
        return Ok(default);
    }
    let content = fs::read_to_string(path)?;
    content.trim().parse().map_err(|_| {
        SourceError::InvalidData(format!(
            "{} holds '{}', expected an endpoint count",
            path.display(),
            content.trim()
        ))
    })
}

/// Persist the max endpoint for the next discovery
pub fn write_max_endpoint(path: &Path, max: u32) -> Result<(), SourceError> {
    write_atomic(path, max.to_string().as_bytes())
}
