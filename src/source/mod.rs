//! Extraction stage
//!
//! Fetches raw plant records by id from a [`PlantSource`]:
//! - Endpoint discovery (how many plant ids currently answer)
//! - Bounded parallel extraction of every id
//! - Raw JSON persistence between extract and transform

#[cfg(feature = "api-backend")]
pub mod api;
pub mod raw;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

#[cfg(feature = "api-backend")]
pub use api::HttpPlantSource;
pub use raw::{load_raw_json, read_max_endpoint, save_raw_json, write_max_endpoint};

/// Error during extraction
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Worker pool error: {0}")]
    PoolError(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::IoError(err.to_string())
    }
}

/// Anything that can return the raw record of one plant
pub trait PlantSource: Sync {
    /// Fetch one plant; `Ok(None)` means the id does not exist
    fn fetch(&self, plant_id: u32) -> Result<Option<JsonValue>, SourceError>;
}

fn build_pool(workers: usize) -> Result<ThreadPool, SourceError> {
    ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| SourceError::PoolError(e.to_string()))
}

/// Find the highest plant id worth fetching
///
/// Starting from `start`, probes the `window` ids `[max, max + window)`
/// concurrently and advances `max` by `window` while any of them answers.
/// Failed probes count as missing.
pub fn discover_max_endpoint<S: PlantSource + ?Sized>(
    source: &S,
    start: u32,
    window: u32,
    workers: usize,
) -> Result<u32, SourceError> {
    let pool = build_pool(workers)?;
    let mut max = start;

    loop {
        let probe = max..max.saturating_add(window);
        let found = pool.install(|| {
            probe
                .clone()
                .into_par_iter()
                .any(|id| matches!(source.fetch(id), Ok(Some(_))))
        });
        if !found {
            break;
        }
        debug!("Ids {:?} answered, advancing", probe);
        max = probe.end;
    }

    info!("Discovered max endpoint {}", max);
    Ok(max)
}

/// Fetch ids `1..=max` on a pool of `workers` threads
///
/// Records come back in id order. Missing ids and per-id failures are
/// logged and skipped; only pool setup can fail the batch.
pub fn extract_all<S: PlantSource + ?Sized>(
    source: &S,
    max: u32,
    workers: usize,
) -> Result<Vec<JsonValue>, SourceError> {
    let pool = build_pool(workers)?;
    let results: Vec<(u32, Result<Option<JsonValue>, SourceError>)> = pool.install(|| {
        (1..=max)
            .into_par_iter()
            .map(|id| (id, source.fetch(id)))
            .collect()
    });

    let mut records = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (id, result) in results {
        match result {
            Ok(Some(record)) => records.push(record),
            Ok(None) => debug!("Plant {} not found", id),
            Err(e) => {
                failed += 1;
                warn!("Failed to fetch plant {}: {}", id, e);
            }
        }
    }

    info!(
        "Extracted {} of {} plants ({} failed)",
        records.len(),
        max,
        failed
    );
    Ok(records)
}
