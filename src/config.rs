//! Pipeline configuration file support
//!
//! Handles parsing of `botanical-etl.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transform::{AlertConfig, TransformConfig};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = "botanical-etl.toml";

/// Environment variable for the raw JSON input path
pub const ENV_INPUT: &str = "BOTANICAL_ETL_INPUT";

/// Environment variable for the clean CSV output directory
pub const ENV_OUTPUT_DIR: &str = "BOTANICAL_ETL_OUTPUT_DIR";

/// Environment variable for the DuckDB path
pub const ENV_DUCKDB_PATH: &str = "BOTANICAL_ETL_DUCKDB_PATH";

/// Environment variable for the plants API base URL
pub const ENV_API_URL: &str = "BOTANICAL_ETL_API_URL";

/// Environment variable for the alert standard-deviation multiplier
pub const ENV_ALERT_STDEV: &str = "BOTANICAL_ETL_ALERT_STDEV";

/// Error loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// File locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsSection {
    /// Raw JSON written by extract and read by transform
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory holding one CSV per normalized table
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for daily summary CSVs
    #[serde(default = "default_summary_dir")]
    pub summary_dir: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("data/raw_data/plant_data_raw.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/clean_data")
}

fn default_summary_dir() -> PathBuf {
    PathBuf::from("data/summaries")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            summary_dir: default_summary_dir(),
        }
    }
}

/// Plants API extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractSection {
    /// Base URL; the plant id is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Known number of endpoints to start discovery from
    #[serde(default = "default_base_endpoints")]
    pub base_endpoints: u32,

    /// Ids probed per discovery step
    #[serde(default = "default_probe_window")]
    pub probe_window: u32,

    /// Concurrent fetches during extraction
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Concurrent fetches during discovery
    #[serde(default = "default_probe_workers")]
    pub probe_workers: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max endpoint found by the last discovery, read back as the next start
    #[serde(default = "default_endpoint_file")]
    pub endpoint_file: PathBuf,
}

fn default_base_url() -> String {
    "http://sigma-labs-bot.herokuapp.com/api/plants/".to_string()
}

fn default_base_endpoints() -> u32 {
    50
}

fn default_probe_window() -> u32 {
    5
}

fn default_workers() -> usize {
    32
}

fn default_probe_workers() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_endpoint_file() -> PathBuf {
    PathBuf::from("data/endpoint/endpoint.txt")
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_endpoints: default_base_endpoints(),
            probe_window: default_probe_window(),
            workers: default_workers(),
            probe_workers: default_probe_workers(),
            timeout_secs: default_timeout_secs(),
            endpoint_file: default_endpoint_file(),
        }
    }
}

/// Database configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    /// Path to the DuckDB database file
    #[serde(default = "default_duckdb_path")]
    pub path: PathBuf,
}

fn default_duckdb_path() -> PathBuf {
    PathBuf::from("data/plants.duckdb")
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_duckdb_path(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `botanical-etl.toml` configuration file format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub extract: ExtractSection,

    #[serde(default)]
    pub alerts: AlertConfig,

    #[serde(default)]
    pub database: DatabaseSection,
}

impl PipelineConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `path`, or `botanical-etl.toml` in the
    /// working directory when no path is given
    ///
    /// A missing default file falls back to defaults; an explicitly named
    /// file must exist. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(CONFIG_FILENAME).exists() => Self::read(Path::new(CONFIG_FILENAME))?,
            None => Self::default(),
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(input) = lookup(ENV_INPUT) {
            self.paths.input = PathBuf::from(input);
        }

        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.paths.output_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup(ENV_DUCKDB_PATH) {
            self.database.path = PathBuf::from(path);
        }

        if let Some(url) = lookup(ENV_API_URL) {
            self.extract.base_url = url;
        }

        // Unparsable multipliers are ignored
        if let Some(stdev) = lookup(ENV_ALERT_STDEV)
            && let Ok(stdev) = stdev.parse()
        {
            self.alerts.stdev_multiplier = stdev;
        }
    }

    /// Settings for the transform stage
    pub fn transform(&self) -> TransformConfig {
        TransformConfig {
            alerts: self.alerts,
        }
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Botanical ETL Configuration

[paths]
# Raw JSON written by `extract` and read by `transform`
input = "data/raw_data/plant_data_raw.json"

# One CSV per normalized table
output_dir = "data/clean_data"

# Daily summaries
summary_dir = "data/summaries"

[extract]
base_url = "http://sigma-labs-bot.herokuapp.com/api/plants/"

# Discovery starts from this many endpoints and probes `probe_window` ids at a time
base_endpoints = 50
probe_window = 5

workers = 32
probe_workers = 4
timeout_secs = 5
endpoint_file = "data/endpoint/endpoint.txt"

[alerts]
# Alert when temperature or soil moisture is more than this many
# standard deviations from the batch mean
stdev_multiplier = 1.0

[database]
path = "data/plants.duckdb"
"#
}
