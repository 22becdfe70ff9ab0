//! CLI-specific error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::database::DatabaseError;
use crate::export::ExportError;
use crate::source::SourceError;
use crate::transform::TransformError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    SourceError(#[from] SourceError),

    #[error("Transform error: {0}")]
    TransformError(#[from] TransformError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(String),
}
