//! Database load stage
//!
//! This module provides:
//! - The relational schema of the nine normalized tables
//! - DuckDB: embedded database loader with natural-key reuse across runs

#[cfg(feature = "duckdb-backend")]
pub mod duckdb;

pub mod schema;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::{DuckDbLoader, LoadStats};

pub use schema::DatabaseSchema;

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database not initialized
    #[error("Database not initialized. Call initialize() first.")]
    NotInitialized,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
