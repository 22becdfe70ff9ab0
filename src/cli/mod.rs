//! Command-line front end: one handler per pipeline stage

pub mod commands;
pub mod error;

pub use error::CliError;
