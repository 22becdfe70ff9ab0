//! Validation functionality
//!
//! Provides validation logic for table catalogues:
//! - Relationship validation (self-references, unknown parents, circular dependencies)
//! - Dependency ordering of tables for extraction

pub mod relationships;

pub use relationships::{RelationshipValidationError, RelationshipValidator};
