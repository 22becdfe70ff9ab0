//! Models module
//!
//! Defines the row, value and table structures shared by every pipeline
//! stage, plus the catalogue of the nine normalised tables.

pub mod column;
pub mod enums;
pub mod row;
pub mod table;
pub mod value;

pub use column::ForeignKey;
pub use enums::*;
pub use row::{FLAT_COLUMNS, FlatRow};
pub use table::{CATALOGUE, TYPED_COLUMNS, Table, TableSpec, table_spec};
pub use value::{TIMESTAMP_FORMAT, Value};
