//! Foreign key references between catalogue tables

use super::enums::TableName;
use serde::Serialize;

/// Foreign key from a dependent table to a parent table
///
/// `lookup_columns` are flat-row columns whose values are matched, by exact
/// equality, against the parent's natural key. The matched parent id is
/// written into `id_column` of the dependent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Referenced table
    pub parent: TableName,
    /// Flat columns carrying the parent's natural key, in the parent's key order
    pub lookup_columns: &'static [&'static str],
    /// Column of the dependent table receiving the parent id
    pub id_column: &'static str,
}
