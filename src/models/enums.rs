//! Enums describing the normalised table catalogue

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine logical tables produced by normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    Country,
    City,
    Origin,
    License,
    Image,
    Botanist,
    Species,
    Plant,
    Reading,
}

impl TableName {
    /// All tables in catalogue order
    pub const ALL: [TableName; 9] = [
        TableName::Country,
        TableName::City,
        TableName::Origin,
        TableName::License,
        TableName::Image,
        TableName::Botanist,
        TableName::Species,
        TableName::Plant,
        TableName::Reading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Country => "country",
            TableName::City => "city",
            TableName::Origin => "origin",
            TableName::License => "license",
            TableName::Image => "image",
            TableName::Botanist => "botanist",
            TableName::Species => "species",
            TableName::Plant => "plant",
            TableName::Reading => "reading",
        }
    }
}

impl std::str::FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown table: {}", s))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a table's identifier column is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Dense 1-based sequence in first-occurrence order
    Surrogate,
    /// The natural key is the identifier and is kept verbatim
    Natural,
}

/// Which rows are dropped before deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NullPolicy {
    /// Drop a row when any projected column is null
    DropIfAnyNull,
    /// Drop a row only when one of the listed columns is null
    DropIfNullIn(&'static [&'static str]),
    /// Keep every row
    KeepAll,
}

/// Whether extraction collapses rows sharing a natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMode {
    /// One row per distinct natural key, first occurrence wins
    Deduplicated,
    /// Every surviving row is kept; duplicates are expected
    AppendOnly,
}

/// Storage type of a table column, shared by the CSV reader and the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Timestamp,
    Text,
}
