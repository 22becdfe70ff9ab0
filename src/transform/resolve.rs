//! Foreign key resolution against fully extracted parent tables

use std::collections::HashMap;

use tracing::{debug, warn};

use super::TransformError;
use super::extract::{ExtractedTable, KeyIndex};
use crate::models::{Table, TableName, Value};

/// Replace natural-key references with parent identifiers
///
/// `parents` must hold the index of every parent table; a missing one means
/// the parent has not been fully extracted yet and is reported as
/// [`TransformError::ParentNotExtracted`] instead of resolving against a
/// partial table. References with no match become `Null` and the row is kept.
pub fn resolve_table(
    extracted: &ExtractedTable<'_>,
    parents: &HashMap<TableName, KeyIndex>,
) -> Result<Table, TransformError> {
    let spec = extracted.spec;

    let indexes = spec
        .foreign_keys
        .iter()
        .map(|fk| {
            parents
                .get(&fk.parent)
                .ok_or(TransformError::ParentNotExtracted {
                    table: spec.name,
                    parent: fk.parent,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let columns = spec
        .output_columns()
        .into_iter()
        .map(String::from)
        .collect();
    let mut table = Table::new(spec.name, spec.id_column, columns);
    let mut dangling = vec![0usize; indexes.len()];

    for row in &extracted.rows {
        let mut out = Vec::with_capacity(1 + row.values.len() + indexes.len());
        out.push(row.id.clone());
        out.extend(row.values.iter().cloned());

        for (position, (index, reference)) in indexes.iter().zip(&row.references).enumerate() {
            let resolved = if reference.iter().any(Value::is_null) {
                None
            } else {
                index.lookup(reference).cloned()
            };
            if resolved.is_none() {
                dangling[position] += 1;
                debug!(
                    "Table {}: row {} has no {} match for {:?}",
                    spec.name,
                    row.id,
                    index.table(),
                    reference
                );
            }
            out.push(resolved.unwrap_or(Value::Null));
        }

        table.rows.push(out);
    }

    for (fk, count) in spec.foreign_keys.iter().zip(dangling) {
        if count > 0 {
            warn!(
                "Table {}: {} rows have a dangling {} reference",
                spec.name, count, fk.id_column
            );
        }
    }

    Ok(table)
}
