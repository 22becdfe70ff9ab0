//! Relationship validation functionality
//!
//! Validates the foreign keys of a table catalogue for self-references,
//! unknown parents and circular dependencies, and derives the order in which
//! tables must be extracted so that every parent is complete before any
//! dependent resolves against it.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::NodeIndex;
use petgraph::{Directed, Direction, Graph};

use crate::models::{TableName, TableSpec};

fn join_tables(tables: &[TableName]) -> String {
    tables
        .iter()
        .map(TableName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Error during relationship validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipValidationError {
    #[error("Table {table} references itself")]
    SelfReference { table: TableName },

    #[error("Table {table} references {parent}, which is not in the catalogue")]
    UnknownParent { table: TableName, parent: TableName },

    #[error("Table {0} is defined more than once")]
    DuplicateTable(TableName),

    #[error("Circular dependency between tables: {}", join_tables(.tables))]
    CircularDependency { tables: Vec<TableName> },
}

/// Relationship validator
#[derive(Default)]
pub struct RelationshipValidator;

impl RelationshipValidator {
    /// Create a new relationship validator
    ///
    /// # Example
    ///
    /// ```rust
    /// use botanical_etl::models::CATALOGUE;
    /// use botanical_etl::validation::relationships::RelationshipValidator;
    ///
    /// let order = RelationshipValidator::new().dependency_order(&CATALOGUE).unwrap();
    /// assert_eq!(order.len(), 9);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Validate that no table references itself
    pub fn validate_no_self_reference(
        &self,
        spec: &TableSpec,
    ) -> Result<(), RelationshipValidationError> {
        if spec.parents().any(|parent| parent == spec.name) {
            return Err(RelationshipValidationError::SelfReference { table: spec.name });
        }
        Ok(())
    }

    /// Order the catalogue so every table follows all of its parents
    ///
    /// Among tables whose parents are all placed, the one listed first in
    /// `specs` goes first, so a catalogue that is already in dependency order
    /// comes back unchanged.
    pub fn dependency_order<'s>(
        &self,
        specs: &'s [TableSpec],
    ) -> Result<Vec<&'s TableSpec>, RelationshipValidationError> {
        let mut graph = Graph::<TableName, (), Directed>::new();
        let mut node_map: HashMap<TableName, NodeIndex> = HashMap::new();

        for spec in specs {
            self.validate_no_self_reference(spec)?;
            if node_map.contains_key(&spec.name) {
                return Err(RelationshipValidationError::DuplicateTable(spec.name));
            }
            node_map.insert(spec.name, graph.add_node(spec.name));
        }

        for spec in specs {
            let child = node_map[&spec.name];
            for parent in spec.parents() {
                let parent_node = *node_map.get(&parent).ok_or(
                    RelationshipValidationError::UnknownParent {
                        table: spec.name,
                        parent,
                    },
                )?;
                graph.update_edge(parent_node, child, ());
            }
        }

        // Kahn's algorithm, always taking the lowest ready node index
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BTreeSet<NodeIndex> = graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .collect();
        let mut order = Vec::with_capacity(specs.len());

        while let Some(node) = ready.pop_first() {
            order.push(&specs[node.index()]);
            for child in graph.neighbors_directed(node, Direction::Outgoing) {
                in_degree[child.index()] -= 1;
                if in_degree[child.index()] == 0 {
                    ready.insert(child);
                }
            }
        }

        if order.len() < specs.len() {
            let tables = graph
                .node_indices()
                .filter(|n| in_degree[n.index()] > 0)
                .map(|n| graph[n])
                .collect();
            return Err(RelationshipValidationError::CircularDependency { tables });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CATALOGUE, ForeignKey, IdStrategy, NullPolicy, RowMode};

    const fn spec(name: TableName, foreign_keys: &'static [ForeignKey]) -> TableSpec {
        TableSpec {
            name,
            id_column: "id",
            id_strategy: IdStrategy::Surrogate,
            columns: &[],
            natural_key: &[],
            row_mode: RowMode::AppendOnly,
            null_policy: NullPolicy::KeepAll,
            foreign_keys,
        }
    }

    const fn fk(parent: TableName) -> ForeignKey {
        ForeignKey {
            parent,
            lookup_columns: &[],
            id_column: "parent_id",
        }
    }

    #[test]
    fn catalogue_order_is_preserved() {
        let order = RelationshipValidator::new()
            .dependency_order(&CATALOGUE)
            .unwrap();
        let names: Vec<_> = order.iter().map(|s| s.name).collect();
        assert_eq!(names, TableName::ALL.to_vec());
    }

    #[test]
    fn parents_are_moved_before_children() {
        static CITY_FK: [ForeignKey; 1] = [fk(TableName::Country)];
        let specs = [
            spec(TableName::City, &CITY_FK),
            spec(TableName::Country, &[]),
        ];
        let order = RelationshipValidator::new()
            .dependency_order(&specs)
            .unwrap();
        let names: Vec<_> = order.iter().map(|s| s.name).collect();
        assert_eq!(names, vec![TableName::Country, TableName::City]);
    }

    #[test]
    fn detects_self_reference() {
        static SELF_FK: [ForeignKey; 1] = [fk(TableName::Plant)];
        let specs = [spec(TableName::Plant, &SELF_FK)];
        let err = RelationshipValidator::new()
            .dependency_order(&specs)
            .unwrap_err();
        assert_eq!(
            err,
            RelationshipValidationError::SelfReference {
                table: TableName::Plant
            }
        );
    }

    #[test]
    fn detects_cycle() {
        static A_FK: [ForeignKey; 1] = [fk(TableName::City)];
        static B_FK: [ForeignKey; 1] = [fk(TableName::Country)];
        let specs = [
            spec(TableName::Country, &A_FK),
            spec(TableName::City, &B_FK),
            spec(TableName::License, &[]),
        ];
        let err = RelationshipValidator::new()
            .dependency_order(&specs)
            .unwrap_err();
        assert_eq!(
            err,
            RelationshipValidationError::CircularDependency {
                tables: vec![TableName::Country, TableName::City]
            }
        );
    }

    #[test]
    fn detects_unknown_parent() {
        static FK: [ForeignKey; 1] = [fk(TableName::Botanist)];
        let specs = [spec(TableName::Reading, &FK)];
        let err = RelationshipValidator::new()
            .dependency_order(&specs)
            .unwrap_err();
        assert!(matches!(
            err,
            RelationshipValidationError::UnknownParent { .. }
        ));
    }
}
