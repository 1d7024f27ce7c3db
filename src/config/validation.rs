// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for table dependency integrity.
//!
//! Ensures that table names are unique, every `foreign_key` reference points to a
//! table defined somewhere in the config, and the resulting dependency graph is
//! acyclic. Validation failures are never fatal at load time (see
//! [`crate::config::loader::load_and_validate_config`]): the startup sequencer falls
//! back to config-declaration order when the graph can't be linearized, trading
//! strict correctness for availability.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness**: table names must be unique
//! 2. **Reference resolution**: every `foreign_key` parent must exist
//! 3. **Cycle detection**: only runs if the first two stages are clean, since cycle
//!    detection over dangling references produces misleading cycle paths
//!
//! # Example
//! ```rust
//! use tablestream::config::{validate_tables, Config};
//!
//! let yaml = r#"
//! tables:
//!   - table_name: a
//!     row_count: 1
//!     columns: []
//! "#;
//! let config: Config = serde_yaml::from_str(yaml).unwrap();
//! assert!(validate_tables(&config).is_ok());
//! ```

use crate::config::dependency_graph::DependencyGraph;
use crate::config::loader::Config;
use crate::errors::ValidationError;
use std::collections::HashSet;

/// Validates a configuration's table dependency graph for structural integrity.
///
/// Accumulates every uniqueness and reference error it finds; only runs cycle
/// detection once those stages are clean, since a dangling reference would
/// otherwise surface as a spurious or misleading cycle.
pub fn validate_tables(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_table_names(config) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_parent_references(config) {
        errors.extend(unresolved_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(config) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that all table names are unique within the configuration.
fn validate_unique_table_names(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for table in &config.tables {
        if !seen.insert(&table.table_name) {
            errors.push(ValidationError::DuplicateTableName(table.table_name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every `foreign_key` parent reference points to a table defined in
/// this configuration.
fn validate_parent_references(config: &Config) -> Result<(), Vec<ValidationError>> {
    let table_names: HashSet<&String> = config.tables.iter().map(|t| &t.table_name).collect();
    let mut errors = Vec::new();

    for table in &config.tables {
        for parent in crate::config::dependency_graph::parents_referenced_by(table) {
            if !table_names.contains(&parent) {
                errors.push(ValidationError::UnresolvedParent {
                    table: table.table_name.clone(),
                    parent,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that the FK dependency graph is acyclic, reporting the actual cycle path.
fn validate_acyclic_graph(config: &Config) -> Result<(), Vec<ValidationError>> {
    let graph = DependencyGraph::from_tables(&config.tables);

    if graph.topological_sort().is_some() {
        return Ok(());
    }

    let cycle = find_cycle_path(&graph).unwrap_or_default();
    Err(vec![ValidationError::CyclicDependency { cycle }])
}

/// Finds one concrete cycle path in `graph`, for error reporting once
/// [`DependencyGraph::topological_sort`] has already confirmed a cycle exists.
///
/// Walks an explicit frame stack rather than recursing: each frame is a node plus
/// how far we've already walked through its neighbor list, so backtracking is just
/// popping a frame instead of returning up a call chain.
fn find_cycle_path(graph: &DependencyGraph) -> Option<Vec<String>> {
    let mut visited = HashSet::new();

    for start in graph.keys() {
        if visited.contains(start) {
            continue;
        }
        if let Some(cycle) = cycle_from(graph, start, &mut visited) {
            return Some(cycle);
        }
    }
    None
}

fn cycle_from(graph: &DependencyGraph, start: &str, visited: &mut HashSet<String>) -> Option<Vec<String>> {
    let mut on_path = HashSet::new();
    let mut path = Vec::new();
    let mut frames: Vec<(String, usize)> = Vec::new();

    visited.insert(start.to_string());
    on_path.insert(start.to_string());
    path.push(start.to_string());
    frames.push((start.to_string(), 0));

    while let Some(&(ref node, next_index)) = frames.last() {
        let node = node.clone();
        let neighbors = graph.get_dependents(&node);
        let neighbor = neighbors.and_then(|n| n.get(next_index));

        let Some(neighbor) = neighbor else {
            frames.pop();
            path.pop();
            on_path.remove(&node);
            continue;
        };

        frames.last_mut().unwrap().1 += 1;

        if on_path.contains(neighbor) {
            let cycle_start = path.iter().position(|x| x == neighbor).unwrap();
            let mut cycle = path[cycle_start..].to_vec();
            cycle.push(neighbor.clone());
            return Some(cycle);
        }

        if visited.insert(neighbor.clone()) {
            on_path.insert(neighbor.clone());
            path.push(neighbor.clone());
            frames.push((neighbor.clone(), 0));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn valid_empty_config() {
        let config = config_from("tables: []\n");
        assert!(validate_tables(&config).is_ok());
    }

    #[test]
    fn valid_linear_chain() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns: []
  - table_name: b
    row_count: 1
    columns:
      - column_name: a_id
        type: int
        data: "foreign_key('a','id')"
  - table_name: c
    row_count: 1
    columns:
      - column_name: b_id
        type: int
        data: "foreign_key('b','id')"
"#,
        );
        assert!(validate_tables(&config).is_ok());
    }

    #[test]
    fn valid_diamond_dependency() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns: []
  - table_name: b
    row_count: 1
    columns:
      - column_name: a_id
        type: int
        data: "foreign_key('a','id')"
  - table_name: c
    row_count: 1
    columns:
      - column_name: a_id
        type: int
        data: "foreign_key('a','id')"
  - table_name: d
    row_count: 1
    columns:
      - column_name: b_id
        type: int
        data: "foreign_key('b','id')"
      - column_name: c_id
        type: int
        data: "foreign_key('c','id')"
"#,
        );
        assert!(validate_tables(&config).is_ok());
    }

    #[test]
    fn duplicate_table_names() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns: []
  - table_name: a
    row_count: 1
    columns: []
"#,
        );
        let result = validate_tables(&config);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::DuplicateTableName(_)));
    }

    #[test]
    fn unresolved_parent_reference() {
        let config = config_from(
            r#"
tables:
  - table_name: orders
    row_count: 1
    columns:
      - column_name: customer_id
        type: int
        data: "foreign_key('customers','customer_id')"
"#,
        );
        let result = validate_tables(&config);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::UnresolvedParent { .. }));
    }

    #[test]
    fn simple_cycle() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns:
      - column_name: b_id
        type: int
        data: "foreign_key('b','id')"
  - table_name: b
    row_count: 1
    columns:
      - column_name: a_id
        type: int
        data: "foreign_key('a','id')"
"#,
        );
        let result = validate_tables(&config);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::CyclicDependency { .. }));
    }

    #[test]
    fn self_referencing_table_is_a_cycle() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns:
      - column_name: a_id
        type: int
        data: "foreign_key('a','id')"
"#,
        );
        let result = validate_tables(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err()[0],
            ValidationError::CyclicDependency { .. }
        ));
    }

    #[test]
    fn multiple_errors_accumulate() {
        let config = config_from(
            r#"
tables:
  - table_name: a
    row_count: 1
    columns:
      - column_name: x
        type: int
        data: "foreign_key('missing','id')"
  - table_name: a
    row_count: 1
    columns: []
"#,
        );
        let result = validate_tables(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().len() >= 2);
    }
}
