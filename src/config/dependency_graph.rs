// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::loader::TableSpec;
use std::collections::{HashMap, VecDeque};

/// A type-safe wrapper for table dependency relationships with graph algorithms.
///
/// The `DependencyGraph` represents FK dependencies between streaming tables as a
/// directed acyclic graph (DAG) where each table maps to the list of tables that
/// reference it via `foreign_key(...)`. This forward adjacency representation
/// (parent -> [children]) enables efficient topological sorting so the startup
/// sequencer can warm up parents before any child that needs their rows.
///
/// The internal structure is `HashMap<String, Vec<String>>` where:
/// - **Key**: table name that produces rows other tables reference
/// - **Value**: list of table names that hold a `foreign_key` back to this table
///
/// # Examples
///
/// ## Building a graph from parsed table configuration
/// ```
/// use tablestream::config::DependencyGraph;
/// use tablestream::config::loader::{Config, TableSpec};
///
/// let yaml = r#"
/// tables:
///   - table_name: customers
///     row_count: 10
///     columns:
///       - column_name: customer_id
///         type: int
///         data: "row_id"
///         is_primary_key: true
///   - table_name: orders
///     row_count: 20
///     columns:
///       - column_name: customer_id
///         type: int
///         data: "foreign_key('customers', 'customer_id')"
/// "#;
/// let cfg: Config = serde_yaml::from_str(yaml).unwrap();
/// let graph = DependencyGraph::from_tables(&cfg.tables);
/// let order = graph.topological_sort().unwrap();
/// let c = order.iter().position(|t| t == "customers").unwrap();
/// let o = order.iter().position(|t| t == "orders").unwrap();
/// assert!(c < o);
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build a forward dependency graph (parent -> children) by scanning every table's
    /// columns for `foreign_key('parent', 'parent_pk')` references.
    ///
    /// `copy_from_fk(...)` calls are not scanned here: they copy a value out of the
    /// row already cached for a column's own `foreign_key`, so they never introduce a
    /// dependency edge of their own.
    pub fn from_tables(tables: &[TableSpec]) -> Self {
        let mut graph: HashMap<String, Vec<String>> = HashMap::new();

        for table in tables {
            graph.entry(table.table_name.clone()).or_default();
        }

        for table in tables {
            for parent in parents_referenced_by(table) {
                if !graph.contains_key(&parent) {
                    graph.entry(parent.clone()).or_default();
                }
                graph
                    .get_mut(&parent)
                    .unwrap()
                    .push(table.table_name.clone());
            }
        }

        Self(graph)
    }

    /// Get dependents for a table.
    pub fn get_dependents(&self, table_name: &str) -> Option<&Vec<String>> {
        self.0.get(table_name)
    }

    /// Get all table names in the graph.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Build the dependency count map from the adjacency graph.
    /// Returns a map of table_name -> number of parents it references.
    pub fn build_dependency_counts(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = self.0.keys().map(|name| (name.clone(), 0)).collect();

        self.0
            .values()
            .flatten()
            .for_each(|dependent| *counts.entry(dependent.clone()).or_insert(0) += 1);

        counts
    }

    /// Compute a topological sort order using the provided dependency counts.
    /// Uses Kahn's algorithm, processing tables in the order their dependency count
    /// first reaches zero (a FIFO frontier, not a stack) so siblings are emitted in
    /// the order they become ready. Returns `None` if the graph has cycles.
    pub fn topological_sort_with_counts(
        &self,
        mut dependency_counts: HashMap<String, usize>,
    ) -> Option<Vec<String>> {
        let mut ready: VecDeque<String> = dependency_counts
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(table_name, _)| table_name.clone())
            .collect();

        let mut result = Vec::with_capacity(self.0.len());

        while let Some(table_name) = ready.pop_front() {
            result.push(table_name.clone());

            let Some(dependents) = self.0.get(&table_name) else {
                continue;
            };

            for dependent in dependents {
                let Some(count) = dependency_counts.get_mut(dependent) else {
                    continue;
                };
                *count -= 1;
                if *count == 0 {
                    ready.push_back(dependent.clone());
                }
            }
        }

        (result.len() == self.0.len()).then_some(result)
    }

    /// Compute a topological sort order of the tables in the graph.
    /// Uses Kahn's algorithm. Returns `None` if the graph has cycles.
    pub fn topological_sort(&self) -> Option<Vec<String>> {
        let dependency_counts = self.build_dependency_counts();
        self.topological_sort_with_counts(dependency_counts)
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, Vec<String>>> for DependencyGraph {
    fn from(graph: HashMap<String, Vec<String>>) -> Self {
        Self(graph)
    }
}

impl From<DependencyGraph> for HashMap<String, Vec<String>> {
    fn from(graph: DependencyGraph) -> Self {
        graph.0
    }
}

/// Parent table names referenced by a table's columns via `foreign_key('parent', pk)`
/// or `copy_from_fk(local_fk_col, 'parent')`.
pub(crate) fn parents_referenced_by(table: &TableSpec) -> Vec<String> {
    let mut parents = Vec::new();
    for column in &table.columns {
        for parent in [
            parse_call_arg(&column.data, "foreign_key(", 0),
            parse_call_arg(&column.data, "copy_from_fk(", 1),
        ]
        .into_iter()
        .flatten()
        {
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
    }
    parents
}

/// Extract argument `index` (0-based) from the first `fn_name(...)` call found in
/// `expr`, stripping surrounding quotes. Malformed references are silently ignored,
/// per the documented "do not contribute edges" behavior.
///
/// Shared with [`crate::synth`], which parses the same two call forms to resolve
/// `foreign_key`/`copy_from_fk` values at row-synthesis time.
pub(crate) fn parse_call_arg(expr: &str, fn_name: &str, index: usize) -> Option<String> {
    let idx = expr.find(fn_name)?;
    let after = &expr[idx + fn_name.len()..];
    let end = after.find(')')?;
    let args = &after[..end];
    let raw_arg = args.split(',').nth(index)?.trim();
    let unquoted = raw_arg
        .strip_prefix('\'')
        .or_else(|| raw_arg.strip_prefix('"'))?
        .strip_suffix('\'')
        .or_else(|| raw_arg.strip_suffix('"'))?;
    Some(unquoted.to_string())
}
