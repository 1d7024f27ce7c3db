// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-wide cache of already-written parent rows, the mechanism that gives
//! streaming tables referential integrity without a real database underneath them.
//!
//! A table only needs an entry here if some other table references it via
//! `foreign_key`/`copy_from_fk`. Workers for non-referenced tables never touch the
//! cache beyond warm-up bookkeeping.

use serde_json::Value;
use std::collections::HashMap;

/// A single synthesized row, keyed by column name. JSON-object shaped so it can be
/// serialized directly by the table store.
pub type Row = serde_json::Map<String, Value>;

/// Process-wide index of already-written rows, keyed by table and primary key.
///
/// Two coupled maps, as described in the component design: an ordered primary-key
/// index per `(table, pk_column)`, used by the synthesizer to pick an existing FK
/// value, and a full-row map per `(table, pk_value)`, used to resolve
/// `copy_from_fk`. Both maps are updated together by [`ParentCache::record_append`]
/// and cleared together by [`ParentCache::reset_table`].
#[derive(Debug, Default)]
pub struct ParentCache {
    pk_index: HashMap<String, HashMap<String, Vec<String>>>,
    rows: HashMap<String, HashMap<String, Row>>,
}

impl ParentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch of freshly appended rows for `table`.
    ///
    /// For every row, the value of `pk_column` is pushed onto the ordered PK index in
    /// append order, and the full row is stored keyed by that same value. Rows
    /// missing `pk_column` are skipped — a misconfigured table should not poison the
    /// cache for every other table.
    pub fn record_append(&mut self, table: &str, pk_column: &str, rows: &[Row]) {
        for row in rows {
            let Some(pk_value) = row.get(pk_column) else {
                continue;
            };
            let pk_key = stringify(pk_value);

            self.pk_index
                .entry(table.to_string())
                .or_default()
                .entry(pk_column.to_string())
                .or_default()
                .push(pk_key.clone());

            self.rows
                .entry(table.to_string())
                .or_default()
                .insert(pk_key, row.clone());
        }
    }

    /// The ordered list of primary-key values ever written for `(table, pk_column)`,
    /// or `None` if nothing has been recorded yet.
    pub fn pk_values(&self, table: &str, pk_column: &str) -> Option<&Vec<String>> {
        self.pk_index.get(table)?.get(pk_column)
    }

    /// Whether `table` has at least one recorded row under any primary-key column.
    /// Used to decide whether a child worker may safely resolve a `foreign_key` to
    /// this table.
    pub fn has_any_rows(&self, table: &str) -> bool {
        self.pk_index
            .get(table)
            .is_some_and(|cols| cols.values().any(|values| !values.is_empty()))
    }

    /// The full row cached for `(table, pk_value)`, used to resolve `copy_from_fk`.
    pub fn get_row(&self, table: &str, pk_value: &Value) -> Option<&Row> {
        self.rows.get(table)?.get(&stringify(pk_value))
    }

    /// Number of distinct rows cached for `table`, under the first primary-key
    /// column recorded for it. This is what `len(get_table('table'))` resolves to
    /// when evaluating a [`crate::config::RowCountSpec::TableLen`] expression.
    pub fn table_len(&self, table: &str) -> Option<usize> {
        self.pk_index
            .get(table)
            .and_then(|cols| cols.values().next())
            .map(|values| values.len())
    }

    /// Remove every cached entry for `table`, for a post-process `replace` reset.
    pub fn reset_table(&mut self, table: &str) {
        self.pk_index.remove(table);
        self.rows.remove(table);
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, name: &str) -> Row {
        let mut r = Row::new();
        r.insert("id".to_string(), json!(id));
        r.insert("name".to_string(), json!(name));
        r
    }

    #[test]
    fn record_append_populates_both_maps_in_order() {
        let mut cache = ParentCache::new();
        cache.record_append("customers", "id", &[row(1, "alice"), row(2, "bob")]);

        assert_eq!(
            cache.pk_values("customers", "id"),
            Some(&vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(
            cache.get_row("customers", &json!(1)).unwrap().get("name"),
            Some(&json!("alice"))
        );
        assert!(cache.has_any_rows("customers"));
        assert_eq!(cache.table_len("customers"), Some(2));
    }

    #[test]
    fn missing_table_has_no_rows() {
        let cache = ParentCache::new();
        assert!(!cache.has_any_rows("customers"));
        assert_eq!(cache.pk_values("customers", "id"), None);
        assert_eq!(cache.table_len("customers"), None);
    }

    #[test]
    fn rows_missing_the_pk_column_are_skipped() {
        let mut cache = ParentCache::new();
        let mut malformed = Row::new();
        malformed.insert("name".to_string(), json!("no id here"));
        cache.record_append("customers", "id", &[malformed]);

        assert!(!cache.has_any_rows("customers"));
    }

    #[test]
    fn reset_table_clears_both_maps() {
        let mut cache = ParentCache::new();
        cache.record_append("customers", "id", &[row(1, "alice")]);
        cache.reset_table("customers");

        assert!(!cache.has_any_rows("customers"));
        assert_eq!(cache.get_row("customers", &json!(1)), None);
    }

    #[test]
    fn append_order_is_preserved_across_batches() {
        let mut cache = ParentCache::new();
        cache.record_append("customers", "id", &[row(1, "a")]);
        cache.record_append("customers", "id", &[row(2, "b"), row(3, "c")]);

        assert_eq!(
            cache.pk_values("customers", "id"),
            Some(&vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
    }
}
