// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The reference [`RowSynthesizer`](super::RowSynthesizer): a small, seedable
//! generator good enough to produce realistic-looking rows without depending on an
//! external faker library. Columns are evaluated left to right so a `copy_from_fk`
//! column may reference a `foreign_key` column declared earlier in the same row.

use crate::cache::{ParentCache, Row};
use crate::config::dependency_graph::parse_call_arg;
use crate::config::{ColumnSpec, TableSpec};
use crate::errors::SynthesisError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::sync::Mutex;

use super::RowSynthesizer;

/// Seedable reference implementation of [`RowSynthesizer`].
///
/// The RNG is wrapped in a `Mutex` so a single instance can be shared across
/// concurrently ticking workers — generation itself is cheap and synchronous, so the
/// lock is held only for the duration of one batch.
pub struct ReferenceSynthesizer {
    rng: Mutex<SmallRng>,
}

impl ReferenceSynthesizer {
    /// Build a synthesizer seeded for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Build a synthesizer seeded from entropy, for runs with no configured seed.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_rng(&mut rand::rng())),
        }
    }
}

impl RowSynthesizer for ReferenceSynthesizer {
    fn synthesize(
        &self,
        table: &TableSpec,
        start_row_id: u64,
        row_count: u64,
        cache: &ParentCache,
    ) -> Result<Vec<Row>, SynthesisError> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut rows = Vec::with_capacity(row_count as usize);
        for offset in 0..row_count {
            let row_id = start_row_id + offset;
            let mut row = Row::new();
            for column in &table.columns {
                let value = synthesize_column(table, column, row_id, &row, cache, &mut rng)?;
                row.insert(column.column_name.clone(), value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

fn synthesize_column(
    table: &TableSpec,
    column: &ColumnSpec,
    row_id: u64,
    row_so_far: &Row,
    cache: &ParentCache,
    rng: &mut SmallRng,
) -> Result<Value, SynthesisError> {
    if let Some(pct) = column.null_percentage {
        if rng.random::<f64>() * 100.0 < pct {
            return Ok(Value::Null);
        }
    }

    let data = column.data.trim();

    if data == "row_id" {
        return Ok(Value::from(row_id));
    }

    if let Some(parent) = parse_call_arg(data, "foreign_key(", 0) {
        let parent_pk = parse_call_arg(data, "foreign_key(", 1).unwrap_or_default();
        return resolve_foreign_key(table, &parent, &parent_pk, cache, rng);
    }

    if let Some(parent) = parse_call_arg(data, "copy_from_fk(", 1) {
        let local_fk_col = parse_call_arg(data, "copy_from_fk(", 0).unwrap_or_default();
        return resolve_copy_from_fk(table, &local_fk_col, &parent, column, row_so_far, cache);
    }

    Ok(builtin_generator(column, row_id, rng))
}

fn resolve_foreign_key(
    table: &TableSpec,
    parent: &str,
    parent_pk: &str,
    cache: &ParentCache,
    rng: &mut SmallRng,
) -> Result<Value, SynthesisError> {
    let values = cache
        .pk_values(parent, parent_pk)
        .filter(|values| !values.is_empty())
        .ok_or_else(|| SynthesisError::UnresolvableParent {
            table: table.table_name.clone(),
            parent: parent.to_string(),
        })?;

    let index = rng.random_range(0..values.len());
    Ok(Value::String(values[index].clone()))
}

fn resolve_copy_from_fk(
    table: &TableSpec,
    local_fk_col: &str,
    parent: &str,
    column: &ColumnSpec,
    row_so_far: &Row,
    cache: &ParentCache,
) -> Result<Value, SynthesisError> {
    let fk_value =
        row_so_far
            .get(local_fk_col)
            .ok_or_else(|| SynthesisError::UnresolvableParent {
                table: table.table_name.clone(),
                parent: parent.to_string(),
            })?;

    let parent_row = cache
        .get_row(parent, fk_value)
        .ok_or_else(|| SynthesisError::UnresolvableParent {
            table: table.table_name.clone(),
            parent: parent.to_string(),
        })?;

    Ok(parent_row
        .get(&column.column_name)
        .cloned()
        .unwrap_or(Value::Null))
}

/// A handful of built-ins keyed by the column's declared `type`, for expressions that
/// are not `row_id`/`foreign_key`/`copy_from_fk`. Anything unrecognized falls back to
/// a stable placeholder string so downstream consumers always see a value.
fn builtin_generator(column: &ColumnSpec, row_id: u64, rng: &mut SmallRng) -> Value {
    match column.column_type.to_lowercase().as_str() {
        "int" | "integer" | "bigint" => Value::from(rng.random_range(0..1_000_000_i64)),
        "float" | "double" | "decimal" => {
            Value::from((rng.random::<f64>() * 10_000.0 * 100.0).round() / 100.0)
        }
        "bool" | "boolean" => Value::from(rng.random::<bool>()),
        "date" | "datetime" | "timestamp" => {
            Value::String(format!("2024-01-{:02}", 1 + (row_id % 28)))
        }
        _ => Value::String(format!("{}_{row_id}", column.column_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cadence, PostprocessMode, RowCountSpec, UpdatePolicy};
    use serde_json::json;

    fn table(name: &str, columns: Vec<ColumnSpec>) -> TableSpec {
        TableSpec {
            table_name: name.to_string(),
            row_count: RowCountSpec::Fixed(columns.len() as u64),
            start_row_id: 1,
            update_policy: UpdatePolicy::Append,
            postprocess_mode: PostprocessMode::Replace,
            cadence: Cadence::default(),
            columns,
        }
    }

    fn column(name: &str, column_type: &str, data: &str) -> ColumnSpec {
        ColumnSpec {
            column_name: name.to_string(),
            column_type: column_type.to_string(),
            data: data.to_string(),
            is_primary_key: false,
            null_percentage: None,
        }
    }

    #[test]
    fn row_id_column_equals_the_row_index() {
        let t = table("customers", vec![column("customer_id", "int", "row_id")]);
        let synth = ReferenceSynthesizer::seeded(1);
        let cache = ParentCache::new();

        let rows = synth.synthesize(&t, 5, 3, &cache).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("customer_id"), Some(&json!(5)));
        assert_eq!(rows[2].get("customer_id"), Some(&json!(7)));
    }

    #[test]
    fn foreign_key_draws_from_the_cached_parent_index() {
        let t = table(
            "orders",
            vec![column(
                "customer_id",
                "string",
                "foreign_key('customers', 'customer_id')",
            )],
        );
        let mut cache = ParentCache::new();
        let mut parent_row = Row::new();
        parent_row.insert("customer_id".to_string(), json!("42"));
        cache.record_append("customers", "customer_id", std::slice::from_ref(&parent_row));

        let synth = ReferenceSynthesizer::seeded(1);
        let rows = synth.synthesize(&t, 1, 2, &cache).unwrap();
        for row in &rows {
            assert_eq!(row.get("customer_id"), Some(&json!("42")));
        }
    }

    #[test]
    fn foreign_key_with_empty_parent_cache_errors() {
        let t = table(
            "orders",
            vec![column(
                "customer_id",
                "string",
                "foreign_key('customers', 'customer_id')",
            )],
        );
        let cache = ParentCache::new();
        let synth = ReferenceSynthesizer::seeded(1);

        let result = synth.synthesize(&t, 1, 1, &cache);
        assert!(matches!(
            result,
            Err(SynthesisError::UnresolvableParent { .. })
        ));
    }

    #[test]
    fn copy_from_fk_reads_a_same_named_field_off_the_cached_parent_row() {
        let t = table(
            "orders",
            vec![
                column(
                    "customer_id",
                    "string",
                    "foreign_key('customers', 'customer_id')",
                ),
                column("customer_name", "string", "copy_from_fk('customer_id', 'customers')"),
            ],
        );
        let mut cache = ParentCache::new();
        let mut parent_row = Row::new();
        parent_row.insert("customer_id".to_string(), json!("42"));
        parent_row.insert("customer_name".to_string(), json!("Ada Lovelace"));
        cache.record_append("customers", "customer_id", std::slice::from_ref(&parent_row));

        let synth = ReferenceSynthesizer::seeded(7);
        let rows = synth.synthesize(&t, 1, 5, &cache).unwrap();
        for row in &rows {
            assert_eq!(row.get("customer_id"), Some(&json!("42")));
            assert_eq!(row.get("customer_name"), Some(&json!("Ada Lovelace")));
        }
    }

    #[test]
    fn null_percentage_of_100_always_produces_null() {
        let mut col = column("maybe_missing", "string", "constant");
        col.null_percentage = Some(100.0);
        let t = table("t", vec![col]);
        let synth = ReferenceSynthesizer::seeded(3);
        let cache = ParentCache::new();

        let rows = synth.synthesize(&t, 1, 10, &cache).unwrap();
        assert!(rows.iter().all(|r| r.get("maybe_missing") == Some(&Value::Null)));
    }

    #[test]
    fn same_seed_produces_identical_output() {
        let t = table("t", vec![column("n", "int", "random")]);
        let cache = ParentCache::new();

        let a = ReferenceSynthesizer::seeded(99)
            .synthesize(&t, 1, 20, &cache)
            .unwrap();
        let b = ReferenceSynthesizer::seeded(99)
            .synthesize(&t, 1, 20, &cache)
            .unwrap();
        assert_eq!(a, b);
    }
}
