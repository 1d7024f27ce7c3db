// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_ROWS_PER_MINUTE, DEFAULT_START_ROW_ID};
use crate::errors::ConfigError;
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level streaming configuration, loaded from a single YAML file.
///
/// # Example
/// ```yaml
/// config:
///   seed: 42
/// tables:
///   - table_name: customers
///     row_count: 1000
///     columns:
///       - column_name: customer_id
///         type: int
///         data: "row_id"
///         is_primary_key: true
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub config: GlobalOptions,
    pub tables: Vec<TableSpec>,
}

/// Global, table-independent options.
#[derive(Debug, Default, Deserialize)]
pub struct GlobalOptions {
    /// Seed applied to the row synthesizer's RNG for reproducible runs.
    pub seed: Option<u64>,
}

/// Configuration for a single table in the DAG of streams.
///
/// # Fields
/// * `table_name` - unique identifier, also the output subdirectory name
/// * `row_count` - fixed count, or an expression such as `len(get_table('orders'))`
/// * `start_row_id` - first row id this table's cursor begins at (default 1)
/// * `update_policy` - `append` | `disabled` | `postprocess` (default `append`)
/// * `postprocess_mode` - `replace` | `append` (default `replace`, only meaningful for `postprocess`)
/// * `cadence` - target throughput
/// * `columns` - column definitions, some of which may embed `foreign_key`/`copy_from_fk`
#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub table_name: String,
    pub row_count: RowCountSpec,
    #[serde(default = "default_start_row_id")]
    pub start_row_id: u64,
    #[serde(default)]
    pub update_policy: UpdatePolicy,
    #[serde(default)]
    pub postprocess_mode: PostprocessMode,
    #[serde(default)]
    pub cadence: Cadence,
    pub columns: Vec<ColumnSpec>,
}

fn default_start_row_id() -> u64 {
    DEFAULT_START_ROW_ID
}

impl TableSpec {
    /// Column names flagged `is_primary_key: true`, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.column_name.as_str())
            .collect()
    }
}

/// `row_count` accepts either a literal integer or a narrow, known expression shape.
/// Anything else round-trips as `Dynamic` and falls back to
/// [`crate::config::consts::POSTPROCESS_FALLBACK_ROW_COUNT`] at evaluation time, matching
/// the original implementation's documented behavior for an unparseable expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCountSpec {
    Fixed(u64),
    /// `len(get_table('<table>'))` — the only dynamic shape the original config author
    /// actually relied on in practice.
    TableLen { table: String },
    /// Any other expression string; preserved for forward compatibility but never
    /// evaluated beyond the documented fallback.
    Dynamic(String),
}

impl<'de> Deserialize<'de> for RowCountSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => RowCountSpec::Fixed(n),
            Raw::Str(s) => match parse_table_len(&s) {
                Some(table) => RowCountSpec::TableLen { table },
                None => RowCountSpec::Dynamic(s),
            },
        })
    }
}

/// Recognize `len(get_table('name'))` / `len(get_table("name"))`, tolerating whitespace.
fn parse_table_len(expr: &str) -> Option<String> {
    let expr = expr.trim();
    let inner = expr.strip_prefix("len(")?.strip_suffix(")")?.trim();
    let args = inner.strip_prefix("get_table(")?.strip_suffix(")")?.trim();
    let unquoted = args
        .strip_prefix('\'')
        .or_else(|| args.strip_prefix('"'))?
        .strip_suffix('\'')
        .or_else(|| args.strip_suffix('"'))?;
    Some(unquoted.to_string())
}

/// How a table's rows are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Continuously streamed by a dedicated worker.
    Append,
    /// Synthesized exactly once at startup, never again.
    Disabled,
    /// Regenerated by the post-process executor after each cycle.
    Postprocess,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        UpdatePolicy::Append
    }
}

/// How a `postprocess` table is regenerated between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostprocessMode {
    /// Delete and recreate the table directory, resetting its cache entries and cursor.
    Replace,
    /// Append a freshly resolved batch on top of the existing table.
    Append,
}

impl Default for PostprocessMode {
    fn default() -> Self {
        PostprocessMode::Replace
    }
}

/// Target throughput for a streaming table.
#[derive(Debug, Clone, Deserialize)]
pub struct Cadence {
    #[serde(default = "default_rows_per_minute")]
    pub rows_per_minute: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_rows_per_minute() -> u64 {
    DEFAULT_ROWS_PER_MINUTE
}

fn default_true() -> bool {
    true
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            rows_per_minute: DEFAULT_ROWS_PER_MINUTE,
            enabled: true,
        }
    }
}

/// A single column in a [`TableSpec`].
///
/// `data` is an opaque expression string as far as the engine is concerned, except that
/// the dependency resolver scans it for `foreign_key(parent, parent_pk)` and
/// `copy_from_fk(local_fk_column, parent)` references (see
/// [`crate::config::dependency_graph`]).
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    pub column_name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub data: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub null_percentage: Option<f64>,
}

/// Load a config from a YAML file without validating it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path_ref = path.as_ref();
    let path_str = path_ref.display().to_string();

    if !path_ref.exists() {
        return Err(ConfigError::NotFound { path: path_str });
    }

    let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;

    let cfg: Config = serde_yaml::from_str(&content)?;

    if cfg.tables.is_empty() {
        return Err(ConfigError::NoTables);
    }

    Ok(cfg)
}

/// Load and validate a config from a YAML file.
///
/// Validation failures are logged as warnings rather than surfaced as errors here: the
/// startup sequencer falls back to config order when the dependency graph cannot be
/// linearized, per the documented recovery behavior. Only load-time errors (missing file,
/// malformed YAML, empty `tables`) are fatal.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path_display = path.as_ref().display().to_string();
    let cfg = load_config(path)?;

    if let Err(errors) = crate::config::validate_tables(&cfg) {
        for error in &errors {
            crate::observability::messages::config::ConfigValidationIssue {
                path: &path_display,
                error,
            }
            .log();
        }
    }

    crate::observability::messages::config::ConfigLoaded {
        path: &path_display,
        table_count: cfg.tables.len(),
    }
    .log();

    Ok(cfg)
}
