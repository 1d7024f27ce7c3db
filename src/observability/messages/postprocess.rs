// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for post-process executor events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A post-process table was skipped because a referenced parent has no cached rows yet.
///
/// # Log Level
/// `warn!` - recoverable, the next cycle may have a populated parent
pub struct PostProcessTableSkipped<'a> {
    pub table: &'a str,
    pub parent: &'a str,
}

impl Display for PostProcessTableSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "postprocess table '{}' skipped: parent '{}' has no cached rows",
            self.table, self.parent
        )
    }
}

impl StructuredLog for PostProcessTableSkipped<'_> {
    fn log(&self) {
        tracing::warn!(table = self.table, parent = self.parent, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("postprocess_table_skipped", span_name = name, table = self.table, parent = self.parent)
    }
}

/// A post-process table finished regenerating for this cycle.
///
/// # Log Level
/// `info!` - important operational event
pub struct PostProcessTableCompleted<'a> {
    pub table: &'a str,
    pub rows_written: usize,
    pub mode: &'a str,
}

impl Display for PostProcessTableCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "postprocess table '{}' ({} mode) wrote {} rows",
            self.table, self.mode, self.rows_written
        )
    }
}

impl StructuredLog for PostProcessTableCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            table = self.table,
            rows_written = self.rows_written,
            mode = self.mode,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("postprocess_table_completed", span_name = name, table = self.table)
    }
}

/// A post-process table failed; the next table in dependency order still runs.
///
/// # Log Level
/// `error!` - failure requiring attention, though isolated
pub struct PostProcessTableFailed<'a> {
    pub table: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PostProcessTableFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "postprocess table '{}' failed: {}", self.table, self.error)
    }
}

impl StructuredLog for PostProcessTableFailed<'_> {
    fn log(&self) {
        tracing::error!(table = self.table, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("postprocess_table_failed", span_name = name, table = self.table, error = %self.error)
    }
}

/// A `row_count: len(get_table(...))` expression referenced a table with no cached
/// rows; the fixed fallback count was used instead.
///
/// # Log Level
/// `warn!` - recoverable, the table still regenerates with a usable row count
pub struct TableLenFallback<'a> {
    pub table: &'a str,
    pub referenced_table: &'a str,
    pub fallback: u64,
}

impl Display for TableLenFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "postprocess table '{}' row_count references unknown table '{}', falling back to {} rows",
            self.table, self.referenced_table, self.fallback
        )
    }
}

impl StructuredLog for TableLenFallback<'_> {
    fn log(&self) {
        tracing::warn!(
            table = self.table,
            referenced_table = self.referenced_table,
            fallback = self.fallback,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "table_len_fallback",
            span_name = name,
            table = self.table,
            referenced_table = self.referenced_table,
            fallback = self.fallback
        )
    }
}
