// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for startup sequencer events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A disabled (static) table was skipped at startup because a referenced parent has
/// no cached rows.
///
/// # Log Level
/// `warn!` - recoverable, but this table writes nothing for the remainder of the run
pub struct DisabledTableSkipped<'a> {
    pub table: &'a str,
}

impl Display for DisabledTableSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "disabled table '{}' skipped at startup: a referenced parent has no cached rows",
            self.table
        )
    }
}

impl StructuredLog for DisabledTableSkipped<'_> {
    fn log(&self) {
        tracing::warn!(table = self.table, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("disabled_table_skipped", span_name = name, table = self.table)
    }
}

/// The FK dependency graph could not be linearized at startup (a cycle slipped past
/// validation); the sequencer falls back to config-declaration order.
///
/// # Log Level
/// `warn!` - degraded but not fatal, per the documented fallback behavior
pub struct DependencyGraphUnlinearizable;

impl Display for DependencyGraphUnlinearizable {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "dependency graph could not be linearized at startup; falling back to declaration order"
        )
    }
}

impl StructuredLog for DependencyGraphUnlinearizable {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("dependency_graph_unlinearizable", span_name = name)
    }
}
