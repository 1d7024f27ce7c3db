// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-table generator worker lifecycle and tick events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A streaming worker started its loop.
///
/// # Log Level
/// `info!` - important operational event
pub struct WorkerStarted<'a> {
    pub table: &'a str,
    pub rows_per_tick: u64,
    pub start_row_id: u64,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "worker '{}' started: {} rows/tick starting at row {}",
            self.table, self.rows_per_tick, self.start_row_id
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            table = self.table,
            rows_per_tick = self.rows_per_tick,
            start_row_id = self.start_row_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            table = self.table,
            rows_per_tick = self.rows_per_tick,
        )
    }
}

/// A worker's tick completed successfully.
///
/// # Log Level
/// `info!` - routine operational event, kept at info to support cadence auditing
pub struct WorkerTickCompleted<'a> {
    pub table: &'a str,
    pub rows_written: usize,
    pub current_row_id: u64,
    pub elapsed: std::time::Duration,
}

impl Display for WorkerTickCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "worker '{}' wrote {} rows in {:?}, next row id {}",
            self.table, self.rows_written, self.elapsed, self.current_row_id
        )
    }
}

impl StructuredLog for WorkerTickCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            table = self.table,
            rows_written = self.rows_written,
            current_row_id = self.current_row_id,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_tick",
            span_name = name,
            table = self.table,
            rows_written = self.rows_written,
        )
    }
}

/// A worker's tick failed. Logged and swallowed; the loop continues.
///
/// # Log Level
/// `error!` - failure requiring attention, though not fatal
pub struct WorkerTickFailed<'a> {
    pub table: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerTickFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "worker '{}' tick failed: {}", self.table, self.error)
    }
}

impl StructuredLog for WorkerTickFailed<'_> {
    fn log(&self) {
        tracing::error!(table = self.table, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_tick_failed", span_name = name, table = self.table, error = %self.error)
    }
}

/// Cache warm-up from existing store data failed; worker starts fresh.
///
/// # Log Level
/// `warn!` - recoverable
pub struct WorkerCacheWarmupFailed<'a> {
    pub table: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerCacheWarmupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "worker '{}' cache warm-up failed, starting fresh: {}", self.table, self.error)
    }
}

impl StructuredLog for WorkerCacheWarmupFailed<'_> {
    fn log(&self) {
        tracing::warn!(table = self.table, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("worker_cache_warmup_failed", span_name = name, table = self.table, error = %self.error)
    }
}

/// A worker stopped cleanly.
///
/// # Log Level
/// `info!` - important operational event
pub struct WorkerStopped<'a> {
    pub table: &'a str,
    pub final_row_id: u64,
}

impl Display for WorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "worker '{}' stopped at row id {}", self.table, self.final_row_id)
    }
}

impl StructuredLog for WorkerStopped<'_> {
    fn log(&self) {
        tracing::info!(table = self.table, final_row_id = self.final_row_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_stopped", span_name = name, table = self.table)
    }
}
