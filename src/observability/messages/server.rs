// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for top-level server lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The server finished startup and is now running streaming workers.
///
/// # Log Level
/// `info!` - important operational event
pub struct ServerStarted {
    pub streaming_worker_count: usize,
    pub static_table_count: usize,
}

impl Display for ServerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "server started: {} streaming workers, {} static tables",
            self.streaming_worker_count, self.static_table_count
        )
    }
}

impl StructuredLog for ServerStarted {
    fn log(&self) {
        tracing::info!(
            streaming_worker_count = self.streaming_worker_count,
            static_table_count = self.static_table_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "server_started",
            span_name = name,
            streaming_worker_count = self.streaming_worker_count,
        )
    }
}

/// A shutdown signal was received; stop is being requested on all workers.
///
/// # Log Level
/// `info!` - important operational event
pub struct ServerShuttingDown<'a> {
    pub signal: &'a str,
}

impl Display for ServerShuttingDown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "received {}, shutting down", self.signal)
    }
}

impl StructuredLog for ServerShuttingDown<'_> {
    fn log(&self) {
        tracing::info!(signal = self.signal, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("server_shutting_down", span_name = name, signal = self.signal)
    }
}

/// All workers stopped; the process is about to exit.
///
/// # Log Level
/// `info!` - important operational event
pub struct ServerStopped {
    pub workers_stopped: usize,
    pub workers_timed_out: usize,
}

impl Display for ServerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "server stopped: {} workers stopped, {} timed out waiting to join",
            self.workers_stopped, self.workers_timed_out
        )
    }
}

impl StructuredLog for ServerStopped {
    fn log(&self) {
        tracing::info!(
            workers_stopped = self.workers_stopped,
            workers_timed_out = self.workers_timed_out,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("server_stopped", span_name = name, workers_stopped = self.workers_stopped)
    }
}
