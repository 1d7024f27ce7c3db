// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging and distributed tracing.
//!
//! Each message type implements:
//!
//! * `Display` - Human-readable output (supports future i18n)
//! * `StructuredLog` - Machine-readable fields + span creation
//!
//! # Organization
//!
//! * `config` - configuration loading and validation events
//! * `worker` - per-table generator worker lifecycle and tick events
//! * `barrier` - cycle barrier election and timeout events
//! * `sequencer` - startup sequencer fallback/skip events
//! * `postprocess` - post-process executor events
//! * `server` - top-level server lifecycle events
//!
//! # Usage
//!
//! ```rust
//! use tablestream::observability::messages::worker::WorkerTickFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
//! let msg = WorkerTickFailed {
//!     table: "orders",
//!     error: &error,
//! };
//!
//! msg.log();
//! # use tablestream::observability::messages::StructuredLog;
//! ```

pub mod barrier;
pub mod config;
pub mod postprocess;
pub mod sequencer;
pub mod server;
pub mod worker;

use tracing::Span;

/// Trait for messages that support structured logging and distributed tracing.
///
/// Centralizes the "human message + machine fields + span" triple so log call
/// sites never build ad hoc strings; new event types just implement `Display`
/// and this trait.
pub trait StructuredLog {
    /// Emit a log event: human-readable message (via `Display`) plus structured fields.
    fn log(&self);

    /// Create a span with this message's fields as attributes.
    fn span(&self, name: &str) -> Span;
}
