// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the engine. Message types follow a struct-based pattern with
//! `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Enable future internationalization without code changes
//! * Maintain Single Responsibility Principle (SRP)
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::config` - configuration loading and validation events
//! * `messages::worker` - per-table generator worker lifecycle and tick events
//! * `messages::barrier` - cycle barrier election and timeout events
//! * `messages::sequencer` - startup sequencer fallback/skip events
//! * `messages::postprocess` - post-process executor events
//! * `messages::server` - top-level server lifecycle events
//!
//! # Usage
//!
//! ```rust
//! use tablestream::observability::messages::worker::WorkerStarted;
//! use tablestream::observability::messages::StructuredLog;
//!
//! WorkerStarted {
//!     table: "orders",
//!     rows_per_tick: 10,
//!     start_row_id: 1,
//! }.log();
//! ```

pub mod messages;
