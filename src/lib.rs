// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cache;        // shared parent-row cache
pub mod config;       // config loading, validation, dependency graph
pub mod engine;       // workers, barrier, sequencer, post-process, server
pub mod errors;       // error handling
pub mod observability; // structured log messages
pub mod store;        // table storage backends
pub mod synth;         // row synthesis
