// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The running engine: per-table generator workers, the cycle barrier that
//! coordinates them, the post-process executor a cycle's leader invokes, the startup
//! sequencer that assembles them all from a [`crate::config::Config`], and the
//! top-level server lifecycle.

pub mod barrier;
pub mod postprocess;
pub mod sequencer;
pub mod server;
pub mod worker;

pub use barrier::{BarrierRole, CycleBarrier};
pub use postprocess::PostProcessExecutor;
pub use sequencer::{assemble, Fleet};
pub use server::Server;
pub use worker::GeneratorWorker;
