// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Top-level server lifecycle: owns the assembled fleet and reacts to OS signals by
//! driving a cooperative, timed-out shutdown of every streaming worker.

use crate::config::consts::WORKER_STOP_GRACE_SECS;
use crate::engine::sequencer::Fleet;
use crate::engine::worker::GeneratorWorker;
use crate::observability::messages::server::{ServerShuttingDown, ServerStarted, ServerStopped};
use crate::observability::messages::StructuredLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns a running fleet's join handles and drives graceful shutdown.
pub struct Server {
    fleet: Fleet,
    handles: Vec<(Arc<GeneratorWorker>, JoinHandle<()>)>,
}

impl Server {
    /// Spawn every streaming worker's cadence loop. Static and post-process tables
    /// were already handled synchronously by [`crate::engine::sequencer::assemble`].
    pub fn start(fleet: Fleet) -> Self {
        let handles = fleet
            .streaming_workers
            .iter()
            .map(|worker| (worker.clone(), worker.clone().spawn()))
            .collect();

        ServerStarted {
            streaming_worker_count: fleet.streaming_workers.len(),
            static_table_count: fleet.disabled_workers.len() + fleet.postprocess_workers.len(),
        }
        .log();

        Self { fleet, handles }
    }

    /// Block until an interrupt or terminate signal arrives, then stop the fleet.
    pub async fn run_until_signal(&mut self) {
        let signal_name = wait_for_shutdown_signal().await;
        ServerShuttingDown { signal: signal_name }.log();
        self.stop().await;
    }

    /// Idempotent: clears every worker's running flag and joins each task with a
    /// 5-second grace period. A worker that is mid-tick finishes that tick before it
    /// observes the cleared flag and exits.
    pub async fn stop(&mut self) {
        for worker in &self.fleet.streaming_workers {
            worker.stop();
        }

        let mut stopped = 0;
        let mut timed_out = 0;
        for (_, handle) in self.handles.drain(..) {
            match tokio::time::timeout(Duration::from_secs(WORKER_STOP_GRACE_SECS), handle).await {
                Ok(_) => stopped += 1,
                Err(_) => timed_out += 1,
            }
        }

        ServerStopped {
            workers_stopped: stopped,
            workers_timed_out: timed_out,
        }
        .log();
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}
