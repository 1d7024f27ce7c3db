// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A counting rendezvous for a fixed cohort of streaming workers.
//!
//! Every worker calls [`CycleBarrier::wait`] once per tick. The last arrival becomes
//! the cycle's leader (responsible for running post-process) and everyone else is a
//! follower. A follower that waits past the timeout treats the barrier as stuck and
//! resets it rather than blocking forever.

use crate::observability::messages::barrier::{BarrierCycleCompleted, BarrierWaitTimedOut};
use crate::observability::messages::StructuredLog;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

struct BarrierState {
    counter: usize,
    cycle: u64,
    generation: u64,
}

/// A rendezvous point shared by every streaming worker in a cycle.
pub struct CycleBarrier {
    expected: usize,
    timeout: Duration,
    state: Mutex<BarrierState>,
    notify: Notify,
}

/// Which role a worker played in the cycle it just completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierRole {
    /// This worker was the last to arrive and should run post-process.
    Leader,
    /// This worker arrived before the cohort completed, or the wait timed out.
    Follower,
}

impl CycleBarrier {
    /// Build a barrier sized to `expected` streaming workers, timing out waiters after
    /// 60 seconds (see [`crate::config::consts::BARRIER_TIMEOUT_SECS`]).
    pub fn new(expected: usize) -> Self {
        Self::with_timeout(
            expected,
            Duration::from_secs(crate::config::consts::BARRIER_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(expected: usize, timeout: Duration) -> Self {
        Self {
            expected: expected.max(1),
            timeout,
            state: Mutex::new(BarrierState {
                counter: 0,
                cycle: 0,
                generation: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Arrive at the barrier for this tick, identifying the calling table so the
    /// leader's election can be logged by name. Returns [`BarrierRole::Leader`] for
    /// the arrival that completes the cohort, [`BarrierRole::Follower`] for everyone
    /// else.
    pub async fn wait(&self, table: &str) -> BarrierRole {
        let mut guard = self.state.lock().await;
        guard.counter += 1;

        if guard.counter == self.expected {
            guard.cycle += 1;
            guard.counter = 0;
            guard.generation += 1;
            let completed_cycle = guard.cycle;
            drop(guard);

            self.notify.notify_waiters();
            BarrierCycleCompleted {
                cycle_number: completed_cycle,
                leader_table: table,
                expected: self.expected,
            }
            .log();
            return BarrierRole::Leader;
        }

        let observed_generation = guard.generation;
        // Register interest in the Notify *before* releasing the lock, to avoid
        // missing a notification broadcast between the unlock and the `notified()`
        // call below.
        let notified = self.notify.notified();
        drop(guard);

        match tokio::time::timeout(self.timeout, notified).await {
            Ok(()) => BarrierRole::Follower,
            Err(_) => {
                let mut guard = self.state.lock().await;
                if guard.generation == observed_generation {
                    let waiting = guard.counter;
                    BarrierWaitTimedOut {
                        timeout_secs: self.timeout.as_secs(),
                        waiting,
                        expected: self.expected,
                    }
                    .log();
                    guard.counter = 0;
                    guard.generation += 1;
                }
                BarrierRole::Follower
            }
        }
    }
}
