// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for cycle barrier election and timeout events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A full cycle completed; the named worker was elected leader.
///
/// # Log Level
/// `info!` - important operational event
pub struct BarrierCycleCompleted<'a> {
    pub cycle_number: u64,
    pub leader_table: &'a str,
    pub expected: usize,
}

impl Display for BarrierCycleCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "cycle {} completed: '{}' elected leader of {} workers",
            self.cycle_number, self.leader_table, self.expected
        )
    }
}

impl StructuredLog for BarrierCycleCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            cycle_number = self.cycle_number,
            leader_table = self.leader_table,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "barrier_cycle",
            span_name = name,
            cycle_number = self.cycle_number,
            leader_table = self.leader_table,
        )
    }
}

/// A follower's wait timed out; the barrier has reset itself and the cycle is degraded.
///
/// # Log Level
/// `warn!` - recoverable, the next cycle self-heals
pub struct BarrierWaitTimedOut {
    pub timeout_secs: u64,
    pub waiting: usize,
    pub expected: usize,
}

impl Display for BarrierWaitTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "barrier wait timed out after {}s with {} of {} workers arrived; resetting",
            self.timeout_secs, self.waiting, self.expected
        )
    }
}

impl StructuredLog for BarrierWaitTimedOut {
    fn log(&self) {
        tracing::warn!(
            timeout_secs = self.timeout_secs,
            waiting = self.waiting,
            expected = self.expected,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "barrier_wait_timed_out",
            span_name = name,
            waiting = self.waiting,
            expected = self.expected,
        )
    }
}
