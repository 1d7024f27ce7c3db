// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Fixed interval between ticks for every streaming worker, in seconds.
pub const TICK_INTERVAL_SECS: u64 = 10;
/// Default cadence when a table omits `cadence.rows_per_minute`.
pub const DEFAULT_ROWS_PER_MINUTE: u64 = 60;
/// How long a follower waits at the cycle barrier before treating it as stuck.
pub const BARRIER_TIMEOUT_SECS: u64 = 60;
/// Grace period given to a worker task to finish its current tick on stop.
pub const WORKER_STOP_GRACE_SECS: u64 = 5;
/// Row count used for a postprocess table whose expression could not be evaluated.
pub const POSTPROCESS_FALLBACK_ROW_COUNT: u64 = 100;
/// Default `start_row_id` when a table omits it.
pub const DEFAULT_START_ROW_ID: u64 = 1;
