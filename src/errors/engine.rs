// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure producing rows for a single tick. Never propagated out of a worker's loop —
/// logged, and the next tick is attempted normally.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("table '{table}' references unresolvable parent '{parent}' (empty or missing cache)")]
    UnresolvableParent { table: String, parent: String },

    #[error("synthesis of table '{table}' failed: {message}")]
    Failed { table: String, message: String },
}

/// Failure appending a freshly synthesized batch to the table store. Never propagated out
/// of a worker's loop — logged, and `current_row_id` is not advanced for that tick.
#[derive(Debug, Error)]
pub enum AppendError {
    #[error("failed to write table '{table}' to '{path}': {source}")]
    Io {
        table: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}
