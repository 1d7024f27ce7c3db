// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Row synthesis backend abstraction.
//!
//! The engine depends only on the [`RowSynthesizer`] trait: given a table's spec and
//! a row range to fill, produce that many rows, consulting the shared
//! [`ParentCache`] to resolve `foreign_key`/`copy_from_fk` references. Synthesis is
//! treated as CPU-bound and synchronous — workers call it directly rather than via
//! `spawn_blocking`, per the concurrency model.

mod reference;

pub use reference::ReferenceSynthesizer;

use crate::cache::{ParentCache, Row};
use crate::config::TableSpec;
use crate::errors::SynthesisError;

/// Produces batches of fabricated rows for a single table.
pub trait RowSynthesizer: Send + Sync {
    /// Synthesize `row_count` rows for `table`, starting at `start_row_id`.
    ///
    /// Implementations must resolve any `foreign_key`/`copy_from_fk` column against
    /// `cache` and return [`SynthesisError::UnresolvableParent`] if a referenced
    /// parent has no cached rows yet, rather than fabricating an invalid reference.
    fn synthesize(
        &self,
        table: &TableSpec,
        start_row_id: u64,
        row_count: u64,
        cache: &ParentCache,
    ) -> Result<Vec<Row>, SynthesisError>;
}
