// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Table storage backend abstraction.
//!
//! The engine depends only on the [`TableStore`] trait: three operations mirroring
//! what a Delta Lake client would offer (open, write, read), so swapping the
//! reference [`FsTableStore`] implementation for a real `deltalake`-backed one is a
//! matter of providing a new `TableStore` impl with no engine changes.

mod fs_store;

pub use fs_store::FsTableStore;

use crate::cache::Row;
use crate::errors::AppendError;
use async_trait::async_trait;
use std::path::Path;

/// How a batch is written relative to a table's existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the table directory fresh, discarding anything already there.
    Overwrite,
    /// Add a new batch on top of whatever already exists.
    Append,
}

/// Storage backend for table directories.
///
/// Writes are atomic at the batch level: all rows of one [`TableStore::write`] call
/// land together or not at all.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Whether a table directory already exists and holds at least one row.
    async fn exists(&self, path: &Path) -> bool;

    /// Write a batch of rows to `path` under the given mode.
    async fn write(&self, path: &Path, rows: &[Row], mode: WriteMode) -> Result<(), AppendError>;

    /// Read every row currently stored at `path`, in append order.
    async fn read(&self, path: &Path) -> Result<Vec<Row>, std::io::Error>;

    /// Remove a table directory entirely, for a post-process `replace` reset.
    async fn remove(&self, path: &Path) -> Result<(), std::io::Error>;
}
