// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Filesystem-backed [`TableStore`](super::TableStore): each append lands as its own
//! newline-delimited JSON file inside the table's directory, made atomic by writing
//! to a temp file and renaming it into place. Reads concatenate every file in the
//! directory, in filename order, which is also append order since filenames are
//! monotonic nanosecond timestamps.

use crate::cache::Row;
use crate::errors::AppendError;
use crate::store::{TableStore, WriteMode};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
pub struct FsTableStore;

impl FsTableStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TableStore for FsTableStore {
    async fn exists(&self, path: &Path) -> bool {
        match tokio::fs::read_dir(path).await {
            Ok(mut entries) => entries.next_entry().await.ok().flatten().is_some(),
            Err(_) => false,
        }
    }

    async fn write(&self, path: &Path, rows: &[Row], mode: WriteMode) -> Result<(), AppendError> {
        let table_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let to_io_err = |source: std::io::Error| AppendError::Io {
            table: table_name.clone(),
            path: path.display().to_string(),
            source,
        };

        if mode == WriteMode::Overwrite && path.exists() {
            tokio::fs::remove_dir_all(path).await.map_err(to_io_err)?;
        }
        tokio::fs::create_dir_all(path).await.map_err(to_io_err)?;

        let mut body = String::new();
        for row in rows {
            body.push_str(&serde_json::to_string(row).map_err(|e| {
                to_io_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?);
            body.push('\n');
        }

        let final_path = batch_file_path(path);
        let tmp_path = final_path.with_extension("ndjson.tmp");
        tokio::fs::write(&tmp_path, body).await.map_err(to_io_err)?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(to_io_err)?;

        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<Row>, std::io::Error> {
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let p = entry.path();
            if p.extension().and_then(|e| e.to_str()) == Some("ndjson") {
                files.push(p);
            }
        }
        files.sort();

        let mut rows = Vec::new();
        for file in files {
            let content = tokio::fs::read_to_string(&file).await?;
            for line in content.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                let row: Row = serde_json::from_str(line)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                rows.push(row);
            }
        }

        Ok(rows)
    }

    async fn remove(&self, path: &Path) -> Result<(), std::io::Error> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn batch_file_path(table_dir: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    table_dir.join(format!("{nanos}.ndjson"))
}
