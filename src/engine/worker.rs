// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-table generator worker: owns one table's cadence loop, ticking at a fixed
//! interval to synthesize a batch, append it, and update the shared cache.

use crate::cache::ParentCache;
use crate::config::consts::TICK_INTERVAL_SECS;
use crate::config::{dependency_graph, TableSpec};
use crate::engine::barrier::{BarrierRole, CycleBarrier};
use crate::observability::messages::worker::{
    WorkerCacheWarmupFailed, WorkerStarted, WorkerStopped, WorkerTickCompleted, WorkerTickFailed,
};
use crate::observability::messages::StructuredLog;
use crate::store::{TableStore, WriteMode};
use crate::synth::RowSynthesizer;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Invoked by the elected leader right after the barrier releases a cycle.
#[async_trait]
pub trait PostProcessCallback: Send + Sync {
    async fn run_postprocess(&self);
}

/// Owns one table's cadence loop.
pub struct GeneratorWorker {
    spec: TableSpec,
    synthesizer: Arc<dyn RowSynthesizer>,
    store: Arc<dyn TableStore>,
    cache: Arc<Mutex<ParentCache>>,
    table_dir: PathBuf,
    tick_interval: Duration,
    rows_per_tick: AtomicU64,
    current_row_id: AtomicU64,
    running: AtomicBool,
    barrier: Option<Arc<CycleBarrier>>,
    postprocess: Option<Arc<dyn PostProcessCallback>>,
}

impl GeneratorWorker {
    pub fn new(
        spec: TableSpec,
        synthesizer: Arc<dyn RowSynthesizer>,
        store: Arc<dyn TableStore>,
        cache: Arc<Mutex<ParentCache>>,
        output_dir: &std::path::Path,
        barrier: Option<Arc<CycleBarrier>>,
        postprocess: Option<Arc<dyn PostProcessCallback>>,
    ) -> Self {
        let rows_per_tick = rows_per_tick_for(&spec);
        let current_row_id = spec.start_row_id;
        let table_dir = output_dir.join(&spec.table_name);

        Self {
            table_dir,
            tick_interval: Duration::from_secs(TICK_INTERVAL_SECS),
            rows_per_tick: AtomicU64::new(rows_per_tick),
            current_row_id: AtomicU64::new(current_row_id),
            running: AtomicBool::new(true),
            spec,
            synthesizer,
            store,
            cache,
            barrier,
            postprocess,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.spec.table_name
    }

    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    pub fn current_row_id(&self) -> u64 {
        self.current_row_id.load(Ordering::SeqCst)
    }

    pub fn reset_current_row_id(&self) {
        self.current_row_id
            .store(self.spec.start_row_id, Ordering::SeqCst);
    }

    pub fn rows_per_tick(&self) -> u64 {
        self.rows_per_tick.load(Ordering::SeqCst)
    }

    pub fn set_rows_per_tick(&self, value: u64) {
        self.rows_per_tick.store(value.max(1), Ordering::SeqCst);
    }

    /// Parent table names this table's columns reference, for readiness checks.
    pub fn parents(&self) -> Vec<String> {
        dependency_graph::parents_referenced_by(&self.spec)
    }

    /// Whether every parent this table references already has cached rows.
    pub async fn parents_ready(&self) -> bool {
        let cache = self.cache.lock().await;
        self.parents().iter().all(|p| cache.has_any_rows(p))
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Read this table's existing store directory back into the shared cache and
    /// resume `current_row_id` past whatever was already written. Failures are
    /// logged and the worker simply starts fresh.
    pub async fn load_existing_data(&self) {
        let rows = match self.store.read(&self.table_dir).await {
            Ok(rows) => rows,
            Err(error) => {
                WorkerCacheWarmupFailed {
                    table: &self.spec.table_name,
                    error: &error,
                }
                .log();
                return;
            }
        };

        if rows.is_empty() {
            return;
        }

        let pk_columns = self.spec.primary_key_columns();

        let max_existing_id = pk_columns
            .iter()
            .flat_map(|pk_column| rows.iter().filter_map(|row| row.get(*pk_column)))
            .filter_map(value_as_u64)
            .max();

        let mut cache = self.cache.lock().await;
        for pk_column in &pk_columns {
            cache.record_append(&self.spec.table_name, pk_column, &rows);
        }
        drop(cache);

        if let Some(max_id) = max_existing_id {
            self.current_row_id.store(max_id + 1, Ordering::SeqCst);
        }
    }

    /// Synthesize and append one batch at the current cursor, then advance it.
    /// Never returns an error to the caller — failures are logged and the cursor is
    /// left unchanged so the next tick retries the same range.
    pub async fn tick(&self) {
        let tick_started = Instant::now();
        let row_count = self.rows_per_tick.load(Ordering::SeqCst);
        let start_row_id = self.current_row_id.load(Ordering::SeqCst);

        let rows = {
            let cache = self.cache.lock().await;
            self.synthesizer
                .synthesize(&self.spec, start_row_id, row_count, &cache)
        };
        let rows = match rows {
            Ok(rows) => rows,
            Err(error) => {
                WorkerTickFailed {
                    table: &self.spec.table_name,
                    error: &error,
                }
                .log();
                return;
            }
        };

        let mode = if self.store.exists(&self.table_dir).await {
            WriteMode::Append
        } else {
            WriteMode::Overwrite
        };
        if let Err(error) = self.store.write(&self.table_dir, &rows, mode).await {
            WorkerTickFailed {
                table: &self.spec.table_name,
                error: &error,
            }
            .log();
            return;
        }

        let pk_columns = self.spec.primary_key_columns();
        if !pk_columns.is_empty() {
            let mut cache = self.cache.lock().await;
            for pk_column in &pk_columns {
                cache.record_append(&self.spec.table_name, pk_column, &rows);
            }
        }

        self.current_row_id.fetch_add(row_count, Ordering::SeqCst);

        WorkerTickCompleted {
            table: &self.spec.table_name,
            rows_written: rows.len(),
            current_row_id: self.current_row_id.load(Ordering::SeqCst),
            elapsed: tick_started.elapsed(),
        }
        .log();
    }

    /// The continuous cadence loop for a streaming (`append`) worker. Runs until
    /// [`GeneratorWorker::stop`] is called; the running flag is polled between ticks
    /// and again after the barrier wait, never mid-tick.
    pub async fn run_loop(self: Arc<Self>) {
        WorkerStarted {
            table: &self.spec.table_name,
            rows_per_tick: self.rows_per_tick.load(Ordering::SeqCst),
            start_row_id: self.current_row_id.load(Ordering::SeqCst),
        }
        .log();

        while self.running.load(Ordering::SeqCst) {
            let tick_started = Instant::now();
            self.tick().await;

            if let Some(barrier) = &self.barrier {
                if barrier.wait(&self.spec.table_name).await == BarrierRole::Leader {
                    if let Some(postprocess) = &self.postprocess {
                        postprocess.run_postprocess().await;
                    }
                }
            }

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let elapsed = tick_started.elapsed();
            let remaining = self.tick_interval.saturating_sub(elapsed);
            tokio::time::sleep(remaining).await;
        }

        WorkerStopped {
            table: &self.spec.table_name,
            final_row_id: self.current_row_id.load(Ordering::SeqCst),
        }
        .log();
    }

    /// Spawn the cadence loop as its own task.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run_loop())
    }
}

fn rows_per_tick_for(spec: &TableSpec) -> u64 {
    ((spec.cadence.rows_per_minute * TICK_INTERVAL_SECS) / 60).max(1)
}

fn value_as_u64(value: &serde_json::Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_str()?.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Row;
    use crate::config::{Cadence, ColumnSpec, PostprocessMode, RowCountSpec, UpdatePolicy};
    use crate::errors::{AppendError, SynthesisError};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn spec(name: &str, rows_per_minute: u64) -> TableSpec {
        TableSpec {
            table_name: name.to_string(),
            row_count: RowCountSpec::Fixed(10),
            start_row_id: 1,
            update_policy: UpdatePolicy::Append,
            postprocess_mode: PostprocessMode::Replace,
            cadence: Cadence {
                rows_per_minute,
                enabled: true,
            },
            columns: vec![ColumnSpec {
                column_name: "id".to_string(),
                column_type: "int".to_string(),
                data: "row_id".to_string(),
                is_primary_key: true,
                null_percentage: None,
            }],
        }
    }

    struct CountingSynthesizer {
        calls: AtomicUsize,
    }

    impl RowSynthesizer for CountingSynthesizer {
        fn synthesize(
            &self,
            _table: &TableSpec,
            start_row_id: u64,
            row_count: u64,
            _cache: &ParentCache,
        ) -> Result<Vec<Row>, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..row_count)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert("id".to_string(), json!(start_row_id + i));
                    row
                })
                .collect())
        }
    }

    struct FailingSynthesizer;
    impl RowSynthesizer for FailingSynthesizer {
        fn synthesize(
            &self,
            table: &TableSpec,
            _start_row_id: u64,
            _row_count: u64,
            _cache: &ParentCache,
        ) -> Result<Vec<Row>, SynthesisError> {
            Err(SynthesisError::UnresolvableParent {
                table: table.table_name.clone(),
                parent: "missing".to_string(),
            })
        }
    }

    struct InMemoryStore {
        rows: Mutex<Vec<Row>>,
    }

    #[async_trait]
    impl TableStore for InMemoryStore {
        async fn exists(&self, _path: &std::path::Path) -> bool {
            !self.rows.lock().await.is_empty()
        }

        async fn write(
            &self,
            _path: &std::path::Path,
            rows: &[Row],
            mode: WriteMode,
        ) -> Result<(), AppendError> {
            let mut guard = self.rows.lock().await;
            if mode == WriteMode::Overwrite {
                guard.clear();
            }
            guard.extend_from_slice(rows);
            Ok(())
        }

        async fn read(&self, _path: &std::path::Path) -> Result<Vec<Row>, std::io::Error> {
            Ok(self.rows.lock().await.clone())
        }

        async fn remove(&self, _path: &std::path::Path) -> Result<(), std::io::Error> {
            self.rows.lock().await.clear();
            Ok(())
        }
    }

    fn worker(rows_per_minute: u64) -> GeneratorWorker {
        GeneratorWorker::new(
            spec("customers", rows_per_minute),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
            Arc::new(InMemoryStore {
                rows: Mutex::new(Vec::new()),
            }),
            Arc::new(Mutex::new(ParentCache::new())),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        )
    }

    #[test]
    fn rows_per_tick_derived_from_cadence() {
        assert_eq!(rows_per_tick_for(&spec("t", 60)), 10);
        assert_eq!(rows_per_tick_for(&spec("t", 1)), 1);
    }

    #[tokio::test]
    async fn a_successful_tick_advances_the_row_cursor_and_cache() {
        let w = worker(60);
        assert_eq!(w.current_row_id(), 1);
        w.tick().await;
        assert_eq!(w.current_row_id(), 11);

        let cache = w.cache.lock().await;
        assert!(cache.has_any_rows("customers"));
    }

    #[tokio::test]
    async fn a_failed_tick_leaves_the_cursor_unchanged() {
        let w = GeneratorWorker::new(
            spec("customers", 60),
            Arc::new(FailingSynthesizer),
            Arc::new(InMemoryStore {
                rows: Mutex::new(Vec::new()),
            }),
            Arc::new(Mutex::new(ParentCache::new())),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        );
        w.tick().await;
        assert_eq!(w.current_row_id(), 1);
    }

    #[tokio::test]
    async fn reset_current_row_id_returns_to_start() {
        let w = worker(60);
        w.tick().await;
        assert_ne!(w.current_row_id(), 1);
        w.reset_current_row_id();
        assert_eq!(w.current_row_id(), 1);
    }

    #[tokio::test]
    async fn load_existing_data_resumes_past_the_max_pk() {
        let store = Arc::new(InMemoryStore {
            rows: Mutex::new(vec![{
                let mut r = Row::new();
                r.insert("id".to_string(), json!(41));
                r
            }]),
        });
        let w = GeneratorWorker::new(
            spec("customers", 60),
            Arc::new(CountingSynthesizer {
                calls: AtomicUsize::new(0),
            }),
            store,
            Arc::new(Mutex::new(ParentCache::new())),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        );
        w.load_existing_data().await;
        assert_eq!(w.current_row_id(), 42);
    }

    fn composite_pk_spec(name: &str) -> TableSpec {
        let mut spec = spec(name, 60);
        spec.columns = vec![
            ColumnSpec {
                column_name: "region_id".to_string(),
                column_type: "int".to_string(),
                data: "row_id".to_string(),
                is_primary_key: true,
                null_percentage: None,
            },
            ColumnSpec {
                column_name: "store_id".to_string(),
                column_type: "int".to_string(),
                data: "row_id".to_string(),
                is_primary_key: true,
                null_percentage: None,
            },
        ];
        spec
    }

    struct CompositeKeySynthesizer;
    impl RowSynthesizer for CompositeKeySynthesizer {
        fn synthesize(
            &self,
            _table: &TableSpec,
            start_row_id: u64,
            row_count: u64,
            _cache: &ParentCache,
        ) -> Result<Vec<Row>, SynthesisError> {
            Ok((0..row_count)
                .map(|i| {
                    let mut row = Row::new();
                    row.insert("region_id".to_string(), json!(start_row_id + i));
                    row.insert("store_id".to_string(), json!((start_row_id + i) * 100));
                    row
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn a_tick_records_every_declared_primary_key_column_in_the_cache() {
        let w = GeneratorWorker::new(
            composite_pk_spec("stores"),
            Arc::new(CompositeKeySynthesizer),
            Arc::new(InMemoryStore {
                rows: Mutex::new(Vec::new()),
            }),
            Arc::new(Mutex::new(ParentCache::new())),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        );
        w.tick().await;

        let cache = w.cache.lock().await;
        assert_eq!(cache.pk_values("stores", "region_id"), Some(&vec!["1".to_string()]));
        assert_eq!(cache.pk_values("stores", "store_id"), Some(&vec!["100".to_string()]));
    }

    #[tokio::test]
    async fn load_existing_data_resumes_past_the_max_of_any_declared_pk_column() {
        let store = Arc::new(InMemoryStore {
            rows: Mutex::new(vec![{
                let mut r = Row::new();
                r.insert("region_id".to_string(), json!(5));
                r.insert("store_id".to_string(), json!(99));
                r
            }]),
        });
        let w = GeneratorWorker::new(
            composite_pk_spec("stores"),
            Arc::new(CompositeKeySynthesizer),
            store,
            Arc::new(Mutex::new(ParentCache::new())),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        );
        w.load_existing_data().await;
        assert_eq!(w.current_row_id(), 100);

        let cache = w.cache.lock().await;
        assert_eq!(cache.pk_values("stores", "region_id"), Some(&vec!["5".to_string()]));
        assert_eq!(cache.pk_values("stores", "store_id"), Some(&vec!["99".to_string()]));
    }
}
