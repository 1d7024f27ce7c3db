// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Post-process executor: regenerates `postprocess`-policy tables in dependency
//! order, run by the cycle's elected leader between the barrier release and its own
//! next tick.

use crate::cache::ParentCache;
use crate::config::consts::POSTPROCESS_FALLBACK_ROW_COUNT;
use crate::config::{PostprocessMode, RowCountSpec};
use crate::engine::worker::{GeneratorWorker, PostProcessCallback};
use crate::observability::messages::postprocess::{
    PostProcessTableCompleted, PostProcessTableFailed, PostProcessTableSkipped, TableLenFallback,
};
use crate::observability::messages::StructuredLog;
use crate::store::TableStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs every `postprocess`-policy table, in dependency order, each cycle.
pub struct PostProcessExecutor {
    tables: Vec<Arc<GeneratorWorker>>,
    store: Arc<dyn TableStore>,
    cache: Arc<Mutex<ParentCache>>,
    output_dir: PathBuf,
}

impl PostProcessExecutor {
    pub fn new(
        tables: Vec<Arc<GeneratorWorker>>,
        store: Arc<dyn TableStore>,
        cache: Arc<Mutex<ParentCache>>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            tables,
            store,
            cache,
            output_dir,
        }
    }

    async fn run_one(&self, worker: &GeneratorWorker) {
        for parent in worker.parents() {
            let ready = self.cache.lock().await.has_any_rows(&parent);
            if !ready {
                PostProcessTableSkipped {
                    table: worker.table_name(),
                    parent: &parent,
                }
                .log();
                return;
            }
        }

        let mode = worker.spec().postprocess_mode;
        let table_dir = self.output_dir.join(worker.table_name());

        if mode == PostprocessMode::Replace {
            if let Err(error) = self.store.remove(&table_dir).await {
                PostProcessTableFailed {
                    table: worker.table_name(),
                    error: &error,
                }
                .log();
                return;
            }
            self.cache.lock().await.reset_table(worker.table_name());
            worker.reset_current_row_id();
        }

        let row_count = {
            let cache = self.cache.lock().await;
            resolve_row_count(worker, &cache)
        };

        let original_rows_per_tick = worker.rows_per_tick();
        worker.set_rows_per_tick(row_count);
        worker.tick().await;
        worker.set_rows_per_tick(original_rows_per_tick);

        if mode == PostprocessMode::Replace {
            worker.reset_current_row_id();
        }

        PostProcessTableCompleted {
            table: worker.table_name(),
            rows_written: row_count as usize,
            mode: mode_label(mode),
        }
        .log();
    }

    pub async fn run_all(&self) {
        for worker in &self.tables {
            self.run_one(worker).await;
        }
    }
}

#[async_trait]
impl PostProcessCallback for PostProcessExecutor {
    async fn run_postprocess(&self) {
        self.run_all().await;
    }
}

fn resolve_row_count(worker: &GeneratorWorker, cache: &ParentCache) -> u64 {
    match &worker.spec().row_count {
        RowCountSpec::Fixed(n) => *n,
        RowCountSpec::TableLen { table } => cache.table_len(table).map(|n| n as u64).unwrap_or_else(|| {
            TableLenFallback {
                table: worker.table_name(),
                referenced_table: table,
                fallback: POSTPROCESS_FALLBACK_ROW_COUNT,
            }
            .log();
            POSTPROCESS_FALLBACK_ROW_COUNT
        }),
        RowCountSpec::Dynamic(_) => POSTPROCESS_FALLBACK_ROW_COUNT,
    }
}

fn mode_label(mode: PostprocessMode) -> &'static str {
    match mode {
        PostprocessMode::Replace => "replace",
        PostprocessMode::Append => "append",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Row;
    use crate::config::{Cadence, ColumnSpec, TableSpec, UpdatePolicy};
    use crate::errors::{AppendError, SynthesisError};
    use crate::synth::RowSynthesizer;
    use serde_json::json;

    fn postprocess_spec(name: &str, mode: PostprocessMode, row_count: RowCountSpec) -> TableSpec {
        TableSpec {
            table_name: name.to_string(),
            row_count,
            start_row_id: 1,
            update_policy: UpdatePolicy::Postprocess,
            postprocess_mode: mode,
            cadence: Cadence::default(),
            columns: vec![ColumnSpec {
                column_name: "id".to_string(),
                column_type: "int".to_string(),
                data: "row_id".to_string(),
                is_primary_key: true,
                null_percentage: None,
            }],
        }
    }

    struct FixedSynthesizer;
    impl RowSynthesizer for FixedSynthesizer {
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
                    row.insert("id".to_string(), json!(start_row_id + i));
                    row
                })
                .collect())
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
            mode: crate::store::WriteMode,
        ) -> Result<(), AppendError> {
            let mut guard = self.rows.lock().await;
            if mode == crate::store::WriteMode::Overwrite {
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

    #[tokio::test]
    async fn replace_mode_resolves_table_len_against_the_cache() {
        let cache = Arc::new(Mutex::new(ParentCache::new()));
        {
            let mut c = cache.lock().await;
            let mut parent_row = Row::new();
            parent_row.insert("id".to_string(), json!(1));
            c.record_append("orders", "id", &[parent_row.clone(), parent_row.clone(), parent_row]);
        }

        let spec = postprocess_spec(
            "daily_summary",
            PostprocessMode::Replace,
            RowCountSpec::TableLen {
                table: "orders".to_string(),
            },
        );
        let store: Arc<dyn TableStore> = Arc::new(InMemoryStore {
            rows: Mutex::new(Vec::new()),
        });
        let worker = Arc::new(GeneratorWorker::new(
            spec,
            Arc::new(FixedSynthesizer),
            store.clone(),
            cache.clone(),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        ));

        let executor =
            PostProcessExecutor::new(vec![worker.clone()], store, cache, PathBuf::from("/tmp/tablestream-test"));
        executor.run_all().await;

        assert_eq!(worker.current_row_id(), worker.spec().start_row_id);
    }

    #[tokio::test]
    async fn a_table_with_a_missing_parent_is_skipped() {
        let cache = Arc::new(Mutex::new(ParentCache::new()));
        let mut spec = postprocess_spec(
            "child_summary",
            PostprocessMode::Replace,
            RowCountSpec::Fixed(5),
        );
        spec.columns.push(ColumnSpec {
            column_name: "parent_id".to_string(),
            column_type: "string".to_string(),
            data: "foreign_key('missing_parent', 'id')".to_string(),
            is_primary_key: false,
            null_percentage: None,
        });

        let store: Arc<dyn TableStore> = Arc::new(InMemoryStore {
            rows: Mutex::new(Vec::new()),
        });
        let worker = Arc::new(GeneratorWorker::new(
            spec,
            Arc::new(FixedSynthesizer),
            store.clone(),
            cache.clone(),
            std::path::Path::new("/tmp/tablestream-test"),
            None,
            None,
        ));

        let executor =
            PostProcessExecutor::new(vec![worker.clone()], store, cache, PathBuf::from("/tmp/tablestream-test"));
        executor.run_all().await;

        // Skipped: current_row_id never advances past start because tick() never runs.
        assert_eq!(worker.current_row_id(), worker.spec().start_row_id);
    }
}
