// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Startup sequencer: brings a whole configuration up from cold storage to a running
//! fleet of streaming workers in the order §4.3 describes — warm-up, static tables,
//! barrier construction, seed ticks, then the continuous loops.

use crate::cache::ParentCache;
use crate::config::{Config, DependencyGraph, TableSpec, UpdatePolicy};
use crate::engine::barrier::CycleBarrier;
use crate::engine::postprocess::PostProcessExecutor;
use crate::engine::worker::{GeneratorWorker, PostProcessCallback};
use crate::observability::messages::sequencer::{DependencyGraphUnlinearizable, DisabledTableSkipped};
use crate::observability::messages::StructuredLog;
use crate::store::TableStore;
use crate::synth::RowSynthesizer;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the server needs to run and later stop a fleet of workers.
pub struct Fleet {
    pub streaming_workers: Vec<Arc<GeneratorWorker>>,
    pub postprocess_workers: Vec<Arc<GeneratorWorker>>,
    pub disabled_workers: Vec<Arc<GeneratorWorker>>,
    pub cache: Arc<Mutex<ParentCache>>,
}

/// Build every [`GeneratorWorker`] for `config`, warm them from existing storage, run
/// static (`disabled`) tables once, seed orphan streaming tables, and return the
/// assembled fleet ready for [`crate::engine::server::Server::start`].
pub async fn assemble(
    config: &Config,
    synthesizer: Arc<dyn RowSynthesizer>,
    store: Arc<dyn TableStore>,
    output_dir: PathBuf,
) -> Fleet {
    let cache = Arc::new(Mutex::new(ParentCache::new()));
    let ordered = topological_order(config);

    let postprocess_specs: Vec<&TableSpec> = ordered
        .iter()
        .filter(|t| t.update_policy == UpdatePolicy::Postprocess)
        .collect();

    let postprocess_workers: Vec<Arc<GeneratorWorker>> = postprocess_specs
        .iter()
        .map(|spec| {
            Arc::new(GeneratorWorker::new(
                (**spec).clone(),
                synthesizer.clone(),
                store.clone(),
                cache.clone(),
                &output_dir,
                None,
                None,
            ))
        })
        .collect();

    let postprocess_executor: Arc<dyn PostProcessCallback> = Arc::new(PostProcessExecutor::new(
        postprocess_workers.clone(),
        store.clone(),
        cache.clone(),
        output_dir.clone(),
    ));

    let streaming_count = ordered.iter().filter(|t| is_streaming(t)).count();
    let barrier = (streaming_count > 0).then(|| Arc::new(CycleBarrier::new(streaming_count)));

    let mut streaming_workers = Vec::new();
    let mut disabled_workers = Vec::new();

    for spec in &ordered {
        match spec.update_policy {
            UpdatePolicy::Postprocess => continue, // already built above
            UpdatePolicy::Disabled => {
                disabled_workers.push(Arc::new(GeneratorWorker::new(
                    spec.clone(),
                    synthesizer.clone(),
                    store.clone(),
                    cache.clone(),
                    &output_dir,
                    None,
                    None,
                )));
            }
            UpdatePolicy::Append if spec.cadence.enabled => {
                streaming_workers.push(Arc::new(GeneratorWorker::new(
                    spec.clone(),
                    synthesizer.clone(),
                    store.clone(),
                    cache.clone(),
                    &output_dir,
                    barrier.clone(),
                    Some(postprocess_executor.clone()),
                )));
            }
            UpdatePolicy::Append => {
                // Append policy with cadence disabled: no loop ever runs for it.
            }
        }
    }

    for worker in postprocess_workers
        .iter()
        .chain(disabled_workers.iter())
        .chain(streaming_workers.iter())
    {
        worker.load_existing_data().await;
    }

    for worker in &disabled_workers {
        if !worker.parents_ready().await {
            DisabledTableSkipped {
                table: worker.table_name(),
            }
            .log();
            continue;
        }
        let original = worker.rows_per_tick();
        worker.set_rows_per_tick(resolve_fixed_row_count(worker, &cache).await);
        worker.tick().await;
        worker.set_rows_per_tick(original);
    }

    for worker in &streaming_workers {
        let has_parents = !worker.parents().is_empty();
        let cache_empty = {
            let cache = cache.lock().await;
            !cache.has_any_rows(worker.table_name())
        };
        if !has_parents && cache_empty {
            worker.tick().await;
        }
    }

    Fleet {
        streaming_workers,
        postprocess_workers,
        disabled_workers,
        cache,
    }
}

async fn resolve_fixed_row_count(worker: &GeneratorWorker, cache: &Arc<Mutex<ParentCache>>) -> u64 {
    use crate::config::RowCountSpec;
    match &worker.spec().row_count {
        RowCountSpec::Fixed(n) => *n,
        RowCountSpec::TableLen { table } => cache
            .lock()
            .await
            .table_len(table)
            .map(|n| n as u64)
            .unwrap_or(crate::config::consts::POSTPROCESS_FALLBACK_ROW_COUNT),
        RowCountSpec::Dynamic(_) => crate::config::consts::POSTPROCESS_FALLBACK_ROW_COUNT,
    }
}

fn is_streaming(spec: &TableSpec) -> bool {
    spec.update_policy == UpdatePolicy::Append && spec.cadence.enabled
}

/// Tables in dependency order, falling back to declaration order with a warning if
/// the graph cannot be linearized (a cycle slipped past validation).
fn topological_order(config: &Config) -> Vec<TableSpec> {
    let graph = DependencyGraph::from_tables(&config.tables);
    let by_name: HashMap<&str, &TableSpec> = config
        .tables
        .iter()
        .map(|t| (t.table_name.as_str(), t))
        .collect();

    match graph.topological_sort() {
        Some(order) => order
            .iter()
            .filter_map(|name| by_name.get(name.as_str()))
            .map(|spec| (**spec).clone())
            .collect(),
        None => {
            DependencyGraphUnlinearizable.log();
            config.tables.to_vec()
        }
    }
}
