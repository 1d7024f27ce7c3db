// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use tablestream::config::load_and_validate_config;
use tablestream::engine::{assemble, Server};
use tablestream::store::FsTableStore;
use tablestream::synth::{ReferenceSynthesizer, RowSynthesizer};

const DEFAULT_OUTPUT_DIR: &str = "./delta_tables";

struct Args {
    config: PathBuf,
    output: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    let mut raw = std::env::args().skip(1);
    while let Some(flag) = raw.next() {
        match flag.as_str() {
            "--config" => {
                let value = raw.next().context("--config requires a path argument")?;
                config = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = raw.next().context("--output requires a path argument")?;
                output = Some(PathBuf::from(value));
            }
            other => bail!("unrecognized argument: {other}"),
        }
    }

    Ok(Args {
        config: config.context("--config <path> is required")?,
        output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
    })
}

async fn run() -> anyhow::Result<()> {
    let args = parse_args().context("usage: tablestream --config <path> [--output <dir>]")?;

    let config = load_and_validate_config(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    let synthesizer: Arc<dyn RowSynthesizer> = match config.config.seed {
        Some(seed) => Arc::new(ReferenceSynthesizer::seeded(seed)),
        None => Arc::new(ReferenceSynthesizer::from_entropy()),
    };

    let store = Arc::new(FsTableStore::new());

    let fleet = assemble(&config, synthesizer, store, args.output).await;
    let mut server = Server::start(fleet);
    server.run_until_signal().await;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
