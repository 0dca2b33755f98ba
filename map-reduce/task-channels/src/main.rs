// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::Context;
use clap::Parser;
use map_reduce_core::config::Config;
use map_reduce_task_channels::{TokenShutdownSignal, WordScorePipeline};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tokio::{signal, spawn};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Rank the words of star-rated reviews by how strongly they lean positive
/// or negative
#[derive(Parser, Debug)]
#[command(name = "word-score", version, about)]
struct Cli {
    /// Review file, or directory of review files, one JSON object per line
    input: PathBuf,

    /// Directory to create for the ranking; must not exist yet
    output: PathBuf,

    /// JSON configuration file; unset fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep the word scores between the stages in this directory
    #[arg(long)]
    intermediate_dir: Option<PathBuf>,
}

const EXIT_FAILURE: u8 = 1;
const EXIT_BAD_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(EXIT_BAD_CONFIG);
        }
    };
    if let Some(dir) = cli.intermediate_dir {
        config.intermediate_dir = Some(dir);
    }
    config.log_summary();

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling");
            ctrl_c_token.cancel();
        }
    });

    let start_time = Instant::now();
    let mut pipeline = WordScorePipeline::new(config, TokenShutdownSignal::new(cancel_token));
    match pipeline.run(&cli.input, &cli.output).await {
        Ok(summary) => {
            info!(
                words = summary.words,
                output = %summary.output_file.display(),
                elapsed_s = start_time.elapsed().as_secs_f64(),
                "ranking written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(state = %pipeline.state(), "run failed: {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("invalid configuration {}", path.display())),
        None => Ok(Config::default()),
    }
}
