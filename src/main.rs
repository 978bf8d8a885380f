//! sortpool CLI - run JSON record batches through the worker pool.

use anyhow::{Context, Result};
use clap::Parser;
use sortpool::loader::load_records;
use sortpool::report::write_report;
use sortpool::{run_batch, Config};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sortpool")]
#[command(about = "Process record batches on a worker pool and write sorted reports", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Queue capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Minimum age for a record to be processed
    #[arg(long)]
    min_age: Option<i32>,

    /// Digest rounds per record
    #[arg(long)]
    rounds: Option<u64>,

    /// Directory for reports (defaults to each input's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Input JSON files, processed in order as separate batches
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(capacity) = self.capacity {
            config = config.with_queue_capacity(capacity);
        }
        if let Some(min_age) = self.min_age {
            config = config.with_min_age(min_age);
        }
        if let Some(rounds) = self.rounds {
            config = config.with_rounds(rounds);
        }
        config.validate()?;
        Ok(config)
    }

    fn report_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "batch".to_string());
        let name = format!("{stem}_results.txt");
        match &self.out_dir {
            Some(dir) => dir.join(name),
            None => input.with_file_name(name),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;
    info!(?config, batches = cli.inputs.len(), "starting");

    for (index, input) in cli.inputs.iter().enumerate() {
        let batch = index + 1;
        info!(batch, input = %input.display(), "started");

        let records = load_records(input)?;
        let outcome =
            run_batch(&records, &config).with_context(|| format!("batch {batch} failed"))?;

        let report = cli.report_path(input);
        write_report(&report, &records, &outcome.results)?;
        info!(batch, report = %report.display(), kept = outcome.results.len(), "finished");
    }
    Ok(())
}
