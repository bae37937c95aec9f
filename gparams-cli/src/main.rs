//! gparams: rebuild the game-parameters store from a snapshot file.
//!
//! Offline, run-to-completion batch transform. Reads the compressed,
//! byte-reversed snapshot, rebuilds one SQLite table per discovered entity
//! type and prints a per-partition summary. The first stage error aborts
//! the run with a message naming the failing stage; partitions already
//! committed before the failure remain in the store.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gparams_core::{RebuildConfig, RebuildReport};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gparams",
    version,
    about = "Rebuild the game-parameters store from a compressed snapshot"
)]
struct Cli {
    /// Path to the snapshot file (overrides the config file).
    snapshot: Option<PathBuf>,

    /// Path to the output SQLite database (overrides the config file).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Rebuild aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RebuildReport> {
    let mut config = match &cli.config {
        Some(path) => RebuildConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RebuildConfig::default(),
    };
    if let Some(snapshot) = &cli.snapshot {
        config.snapshot.path = snapshot.clone();
    }
    if let Some(database) = &cli.database {
        config.store.path = database.clone();
    }

    let report = gparams_core::rebuild(&config)
        .with_context(|| format!("rebuilding {}", config.store.path.display()))?;
    Ok(report)
}

fn print_report(report: &RebuildReport) {
    println!(
        "Rebuilt {} entities into {} partitions:",
        report.entities,
        report.partitions.len()
    );
    for (tag, rows) in &report.partitions {
        println!("  {tag}: {rows} rows");
    }
}
