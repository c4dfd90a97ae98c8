//! pixbench CLI - sequential vs. thread-parallel image pipeline benchmark.
//!
//! Every image in the input directory is converted to grayscale, halved,
//! blurred and edge-detected, once in order on a single thread and once on a
//! worker pool. Each stage is written to its own directory and both runs are
//! timed.
//!
//! # Usage
//!
//! ```bash
//! # Benchmark ./images into ./output_monothread and ./output_multithread
//! pixbench
//!
//! # Another input directory, eight workers, JSON report
//! pixbench --input ./photos --workers 8 --report bench.json
//!
//! # View configuration
//! pixbench config show
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// pixbench - Benchmark sequential vs. parallel throughput of a four-stage image pipeline.
#[derive(Parser, Debug)]
#[command(name = "pixbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    run: cli::run::RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands. Without one, the benchmark runs.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("pixbench v{}", pixbench_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args, cli.config.as_deref()),
        None => cli::run::execute(&config, &cli.run),
    }
}

/// An explicit `--config` must load; the default location falls back to
/// defaults with a warning.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<pixbench_core::Config> {
    if let Some(path) = explicit {
        return Ok(pixbench_core::Config::load_from(path)?);
    }
    Ok(match pixbench_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixbench config path`."
            );
            pixbench_core::Config::default()
        }
    })
}
