//! The default command: discover images, run both drivers, report timings.

use clap::{Args, ValueEnum};
use pixbench_core::{BatchReport, BatchRunner, BenchmarkReport, Config, FileDiscovery};
use std::path::PathBuf;

/// Arguments for the benchmark run. All optional; defaults come from config.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory to scan for .png/.jpg/.jpeg files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of parallel workers (default: available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Which drivers to run
    #[arg(long, value_enum, default_value = "both")]
    pub mode: Mode,

    /// Also write the timing report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Which batch drivers to run.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Mode {
    /// Sequential, then parallel (default)
    #[default]
    Both,
    /// Sequential only
    Sequential,
    /// Parallel only
    Parallel,
}

impl Mode {
    fn sequential(self) -> bool {
        matches!(self, Mode::Both | Mode::Sequential)
    }

    fn parallel(self) -> bool {
        matches!(self, Mode::Both | Mode::Parallel)
    }
}

/// Execute the benchmark.
pub fn execute(config: &Config, args: &RunArgs) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(input) = &args.input {
        config.input.dir = input.clone();
    }
    if let Some(workers) = args.workers {
        config.processing.parallel_workers = Some(workers);
    }
    config.validate()?;

    let Some(report) = run_benchmark(&config, args.mode)? else {
        return Ok(());
    };

    print!("{}", summary(&report));

    if let Some(path) = &args.report {
        report.write_json(path)?;
        tracing::info!("Report written to {:?}", path);
    }

    Ok(())
}

/// Discover inputs and run the selected drivers against the same file list.
///
/// Returns `None` without creating any output directory when the input
/// directory holds no images.
pub fn run_benchmark(config: &Config, mode: Mode) -> anyhow::Result<Option<BenchmarkReport>> {
    let input_dir = config.input_dir();
    let images = FileDiscovery::new(&config.input).discover(&input_dir)?;

    if images.is_empty() {
        println!(
            "No images found in the '{}' directory.",
            input_dir.display()
        );
        return Ok(None);
    }
    tracing::info!("Found {} image(s) to process", images.len());

    let runner = BatchRunner::new(config);

    let sequential = if mode.sequential() {
        println!("Starting monothread processing...");
        let report = runner.run_sequential(&images, &config.sequential_dir())?;
        print_timing(&report);
        Some(report)
    } else {
        None
    };

    let parallel = if mode.parallel() {
        println!("Starting multithread processing...");
        let report = runner.run_parallel(&images, &config.parallel_dir())?;
        print_timing(&report);
        Some(report)
    } else {
        None
    };

    Ok(Some(BenchmarkReport::new(sequential, parallel)))
}

fn print_timing(report: &BatchReport) {
    println!(
        "{}: Processed {} images in {:.2} seconds",
        report.mode,
        report.submitted,
        report.elapsed.as_secs_f64()
    );
}

/// Formatted comparison table shown after the runs.
fn summary(report: &BenchmarkReport) -> String {
    let rule = "  ====================================";
    let mut lines = vec![
        String::new(),
        rule.to_string(),
        "               Summary".to_string(),
        rule.to_string(),
    ];
    for run in [&report.sequential, &report.parallel].into_iter().flatten() {
        lines.push(format!("    {} ({} worker(s))", run.mode, run.workers));
        lines.push(format!("      Succeeded:  {:>8}", run.succeeded));
        if run.failed() > 0 {
            lines.push(format!("      Failed:     {:>8}", run.failed()));
        }
        lines.push(format!("      Duration:   {:>7.2}s", run.elapsed.as_secs_f64()));
        lines.push(format!("      Rate:       {:>7.1} img/sec", run.rate()));
    }
    if let Some(speedup) = report.speedup {
        lines.push("  ------------------------------------".to_string());
        lines.push(format!("    Speedup:      {:>7.2}x", speedup));
    }
    lines.push(rule.to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
