//! pixbench core - sequential vs. parallel image pipeline benchmark.
//!
//! Every input image goes through the same fixed chain and each stage is
//! written as a JPEG into its own directory:
//!
//! ```text
//! Image → Decode → Grayscale → Half size → 5x5 Gaussian blur → Canny
//!                     │            │              │               │
//!                   gray/       resized/       blurred/         edges/
//! ```
//!
//! The chain is run once per image either in order on the calling thread or as
//! independent units of work on a `rayon` pool, and each run is timed.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pixbench_core::{BatchRunner, Config, FileDiscovery};
//!
//! fn main() -> pixbench_core::Result<()> {
//!     let config = Config::load()?;
//!     let images = FileDiscovery::new(&config.input).discover(&config.input_dir())?;
//!
//!     let runner = BatchRunner::new(&config);
//!     let seq = runner.run_sequential(&images, &config.sequential_dir())?;
//!     let par = runner.run_parallel(&images, &config.parallel_dir())?;
//!     println!("{:.2}s vs {:.2}s", seq.elapsed.as_secs_f64(), par.elapsed.as_secs_f64());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{BenchError, ConfigError, Result, TransformError, TransformResult};
pub use pipeline::{BatchRunner, FileDiscovery, ImageProcessor, OutputDirs, Stage, StageImages};
pub use types::{BatchReport, BenchmarkReport, ExecutionMode, ProcessedImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
