//! Core data types: per-image results and per-run reports.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Result of one successfully processed image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Source width in pixels
    pub width: u32,

    /// Source height in pixels
    pub height: u32,

    /// Width of the resized, blurred and edge outputs
    pub resized_width: u32,

    /// Height of the resized, blurred and edge outputs
    pub resized_height: u32,

    /// Written files, in stage order (gray, resized, blurred, edges)
    pub outputs: Vec<PathBuf>,
}

/// How a batch was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One image after another on the calling thread
    Sequential,
    /// One unit of work per image on a worker pool
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "Monothreading"),
            ExecutionMode::Parallel => write!(f, "Multithreading"),
        }
    }
}

/// Summary of one batch driver run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Execution mode
    pub mode: ExecutionMode,

    /// Base output directory of this run
    pub output_dir: PathBuf,

    /// Threads that executed units of work
    pub workers: usize,

    /// Images handed to the driver
    pub submitted: usize,

    /// Images with all four outputs written
    pub succeeded: usize,

    /// Images skipped because they could not be decoded
    pub decode_failures: usize,

    /// Images skipped because of any other fault
    pub other_failures: usize,

    /// Wall-clock time from first unit start to last unit end
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

impl BatchReport {
    /// Total images skipped.
    pub fn failed(&self) -> usize {
        self.decode_failures + self.other_failures
    }

    /// Images per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.submitted as f64 / secs
        } else {
            0.0
        }
    }
}

/// Both runs side by side.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// Sequential run, if executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential: Option<BatchReport>,

    /// Parallel run, if executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel: Option<BatchReport>,

    /// Sequential time divided by parallel time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speedup: Option<f64>,
}

impl BenchmarkReport {
    /// Combine the run reports and derive the speedup when both ran.
    pub fn new(sequential: Option<BatchReport>, parallel: Option<BatchReport>) -> Self {
        let speedup = match (&sequential, &parallel) {
            (Some(seq), Some(par)) if par.elapsed.as_secs_f64() > 0.0 => {
                Some(seq.elapsed.as_secs_f64() / par.elapsed.as_secs_f64())
            }
            _ => None,
        };
        Self {
            sequential,
            parallel,
            speedup,
        }
    }

    /// Pretty-printed JSON form of the report.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write [`Self::to_json`] to `path`, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> crate::error::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!("Report written to {:?}", path);
        Ok(())
    }
}

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
