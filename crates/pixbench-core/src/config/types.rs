//! Sub-configuration structs with defaults matching the fixed benchmark layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned (non-recursively) for images
    pub dir: PathBuf,

    /// File name suffixes accepted, without the dot. Matched case-sensitively.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("images"),
            extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// Output tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for the sequential run
    pub sequential_dir: PathBuf,

    /// Base directory for the parallel run
    pub parallel_dir: PathBuf,

    /// JPEG quality for every stage output (1-100)
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sequential_dir: PathBuf::from("output_monothread"),
            parallel_dir: PathBuf::from("output_multithread"),
            jpeg_quality: 95,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel workers. Unset means the host's available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_workers: Option<usize>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
