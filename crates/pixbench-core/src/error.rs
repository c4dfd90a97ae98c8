//! Error types for the pixbench pipeline.
//!
//! Two layers: [`BenchError`] covers setup faults (config, output directories,
//! input listing, worker pool) that end the run, while [`TransformError`]
//! covers a single image and is logged and counted by the batch drivers.

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

/// Top-level error type for benchmark setup and reporting.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// General I/O errors (e.g. creating output directories)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input directory could not be listed
    #[error("Cannot list input directory {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failure of one unit of work. Never propagated past a batch driver.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The file is unreadable, corrupt or in an unsupported format
    #[error("Failed to read image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The decoded image cannot go through the stage chain
    #[error("Transform failed for {path}: {message}")]
    Transform { path: PathBuf, message: String },

    /// JPEG encoding of a stage output failed
    #[error("Encoding {stage} output for {path} failed: {message}")]
    Encode {
        path: PathBuf,
        stage: Stage,
        message: String,
    },

    /// Writing an output file failed
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A library call panicked while processing the image
    #[error("Panic while processing {path}: {message}")]
    Panic { path: PathBuf, message: String },
}

impl TransformError {
    /// Whether this is the expected "cannot decode this file" outcome rather
    /// than an unexpected fault further down the chain.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Convenience type alias for pixbench results.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Convenience type alias for single-image results.
pub type TransformResult<T> = std::result::Result<T, TransformError>;
