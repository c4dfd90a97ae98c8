//! Configuration validation with range checks.

use std::path::Path;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "input.extensions must not be empty".into(),
            ));
        }
        if same_location(&self.sequential_dir(), &self.parallel_dir()) {
            return Err(ConfigError::ValidationError(
                "output.sequential_dir and output.parallel_dir must differ".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.processing.parallel_workers == Some(0) {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Whether two paths name the same location once made absolute against the
/// current directory. Symlinks are not resolved.
fn same_location(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
