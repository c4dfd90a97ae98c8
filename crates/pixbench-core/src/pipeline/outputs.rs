//! Stage names and the per-run output directory set.

use std::fmt;
use std::path::{Path, PathBuf};

/// One of the four named outputs of the transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Full-size grayscale
    Gray,
    /// Grayscale halved in each dimension
    Resized,
    /// 5x5 Gaussian blur of the resized image
    Blurred,
    /// Canny edges of the blurred image
    Edges,
}

impl Stage {
    /// All stages, in chain order.
    pub const ALL: [Stage; 4] = [Stage::Gray, Stage::Resized, Stage::Blurred, Stage::Edges];

    /// Directory and file-suffix name of the stage.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Gray => "gray",
            Stage::Resized => "resized",
            Stage::Blurred => "blurred",
            Stage::Edges => "edges",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Absolute stage directories under one base output directory.
///
/// Created once per batch run and only read afterwards, so a shared reference
/// can be handed to every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    base: PathBuf,
    gray: PathBuf,
    resized: PathBuf,
    blurred: PathBuf,
    edges: PathBuf,
}

impl OutputDirs {
    /// Compute the stage directories under `base` without touching the disk.
    pub fn new(base: &Path) -> std::io::Result<Self> {
        let base = std::path::absolute(base)?;
        Ok(Self {
            gray: base.join(Stage::Gray.name()),
            resized: base.join(Stage::Resized.name()),
            blurred: base.join(Stage::Blurred.name()),
            edges: base.join(Stage::Edges.name()),
            base,
        })
    }

    /// Ensure all four stage directories exist under `base`.
    ///
    /// Existing directories are left alone; any failure to create one is
    /// returned as-is.
    pub fn provision(base: &Path) -> std::io::Result<Self> {
        let dirs = Self::new(base)?;
        for stage in Stage::ALL {
            std::fs::create_dir_all(dirs.dir(stage))?;
        }
        tracing::debug!("Output directories ready under {:?}", dirs.base);
        Ok(dirs)
    }

    /// Base directory holding the stage subdirectories.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory for one stage.
    pub fn dir(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Gray => &self.gray,
            Stage::Resized => &self.resized,
            Stage::Blurred => &self.blurred,
            Stage::Edges => &self.edges,
        }
    }

    /// `{stage dir}/{source stem}_{stage}.jpg`
    pub fn output_path(&self, stage: Stage, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        self.dir(stage).join(format!("{}_{}.jpg", stem, stage.name()))
    }
}
