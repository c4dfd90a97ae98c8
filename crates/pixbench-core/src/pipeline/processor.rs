//! Single-image transformer: decode, run the stage chain, write four JPEGs.

use image::codecs::jpeg::JpegEncoder;
use image::GrayImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::decode::decode;
use super::outputs::{OutputDirs, Stage};
use super::transform::StageImages;
use crate::config::OutputConfig;
use crate::error::{TransformError, TransformResult};
use crate::types::ProcessedImage;

/// Processes one image at a time into a set of output directories.
///
/// Holds only immutable settings, so one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    jpeg_quality: u8,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl ImageProcessor {
    /// Create a new image processor with the given output settings.
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Process one image as an isolated unit of work.
    ///
    /// Every failure, including a panic inside a library call, is logged with
    /// the source path and returned; nothing escapes to the caller's thread.
    /// Decode failures produce no output files.
    pub fn run_unit(&self, path: &Path, dirs: &OutputDirs) -> TransformResult<ProcessedImage> {
        isolate(path, || self.process(path, dirs))
    }

    /// Decode, transform and write all four stage outputs.
    ///
    /// All stage images are computed before the first file is written.
    pub fn process(&self, path: &Path, dirs: &OutputDirs) -> TransformResult<ProcessedImage> {
        let start = std::time::Instant::now();

        let image = decode(path)?;
        let decode_time = start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);

        let stages = StageImages::from_image(path, &image)?;
        drop(image);
        tracing::trace!("  Transform: {:?}", start.elapsed() - decode_time);

        let mut outputs = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            let output_path = dirs.output_path(stage, path);
            self.write_jpeg(stages.get(stage), stage, path, &output_path)?;
            outputs.push(output_path);
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{})",
            file_name,
            start.elapsed(),
            stages.gray.width(),
            stages.gray.height()
        );

        Ok(ProcessedImage {
            file_path: path.to_path_buf(),
            file_name,
            width: stages.gray.width(),
            height: stages.gray.height(),
            resized_width: stages.resized.width(),
            resized_height: stages.resized.height(),
            outputs,
        })
    }

    fn write_jpeg(
        &self,
        image: &GrayImage,
        stage: Stage,
        source: &Path,
        output_path: &Path,
    ) -> TransformResult<()> {
        let io_err = |e: std::io::Error| TransformError::Io {
            path: output_path.to_path_buf(),
            source: e,
        };

        let mut writer = BufWriter::new(File::create(output_path).map_err(io_err)?);
        JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality)
            .encode_image(image)
            .map_err(|e| TransformError::Encode {
                path: source.to_path_buf(),
                stage,
                message: e.to_string(),
            })?;
        writer.flush().map_err(io_err)
    }
}

/// Run `work` for `path` with panics caught, then log how it ended.
pub(crate) fn isolate<F>(path: &Path, work: F) -> TransformResult<ProcessedImage>
where
    F: FnOnce() -> TransformResult<ProcessedImage>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        Err(TransformError::Panic {
            path: path.to_path_buf(),
            message: panic_message(payload.as_ref()),
        })
    });

    match &outcome {
        Ok(_) => tracing::info!("Processed and saved images for: {:?}", path),
        Err(e) if e.is_decode() => tracing::warn!("Failed to read image: {:?} ({})", path, e),
        Err(e) => tracing::error!("Error processing image {:?}: {}", path, e),
    }
    outcome
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
