//! Batch drivers: the same unit of work run in order on one thread, or fanned
//! out over a worker pool.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::outputs::OutputDirs;
use super::processor::ImageProcessor;
use crate::config::Config;
use crate::error::{Result, TransformResult};
use crate::types::{BatchReport, ExecutionMode, ProcessedImage};

/// Runs a list of images through the [`ImageProcessor`] in either mode.
pub struct BatchRunner {
    processor: ImageProcessor,
    parallel_workers: Option<usize>,
}

impl BatchRunner {
    /// Create a runner from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_processor(
            ImageProcessor::new(&config.output),
            config.processing.parallel_workers,
        )
    }

    /// Create a runner around an existing processor.
    ///
    /// `parallel_workers` of `None` sizes the pool by the host's available
    /// parallelism.
    pub fn with_processor(processor: ImageProcessor, parallel_workers: Option<usize>) -> Self {
        Self {
            processor,
            parallel_workers,
        }
    }

    /// Process `paths` strictly in order on the calling thread, writing under
    /// `base`.
    ///
    /// Only directory provisioning can fail; per-image faults are logged and
    /// counted in the report.
    pub fn run_sequential(&self, paths: &[PathBuf], base: &Path) -> Result<BatchReport> {
        self.sequential_with(paths, base, |path, dirs| self.processor.run_unit(path, dirs))
    }

    /// Process `paths` concurrently, one unit of work per image, writing under
    /// `base`.
    ///
    /// Completion order is unspecified. Returns once every unit has finished.
    pub fn run_parallel(&self, paths: &[PathBuf], base: &Path) -> Result<BatchReport> {
        self.parallel_with(paths, base, |path, dirs| self.processor.run_unit(path, dirs))
    }

    fn sequential_with<F>(&self, paths: &[PathBuf], base: &Path, unit: F) -> Result<BatchReport>
    where
        F: Fn(&Path, &OutputDirs) -> TransformResult<ProcessedImage>,
    {
        let dirs = OutputDirs::provision(base)?;
        tracing::debug!("Sequential run: {} image(s) -> {:?}", paths.len(), dirs.base());

        let start = Instant::now();
        let outcomes: Vec<_> = paths.iter().map(|path| unit(path, &dirs)).collect();
        let elapsed = start.elapsed();

        Ok(build_report(ExecutionMode::Sequential, &dirs, 1, &outcomes, elapsed))
    }

    fn parallel_with<F>(&self, paths: &[PathBuf], base: &Path, unit: F) -> Result<BatchReport>
    where
        F: Fn(&Path, &OutputDirs) -> TransformResult<ProcessedImage> + Sync,
    {
        let dirs = OutputDirs::provision(base)?;

        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("pixbench-worker-{}", i));
        if let Some(workers) = self.parallel_workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;
        let workers = pool.current_num_threads();
        tracing::debug!(
            "Parallel run: {} image(s) on {} worker(s) -> {:?}",
            paths.len(),
            workers,
            dirs.base()
        );

        let start = Instant::now();
        let outcomes: Vec<_> = pool.install(|| {
            paths
                .par_iter()
                .with_max_len(1)
                .map(|path| unit(path, &dirs))
                .collect()
        });
        let elapsed = start.elapsed();

        Ok(build_report(ExecutionMode::Parallel, &dirs, workers, &outcomes, elapsed))
    }
}

fn build_report(
    mode: ExecutionMode,
    dirs: &OutputDirs,
    workers: usize,
    outcomes: &[TransformResult<ProcessedImage>],
    elapsed: std::time::Duration,
) -> BatchReport {
    let mut report = BatchReport {
        mode,
        output_dir: dirs.base().to_path_buf(),
        workers,
        submitted: outcomes.len(),
        succeeded: 0,
        decode_failures: 0,
        other_failures: 0,
        elapsed,
    };
    for outcome in outcomes {
        match outcome {
            Ok(_) => report.succeeded += 1,
            Err(e) if e.is_decode() => report.decode_failures += 1,
            Err(_) => report.other_failures += 1,
        }
    }
    tracing::info!(
        "{} finished: {}/{} succeeded in {:.2?}",
        mode,
        report.succeeded,
        report.submitted,
        elapsed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::pipeline::processor::isolate;
    use crate::pipeline::Stage;
    use image::{Rgb, RgbImage};

    fn write_inputs(dir: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for (i, size) in [(40, 30), (33, 17), (64, 64)].into_iter().enumerate() {
            let path = dir.join(format!("img{}.png", i));
            RgbImage::from_pixel(size.0, size.1, Rgb([10 * i as u8, 90, 200]))
                .save(&path)
                .unwrap();
            paths.push(path);
        }
        let broken = dir.join("broken.jpg");
        std::fs::write(&broken, b"not an image").unwrap();
        paths.push(broken);
        paths
    }

    #[test]
    fn test_sequential_report_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_inputs(tmp.path());
        let runner = BatchRunner::new(&Config::default());

        let report = runner
            .run_sequential(&paths, &tmp.path().join("seq"))
            .unwrap();

        assert_eq!(report.mode, ExecutionMode::Sequential);
        assert_eq!(report.workers, 1);
        assert_eq!(report.submitted, 4);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.decode_failures, 1);
        assert_eq!(report.other_failures, 0);
    }

    #[test]
    fn test_parallel_honors_worker_count() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_inputs(tmp.path());
        let runner = BatchRunner::with_processor(ImageProcessor::default(), Some(2));

        let report = runner.run_parallel(&paths, &tmp.path().join("par")).unwrap();

        assert_eq!(report.mode, ExecutionMode::Parallel);
        assert_eq!(report.workers, 2);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed(), 1);
        let edges = std::fs::read_dir(tmp.path().join("par").join(Stage::Edges.name()))
            .unwrap()
            .count();
        assert_eq!(edges, 3);
    }

    /// Unit that panics on `img1.png` and processes everything else normally.
    fn panics_on_second(
        processor: &ImageProcessor,
    ) -> impl Fn(&Path, &OutputDirs) -> TransformResult<ProcessedImage> + Sync + '_ {
        move |path: &Path, dirs: &OutputDirs| {
            isolate(path, || {
                if path.ends_with("img1.png") {
                    panic!("codec state corrupted");
                }
                processor.process(path, dirs)
            })
        }
    }

    #[test]
    fn test_parallel_panic_is_one_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_inputs(tmp.path());
        let processor = ImageProcessor::default();
        let runner = BatchRunner::with_processor(processor.clone(), Some(2));

        let report = runner
            .parallel_with(&paths, &tmp.path().join("par"), panics_on_second(&processor))
            .unwrap();

        assert_eq!(report.submitted, 4);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.decode_failures, 1);
        assert_eq!(report.other_failures, 1);
        let edges = std::fs::read_dir(tmp.path().join("par").join(Stage::Edges.name()))
            .unwrap()
            .count();
        assert_eq!(edges, 2);
    }

    #[test]
    fn test_sequential_continues_after_panic() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = write_inputs(tmp.path());
        let processor = ImageProcessor::default();
        let runner = BatchRunner::new(&Config::default());
        let seen = std::sync::Mutex::new(Vec::new());
        let unit = panics_on_second(&processor);

        let report = runner
            .sequential_with(&paths, &tmp.path().join("seq"), |path, dirs| {
                let outcome = unit(path, dirs);
                seen.lock().unwrap().push(outcome.as_ref().err().map(|e| {
                    matches!(e, TransformError::Panic { .. })
                }));
                outcome
            })
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.other_failures, 1);
        assert_eq!(
            *seen.lock().unwrap(),
            [None, Some(true), None, Some(false)]
        );
    }

    #[test]
    fn test_empty_batch_still_provisions() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = BatchRunner::new(&Config::default());

        let report = runner.run_parallel(&[], &tmp.path().join("par")).unwrap();

        assert_eq!(report.submitted, 0);
        assert!(tmp.path().join("par").join("gray").is_dir());
    }

    #[test]
    fn test_unwritable_base_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("file");
        std::fs::write(&base, b"").unwrap();
        let runner = BatchRunner::new(&Config::default());

        assert!(runner.run_sequential(&[], &base).is_err());
        assert!(runner.run_parallel(&[], &base).is_err());
    }
}
