//! Batch pipeline
//!
//! Discovers every candidate under a root and converts them on a fixed-size
//! worker pool. Results are handed back through a channel in completion
//! order, so the caller can report each file as soon as it is done.

use crate::conversion_api::{ConversionConfig, TranscodeAdapter};
use rayon::prelude::*;
use serde::Serialize;
use shared_utils::batch::{discover, BatchResult};
use shared_utils::conversion::ConversionResult;
use shared_utils::ffmpeg::Transcoder;
use shared_utils::media_kind::{MediaFile, MediaTypeFilter, OutputLayout};
use shared_utils::safety::check_dangerous_directory;
use shared_utils::thread_manager::DEFAULT_WORKERS;
use shared_utils::MediaError;
use std::any::Any;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_workers: usize,
    pub layout: OutputLayout,
    pub conversion: ConversionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_WORKERS,
            layout: OutputLayout::default(),
            conversion: ConversionConfig::default(),
        }
    }
}

/// Everything a run produced. `results` is in completion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<ConversionResult>,
    pub summary: BatchResult,
}

impl RunReport {
    fn record(&mut self, result: ConversionResult) {
        self.summary.record(&result);
        self.results.push(result);
    }

    pub fn all_succeeded(&self) -> bool {
        self.summary.all_succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Receives run events on the calling thread.
pub trait RunObserver {
    /// Called once with the number of files about to be converted.
    fn on_start(&mut self, _total: usize) {}

    fn on_result(&mut self, result: &ConversionResult);
}

impl<F: FnMut(&ConversionResult)> RunObserver for F {
    fn on_result(&mut self, result: &ConversionResult) {
        self(result)
    }
}

pub struct Pipeline {
    transcoder: Arc<dyn Transcoder>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: PipelineConfig) -> Self {
        Self { transcoder, config }
    }

    pub fn run(&self, root: &Path, filter: MediaTypeFilter) -> Result<RunReport, MediaError> {
        self.run_with_observer(root, filter, &mut |_: &ConversionResult| {})
    }

    /// Convert every matching file under `root`.
    ///
    /// Only setup problems are errors: a missing or protected root, an output
    /// directory that cannot be created, a failed walk, or a pool that cannot
    /// be built. Per-file failures end up in the report.
    pub fn run_with_observer(
        &self,
        root: &Path,
        filter: MediaTypeFilter,
        observer: &mut dyn RunObserver,
    ) -> Result<RunReport, MediaError> {
        if !root.is_dir() {
            return Err(MediaError::InputNotFound(root.to_path_buf()));
        }
        check_dangerous_directory(root)?;

        let layout = &self.config.layout;
        for &kind in filter.kinds() {
            let dir = layout.output_dir(root, kind);
            fs::create_dir_all(&dir).map_err(|source| MediaError::OutputDir {
                path: dir.clone(),
                source,
            })?;
        }

        let files = discover(root, filter, layout)?;
        if files.is_empty() {
            info!(root = %root.display(), "nothing to do");
            return Ok(RunReport::default());
        }

        let workers = self.config.max_workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("convert-{}", i))
            .build()
            .map_err(|e| MediaError::WorkerPool(e.to_string()))?;

        info!(
            root = %root.display(),
            files = files.len(),
            workers,
            filter = ?filter,
            "starting conversion"
        );
        observer.on_start(files.len());

        let adapter = TranscodeAdapter::new(self.transcoder.clone(), self.config.conversion.clone());
        let (tx, rx) = mpsc::channel::<ConversionResult>();
        let mut report = RunReport::default();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                pool.install(|| {
                    files.par_iter().for_each_with(tx, |tx, file| {
                        let output_dir = layout.output_dir(root, file.kind);
                        let result = convert_isolated(&adapter, file, &output_dir);
                        // receiver lives until every sender is dropped
                        let _ = tx.send(result);
                    });
                });
            });

            for result in rx {
                if result.success {
                    info!(file = %result.source_name, "{}", result.message);
                } else {
                    warn!(file = %result.source_name, "{}", result.message);
                }
                observer.on_result(&result);
                report.record(result);
            }
        });

        info!(
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "conversion finished"
        );
        Ok(report)
    }
}

/// Convenience for a one-off run with default layout and encode settings.
pub fn run(
    transcoder: Arc<dyn Transcoder>,
    root: &Path,
    filter: MediaTypeFilter,
    max_workers: usize,
) -> Result<RunReport, MediaError> {
    let config = PipelineConfig {
        max_workers,
        ..PipelineConfig::default()
    };
    Pipeline::new(transcoder, config).run(root, filter)
}

/// One task. A panic is turned into a failed result so that it cannot take
/// down the pool or the other tasks.
fn convert_isolated(
    adapter: &TranscodeAdapter,
    file: &MediaFile,
    output_dir: &Path,
) -> ConversionResult {
    catch_unwind(AssertUnwindSafe(|| adapter.convert(file, output_dir))).unwrap_or_else(|payload| {
        ConversionResult::failed(file, format!("worker panicked: {}", panic_message(&*payload)))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
