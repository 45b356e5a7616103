//! Probe API Module
//!
//! Reads the dimensions of every video under a directory in parallel.
//! Files that cannot be probed are reported separately and never abort the
//! run.

use crate::resolution::{solve, DimensionMaxima, ResolutionSample, TargetResolution};
use rayon::prelude::*;
use serde::Serialize;
use shared_utils::batch::discover;
use shared_utils::common_utils::file_name_lossy;
use shared_utils::ffprobe::Prober;
use shared_utils::media_kind::{MediaTypeFilter, OutputLayout};
use shared_utils::MediaError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    pub file_name: String,
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    /// Sorted by file name.
    pub samples: Vec<ResolutionSample>,
    pub failures: Vec<ProbeFailure>,
}

/// Probe results for a directory together with what they imply.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionAnalysis {
    pub directory: PathBuf,
    #[serde(flatten)]
    pub report: ProbeReport,
    pub maxima: DimensionMaxima,
    pub target: TargetResolution,
}

impl ResolutionAnalysis {
    /// The solved target, or `None` when no video could be measured and the
    /// target is only the empty-input default.
    pub fn measured_target(&self) -> Option<&TargetResolution> {
        if self.report.samples.is_empty() {
            None
        } else {
            Some(&self.target)
        }
    }
}

pub fn probe_file(prober: &dyn Prober, path: &Path) -> Result<ResolutionSample, ProbeFailure> {
    let file_name = file_name_lossy(path);
    match prober.probe(path) {
        Ok((width, height)) => {
            debug!(file = %file_name, width, height, "probed");
            Ok(ResolutionSample::new(file_name, width, height))
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to read video dimensions");
            Err(ProbeFailure {
                file_name,
                path: path.to_path_buf(),
                error: e.to_string(),
            })
        }
    }
}

/// Probe every video under `root` on a pool of `max_workers` threads.
pub fn probe_directory(
    prober: &dyn Prober,
    root: &Path,
    max_workers: usize,
) -> Result<ProbeReport, MediaError> {
    let files = discover(root, MediaTypeFilter::Videos, &OutputLayout::default())?;
    if files.is_empty() {
        info!(root = %root.display(), "no videos found");
        return Ok(ProbeReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .thread_name(|i| format!("probe-{}", i))
        .build()
        .map_err(|e| MediaError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<Result<ResolutionSample, ProbeFailure>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| probe_file(prober, &file.path))
            .collect()
    });

    let mut report = ProbeReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(sample) => report.samples.push(sample),
            Err(failure) => report.failures.push(failure),
        }
    }
    report.samples.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        root = %root.display(),
        probed = report.samples.len(),
        failed = report.failures.len(),
        "probe finished"
    );
    Ok(report)
}

pub fn analyze_directory(
    prober: &dyn Prober,
    root: &Path,
    max_workers: usize,
) -> Result<ResolutionAnalysis, MediaError> {
    let report = probe_directory(prober, root, max_workers)?;
    let maxima = DimensionMaxima::from_samples(&report.samples);
    let target = solve(&report.samples);
    Ok(ResolutionAnalysis {
        directory: root.to_path_buf(),
        report,
        maxima,
        target,
    })
}
