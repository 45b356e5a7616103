//! Batch Processing Module
//!
//! File discovery for a scan root and the running tally of a batch.

use crate::conversion::{ConversionAction, ConversionResult};
use crate::errors::MediaError;
use crate::media_kind::{classify, MediaFile, MediaTypeFilter, OutputLayout};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively collect every media file under `root` whose kind passes `filter`.
///
/// Both output directories are pruned from the walk, so converted files are
/// never reported. The order of the result follows the filesystem and is not
/// stable across runs. A directory that cannot be read aborts discovery.
pub fn discover(
    root: &Path,
    filter: MediaTypeFilter,
    layout: &OutputLayout,
) -> Result<Vec<MediaFile>, MediaError> {
    if !root.is_dir() {
        return Err(MediaError::InputNotFound(root.to_path_buf()));
    }

    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        let is_output_dir =
            e.depth() > 0 && e.file_type().is_dir() && layout.is_output_dir_name(e.file_name());
        !is_output_dir
    });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| MediaError::Discovery {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if let Some(kind) = classify(relative, layout) {
            if filter.includes(kind) {
                files.push(MediaFile::new(entry.into_path(), kind));
            }
        }
    }

    debug!(root = %root.display(), found = files.len(), "discovery finished");
    Ok(files)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub transcoded: usize,
    pub moved: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &ConversionResult) {
        self.total += 1;
        match result.action {
            ConversionAction::Transcoded => {
                self.succeeded += 1;
                self.transcoded += 1;
            }
            ConversionAction::Moved => {
                self.succeeded += 1;
                self.moved += 1;
            }
            ConversionAction::Failed => {
                self.failed += 1;
                self.errors
                    .push((result.source_path.clone(), result.message.clone()));
            }
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}
