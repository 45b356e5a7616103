//! Common Utilities Module
//!
//! Small file and path helpers shared by the conversion and resolution tools.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Lowercased extension of `path`, or an empty string when there is none.
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Final path component for display; falls back to the whole path.
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Move a file, falling back to copy + remove when a plain rename is not
/// possible (for example across filesystems).
///
/// The source is only removed after the copy has completed.
pub fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                source = %source.display(),
                dest = %dest.display(),
                error = %rename_err,
                "rename failed, falling back to copy"
            );
            if !source.is_file() {
                return Err(rename_err);
            }
            fs::copy(source, dest)?;
            fs::remove_file(source)
        }
    }
}
