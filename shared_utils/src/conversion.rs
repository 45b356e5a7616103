//! Conversion Utilities Module
//!
//! Per-file outcome of a conversion task and the guarded deletion of the
//! original once its output has been written.

use crate::errors::TranscodeError;
use crate::media_kind::{MediaFile, MediaKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionAction {
    /// Re-encoded by the external transcoder, original deleted.
    Transcoded,
    /// Already canonical, moved into the output directory.
    Moved,
    Failed,
}

/// Outcome of converting one file. Created once by the converter, then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub source_name: String,
    pub source_path: PathBuf,
    pub kind: MediaKind,
    pub action: ConversionAction,
    pub message: String,
    pub output_path: Option<PathBuf>,
}

impl ConversionResult {
    pub fn transcoded(file: &MediaFile, output: &Path) -> Self {
        let name = file.file_name();
        Self {
            success: true,
            message: format!("Converted: {}", name),
            source_name: name,
            source_path: file.path.clone(),
            kind: file.kind,
            action: ConversionAction::Transcoded,
            output_path: Some(output.to_path_buf()),
        }
    }

    pub fn moved(file: &MediaFile, output: &Path) -> Self {
        let name = file.file_name();
        let label = match file.kind {
            MediaKind::Image => "JPG",
            MediaKind::Video => "MP4",
        };
        Self {
            success: true,
            message: format!("Copied {}: {}", label, name),
            source_name: name,
            source_path: file.path.clone(),
            kind: file.kind,
            action: ConversionAction::Moved,
            output_path: Some(output.to_path_buf()),
        }
    }

    pub fn failed(file: &MediaFile, error: impl fmt::Display) -> Self {
        let name = file.file_name();
        Self {
            success: false,
            message: format!("Error processing {}: {}", name, error),
            source_name: name,
            source_path: file.path.clone(),
            kind: file.kind,
            action: ConversionAction::Failed,
            output_path: None,
        }
    }
}

/// Check that `output` exists, is not empty and can be opened for reading.
pub fn verify_output_integrity(output: &Path) -> Result<(), String> {
    let metadata = fs::metadata(output).map_err(|e| format!("cannot read output metadata: {}", e))?;

    if !metadata.is_file() {
        return Err("output is not a regular file".to_string());
    }
    if metadata.len() == 0 {
        return Err("output file is empty (0 bytes)".to_string());
    }

    let mut file = File::open(output).map_err(|e| format!("cannot open output file: {}", e))?;
    let mut buffer = [0u8; 16];
    let read = file
        .read(&mut buffer)
        .map_err(|e| format!("cannot read output file: {}", e))?;
    if read == 0 {
        return Err("output file returned no data".to_string());
    }

    Ok(())
}

/// Delete `input` only if `output` passes [`verify_output_integrity`].
pub fn safe_delete_original(input: &Path, output: &Path) -> Result<(), TranscodeError> {
    verify_output_integrity(output).map_err(|reason| TranscodeError::BadOutput {
        path: output.to_path_buf(),
        reason,
    })?;

    fs::remove_file(input).map_err(|e| {
        TranscodeError::io(format!("failed to delete original {}", input.display()), e)
    })
}
