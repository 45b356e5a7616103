//! FFprobe wrapper module
//!
//! Reads the pixel dimensions of the first video stream of a file. Like
//! [`crate::ffmpeg`], the external call sits behind a trait ([`Prober`]) so
//! that callers can be tested without ffprobe installed.

use crate::errors::ProbeError;
use crate::logging::execute_command_with_logging;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Reads `(width, height)` of the first video stream.
pub trait Prober: Send + Sync {
    fn probe(&self, path: &Path) -> Result<(u32, u32), ProbeError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<StreamDimensions>,
}

#[derive(Debug, Deserialize)]
struct StreamDimensions {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse the JSON printed by
/// `ffprobe -print_format json -select_streams v:0 -show_entries stream=width,height`.
pub fn parse_dimensions(json: &str) -> Result<(u32, u32), ProbeError> {
    let parsed: ProbeOutput = serde_json::from_str(json)?;
    let stream = parsed.streams.first().ok_or(ProbeError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(ProbeError::MissingDimensions),
    }
}

#[derive(Debug, Clone)]
pub struct FfprobeProber {
    binary: PathBuf,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProber {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
        let tool = crate::common_utils::file_name_lossy(&self.binary);
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "--",
        ])
        .arg(path)
        .stdin(Stdio::null());

        let output = execute_command_with_logging(&tool, &mut cmd)
            .map_err(|source| ProbeError::Spawn { tool, source })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_dimensions(&String::from_utf8_lossy(&output.stdout))
    }
}
