//! Filler video generation
//!
//! Renders a solid-color placeholder clip at a target resolution through the
//! transcoder's synthetic source mode.

use crate::resolution::TargetResolution;
use shared_utils::ffmpeg::{SolidColorSource, TranscodeJob, Transcoder};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Four hours.
pub const DEFAULT_FILLER_DURATION_SECS: u64 = 14_400;
pub const DEFAULT_FILLER_FILE_NAME: &str = "black_frame_4hours.mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerSpec {
    pub color: String,
    pub frame_rate: u32,
    pub video_codec: String,
    pub tune: Option<String>,
    pub pix_fmt: String,
}

impl Default for FillerSpec {
    fn default() -> Self {
        Self {
            color: "black".to_string(),
            frame_rate: 1,
            video_codec: "libx264".to_string(),
            tune: Some("stillimage".to_string()),
            pix_fmt: "yuv420p".to_string(),
        }
    }
}

impl FillerSpec {
    fn source(&self, resolution: &TargetResolution, duration_secs: u64) -> SolidColorSource {
        SolidColorSource {
            color: self.color.clone(),
            width: resolution.width,
            height: resolution.height,
            frame_rate: self.frame_rate,
            duration_secs,
            video_codec: self.video_codec.clone(),
            tune: self.tune.clone(),
            pix_fmt: self.pix_fmt.clone(),
        }
    }
}

/// Black, 1 fps filler at `resolution`. Returns false and logs on failure.
pub fn generate_filler(
    transcoder: &dyn Transcoder,
    resolution: &TargetResolution,
    duration_secs: u64,
    output_path: &Path,
) -> bool {
    generate_filler_with(
        transcoder,
        &FillerSpec::default(),
        resolution,
        duration_secs,
        output_path,
    )
}

pub fn generate_filler_with(
    transcoder: &dyn Transcoder,
    spec: &FillerSpec,
    resolution: &TargetResolution,
    duration_secs: u64,
    output_path: &Path,
) -> bool {
    if resolution.width == 0 || resolution.height == 0 || duration_secs == 0 {
        error!(
            resolution = %resolution,
            duration_secs,
            "refusing to render an empty filler video"
        );
        return false;
    }

    let existed = output_path.exists();
    let job = TranscodeJob::SolidColor {
        output: output_path.to_path_buf(),
        source: spec.source(resolution, duration_secs),
    };

    match transcoder.transcode(&job) {
        Ok(()) => {
            info!(
                output = %output_path.display(),
                resolution = %resolution,
                duration_secs,
                "filler video created"
            );
            true
        }
        Err(e) => {
            error!(output = %output_path.display(), error = %e, "failed to create filler video");
            if !existed {
                if let Err(rm) = fs::remove_file(output_path) {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(output = %output_path.display(), error = %rm, "failed to remove partial filler");
                    }
                }
            }
            false
        }
    }
}
