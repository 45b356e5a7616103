//! FFmpeg transcoder
//!
//! Every external encode goes through the [`Transcoder`] trait so that the
//! orchestration code can run against a fake in tests. [`FfmpegTranscoder`]
//! is the real implementation and only turns a [`TranscodeJob`] into an
//! argument list and an exit status.

use crate::errors::TranscodeError;
use crate::logging::execute_command_with_logging;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs one external encode to completion.
pub trait Transcoder: Send + Sync {
    fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageEncodeParams {
    /// JPEG quality, 0-100.
    pub quality: u8,
}

impl Default for ImageEncodeParams {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

impl ImageEncodeParams {
    /// Map the 0-100 quality onto the mjpeg `-q:v` scale (2 best, 31 worst).
    pub fn qscale(&self) -> u8 {
        let quality = u32::from(self.quality.min(100));
        (2 + (100 - quality) * 29 / 100) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEncodeParams {
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
    pub audio_codec: String,
}

impl Default for VideoEncodeParams {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// Synthetic single-color source rendered through lavfi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidColorSource {
    pub color: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
    pub duration_secs: u64,
    pub video_codec: String,
    pub tune: Option<String>,
    pub pix_fmt: String,
}

impl SolidColorSource {
    pub fn black(width: u32, height: u32, duration_secs: u64) -> Self {
        Self {
            color: "black".to_string(),
            width,
            height,
            frame_rate: 1,
            duration_secs,
            video_codec: "libx264".to_string(),
            tune: Some("stillimage".to_string()),
            pix_fmt: "yuv420p".to_string(),
        }
    }

    fn lavfi_spec(&self) -> String {
        format!("color=c={}:s={}x{}", self.color, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeJob {
    Image {
        input: PathBuf,
        output: PathBuf,
        params: ImageEncodeParams,
    },
    Video {
        input: PathBuf,
        output: PathBuf,
        params: VideoEncodeParams,
    },
    SolidColor {
        output: PathBuf,
        source: SolidColorSource,
    },
}

impl TranscodeJob {
    pub fn input(&self) -> Option<&Path> {
        match self {
            TranscodeJob::Image { input, .. } | TranscodeJob::Video { input, .. } => Some(input),
            TranscodeJob::SolidColor { .. } => None,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            TranscodeJob::Image { output, .. }
            | TranscodeJob::Video { output, .. }
            | TranscodeJob::SolidColor { output, .. } => output,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full ffmpeg argument list for `job`. The output is always overwritten.
    pub fn build_args(job: &TranscodeJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        match job {
            TranscodeJob::Image {
                input,
                output,
                params,
            } => {
                args.push("-i".into());
                args.push(input.into());
                // single frame, and never treat the output name as an image2 pattern
                args.extend(["-frames:v", "1", "-update", "1"].map(OsString::from));
                args.push("-q:v".into());
                args.push(params.qscale().to_string().into());
                args.push(output.into());
            }
            TranscodeJob::Video {
                input,
                output,
                params,
            } => {
                args.push("-i".into());
                args.push(input.into());
                args.push("-c:v".into());
                args.push(params.video_codec.as_str().into());
                args.push("-crf".into());
                args.push(params.crf.to_string().into());
                args.push("-preset".into());
                args.push(params.preset.as_str().into());
                args.push("-c:a".into());
                args.push(params.audio_codec.as_str().into());
                args.push(output.into());
            }
            TranscodeJob::SolidColor { output, source } => {
                args.extend(["-f", "lavfi", "-i"].map(OsString::from));
                args.push(source.lavfi_spec().into());
                args.push("-r".into());
                args.push(source.frame_rate.to_string().into());
                args.push("-t".into());
                args.push(source.duration_secs.to_string().into());
                args.push("-c:v".into());
                args.push(source.video_codec.as_str().into());
                if let Some(tune) = &source.tune {
                    args.push("-tune".into());
                    args.push(tune.as_str().into());
                }
                args.push("-pix_fmt".into());
                args.push(source.pix_fmt.as_str().into());
                args.push(output.into());
            }
        }

        args
    }

    fn tool_name(&self) -> String {
        crate::common_utils::file_name_lossy(&self.binary)
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        let tool = self.tool_name();
        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::build_args(job)).stdin(Stdio::null());

        let output =
            execute_command_with_logging(&tool, &mut cmd).map_err(|source| TranscodeError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(TranscodeError::Failed {
                tool,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(job: &TranscodeJob) -> Vec<String> {
        FfmpegTranscoder::build_args(job)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn window<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_qscale_mapping() {
        assert_eq!(ImageEncodeParams { quality: 100 }.qscale(), 2);
        assert_eq!(ImageEncodeParams { quality: 95 }.qscale(), 3);
        assert_eq!(ImageEncodeParams { quality: 0 }.qscale(), 31);
        assert_eq!(ImageEncodeParams { quality: 200 }.qscale(), 2);
    }

    #[test]
    fn test_image_args() {
        let job = TranscodeJob::Image {
            input: PathBuf::from("/in/a.png"),
            output: PathBuf::from("/out/a.jpg"),
            params: ImageEncodeParams::default(),
        };
        let args = args_of(&job);

        assert!(args.contains(&"-y".to_string()));
        assert_eq!(window(&args, "-i"), Some("/in/a.png"));
        assert_eq!(window(&args, "-q:v"), Some("3"));
        assert_eq!(window(&args, "-frames:v"), Some("1"));
        assert_eq!(args.last().map(String::as_str), Some("/out/a.jpg"));
        assert!(!args.iter().any(|a| a == "-vf" || a == "-s"), "images are never rescaled");
    }

    #[test]
    fn test_video_args_use_fixed_profile() {
        let job = TranscodeJob::Video {
            input: PathBuf::from("/in/c.mov"),
            output: PathBuf::from("/out/c.mp4"),
            params: VideoEncodeParams::default(),
        };
        let args = args_of(&job);

        assert_eq!(window(&args, "-c:v"), Some("libx264"));
        assert_eq!(window(&args, "-crf"), Some("23"));
        assert_eq!(window(&args, "-preset"), Some("medium"));
        assert_eq!(window(&args, "-c:a"), Some("aac"));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/out/c.mp4"));
    }

    #[test]
    fn test_solid_color_args() {
        let job = TranscodeJob::SolidColor {
            output: PathBuf::from("/out/black.mp4"),
            source: SolidColorSource::black(1920, 1080, 14400),
        };
        let args = args_of(&job);

        assert_eq!(window(&args, "-f"), Some("lavfi"));
        assert_eq!(window(&args, "-i"), Some("color=c=black:s=1920x1080"));
        assert_eq!(window(&args, "-r"), Some("1"));
        assert_eq!(window(&args, "-t"), Some("14400"));
        assert_eq!(window(&args, "-tune"), Some("stillimage"));
        assert_eq!(window(&args, "-pix_fmt"), Some("yuv420p"));
        assert!(job.input().is_none());
        assert_eq!(job.output(), Path::new("/out/black.mp4"));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg-binary-xyz");
        let job = TranscodeJob::Video {
            input: PathBuf::from("in.mov"),
            output: PathBuf::from("out.mp4"),
            params: VideoEncodeParams::default(),
        };
        let err = transcoder.transcode(&job).unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() {
        let transcoder = FfmpegTranscoder::new("false");
        let job = TranscodeJob::Image {
            input: PathBuf::from("in.png"),
            output: PathBuf::from("out.jpg"),
            params: ImageEncodeParams::default(),
        };
        match transcoder.transcode(&job) {
            Err(TranscodeError::Failed { tool, exit_code, .. }) => {
                assert_eq!(tool, "false");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
