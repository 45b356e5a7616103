//! Shared Utilities for the media-normalize tools
//!
//! Common functionality used by `media_convert` and `vid_res`:
//! - Media classification and recursive discovery
//! - ffmpeg / ffprobe wrappers behind the `Transcoder` and `Prober` traits
//! - Conversion results and guarded deletion of originals
//! - Logging, progress bars and summary reporting
//! - Safety checks (dangerous directory detection)
//! - Worker count selection

pub mod batch;
pub mod common_utils;
pub mod conversion;
pub mod errors;
pub mod ffmpeg;
pub mod ffprobe;
pub mod logging;
pub mod media_kind;
pub mod progress;
pub mod report;
pub mod safety;
pub mod thread_manager;
pub mod tools;

pub use batch::{discover, BatchResult};
pub use conversion::{
    safe_delete_original, verify_output_integrity, ConversionAction, ConversionResult,
};
pub use errors::{MediaError, ProbeError, TranscodeError};
pub use ffmpeg::{
    FfmpegTranscoder, ImageEncodeParams, SolidColorSource, TranscodeJob, Transcoder,
    VideoEncodeParams,
};
pub use ffprobe::{parse_dimensions, FfprobeProber, Prober};
pub use logging::{init_logging, LogConfig};
pub use media_kind::{
    classify, MediaFile, MediaKind, MediaTypeFilter, OutputLayout, DEFAULT_IMAGE_OUTPUT_DIR,
    DEFAULT_VIDEO_OUTPUT_DIR, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use progress::{create_progress_bar, format_duration};
pub use report::print_summary_report;
pub use safety::check_dangerous_directory;
pub use thread_manager::{resolve_worker_count, DEFAULT_WORKERS};
pub use tools::ToolPaths;
