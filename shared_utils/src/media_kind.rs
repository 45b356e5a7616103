//! Media classification
//!
//! Maps a path to an image or video kind from its extension alone, and knows
//! where converted output for each kind lives so that already converted files
//! are never picked up again.

use crate::common_utils::get_extension_lowercase;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif", "ico", "jfif", "pjpeg", "pjp",
    "avif", "heic", "heif",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp", "mpg", "mpeg", "m2v", "ogv",
    "mts", "ts", "vob",
];

/// Extensions that are already in the canonical format for their kind.
const CANONICAL_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];
const CANONICAL_VIDEO_EXTENSIONS: &[&str] = &["mp4"];

pub const DEFAULT_IMAGE_OUTPUT_DIR: &str = "JPG_CONVERTED";
pub const DEFAULT_VIDEO_OUTPUT_DIR: &str = "MP4_CONVERTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = get_extension_lowercase(path);
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Extension written for converted output of this kind.
    pub fn canonical_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }

    /// True when `path` can be moved as-is instead of re-encoded.
    pub fn is_canonical(&self, path: &Path) -> bool {
        let ext = get_extension_lowercase(path);
        let canonical = match self {
            MediaKind::Image => CANONICAL_IMAGE_EXTENSIONS,
            MediaKind::Video => CANONICAL_VIDEO_EXTENSIONS,
        };
        canonical.contains(&ext.as_str())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kinds a run should touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTypeFilter {
    Images,
    Videos,
    #[default]
    Both,
}

impl MediaTypeFilter {
    pub fn kinds(&self) -> &'static [MediaKind] {
        match self {
            MediaTypeFilter::Images => &[MediaKind::Image],
            MediaTypeFilter::Videos => &[MediaKind::Video],
            MediaTypeFilter::Both => &[MediaKind::Image, MediaKind::Video],
        }
    }

    pub fn includes(&self, kind: MediaKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// Names of the sibling output directories created under a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub image_dir: String,
    pub video_dir: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            image_dir: DEFAULT_IMAGE_OUTPUT_DIR.to_string(),
            video_dir: DEFAULT_VIDEO_OUTPUT_DIR.to_string(),
        }
    }
}

impl OutputLayout {
    pub fn dir_name(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.image_dir,
            MediaKind::Video => &self.video_dir,
        }
    }

    pub fn output_dir(&self, root: &Path, kind: MediaKind) -> PathBuf {
        root.join(self.dir_name(kind))
    }

    pub fn is_output_dir_name(&self, name: &OsStr) -> bool {
        name == OsStr::new(&self.image_dir) || name == OsStr::new(&self.video_dir)
    }
}

/// A discovered file together with its kind. Owned by exactly one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn file_name(&self) -> String {
        crate::common_utils::file_name_lossy(&self.path)
    }
}

/// Classify `path` by extension.
///
/// Returns `None` for unknown extensions and for files that sit anywhere below
/// the output directory of their own kind. Callers should pass the path
/// relative to the scan root so that the root's own ancestors do not matter.
pub fn classify(path: &Path, layout: &OutputLayout) -> Option<MediaKind> {
    let kind = MediaKind::from_extension(path)?;
    let marker = OsStr::new(layout.dir_name(kind));
    let inside_output = path
        .parent()
        .map(|dir| dir.components().any(|c| c.as_os_str() == marker))
        .unwrap_or(false);

    if inside_output {
        None
    } else {
        Some(kind)
    }
}
