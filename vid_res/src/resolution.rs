//! Resolution solver
//!
//! Picks the smallest standard 16:9 resolution whose width and height both
//! cover the largest width and the largest height seen across a set of
//! videos. The two maxima may come from different files.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderEntry {
    pub label: &'static str,
    pub height: u32,
}

impl LadderEntry {
    pub const fn width(&self) -> u32 {
        self.height * 16 / 9
    }
}

/// Ascending by height. Widths follow from `height * 16 / 9` (integer
/// division), so 480p is 853 wide.
pub const STANDARD_LADDER: [LadderEntry; 8] = [
    LadderEntry { label: "144p", height: 144 },
    LadderEntry { label: "240p", height: 240 },
    LadderEntry { label: "360p", height: 360 },
    LadderEntry { label: "480p", height: 480 },
    LadderEntry { label: "720p", height: 720 },
    LadderEntry { label: "1080p", height: 1080 },
    LadderEntry { label: "1440p", height: 1440 },
    LadderEntry { label: "2160p", height: 2160 },
];

/// Returned when nothing on the ladder is large enough.
pub const FALLBACK_LABEL: &str = "2160p";
pub const FALLBACK_WIDTH: u32 = 3840;
pub const FALLBACK_HEIGHT: u32 = 2160;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetResolution {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl TargetResolution {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_LABEL, FALLBACK_WIDTH, FALLBACK_HEIGHT)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width >= width && self.height >= height
    }
}

impl From<&LadderEntry> for TargetResolution {
    fn from(entry: &LadderEntry) -> Self {
        Self::new(entry.label, entry.width(), entry.height)
    }
}

impl fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

/// Dimensions of one successfully probed video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSample {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ResolutionSample {
    pub fn new(file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// Largest width and height over a set of samples, with the files they came
/// from. On ties the first file seen keeps the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DimensionMaxima {
    pub max_width: u32,
    pub widest_file: Option<String>,
    pub max_height: u32,
    pub tallest_file: Option<String>,
}

impl DimensionMaxima {
    pub fn from_samples(samples: &[ResolutionSample]) -> Self {
        let mut maxima = Self::default();
        for sample in samples {
            if sample.width > maxima.max_width {
                maxima.max_width = sample.width;
                maxima.widest_file = Some(sample.file_name.clone());
            }
            if sample.height > maxima.max_height {
                maxima.max_height = sample.height;
                maxima.tallest_file = Some(sample.file_name.clone());
            }
        }
        maxima
    }
}

/// First ladder entry covering `max_width` x `max_height`, else the 2160p
/// fallback. Entries are tried by height, not by area.
pub fn fit_dimensions(max_width: u32, max_height: u32) -> TargetResolution {
    STANDARD_LADDER
        .iter()
        .find(|entry| entry.width() >= max_width && entry.height >= max_height)
        .map(TargetResolution::from)
        .unwrap_or_else(TargetResolution::fallback)
}

/// Target resolution for a set of samples. No samples gives 144p.
pub fn solve(samples: &[ResolutionSample]) -> TargetResolution {
    let maxima = DimensionMaxima::from_samples(samples);
    fit_dimensions(maxima.max_width, maxima.max_height)
}
