//! External tool lookup
//!
//! ffmpeg and ffprobe are located once at startup. An explicit environment
//! override wins, then `PATH` lookup via `which`, then the bare command name
//! (so a missing tool surfaces as a launch error on first use).

use std::path::{Path, PathBuf};
use tracing::debug;

pub const FFMPEG_ENV: &str = "MEDIA_NORMALIZE_FFMPEG";
pub const FFPROBE_ENV: &str = "MEDIA_NORMALIZE_FFPROBE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    pub fn detect() -> Self {
        Self {
            ffmpeg: resolve_tool("ffmpeg", std::env::var_os(FFMPEG_ENV)),
            ffprobe: resolve_tool("ffprobe", std::env::var_os(FFPROBE_ENV)),
        }
    }

    /// Names of the tools that could not be found on this system.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !is_resolved(&self.ffmpeg) {
            missing.push("ffmpeg");
        }
        if !is_resolved(&self.ffprobe) {
            missing.push("ffprobe");
        }
        missing
    }
}

fn resolve_tool(name: &str, env_override: Option<std::ffi::OsString>) -> PathBuf {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        debug!(tool = name, path = ?path, "using tool from environment");
        return PathBuf::from(path);
    }
    match which::which(name) {
        Ok(path) => {
            debug!(tool = name, path = %path.display(), "found tool on PATH");
            path
        }
        Err(_) => PathBuf::from(name),
    }
}

fn is_resolved(path: &Path) -> bool {
    path.is_file() || which::which(path).is_ok()
}
