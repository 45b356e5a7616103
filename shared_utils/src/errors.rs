use std::path::PathBuf;
use thiserror::Error;

/// Run-level failures. Any of these aborts a run before tasks are submitted.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Input folder not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to scan {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    UnsafeTarget(String),

    #[error("Failed to create worker pool: {0}")]
    WorkerPool(String),
}

/// Failure of a single external transcoder call or the file operations around it.
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed ({}): {stderr}", exit_label(.exit_code))]
    Failed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("output integrity check failed for {}: {reason}", .path.display())]
    BadOutput { path: PathBuf, reason: String },

    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TranscodeError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TranscodeError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failure to read dimensions from one file. Never fatal to a run.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe failed ({}): {stderr}", exit_label(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffprobe output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no video stream found")]
    NoVideoStream,

    #[error("video stream has no width/height")]
    MissingDimensions,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}
