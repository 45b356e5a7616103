//! Safety Module
//!
//! Conversion deletes originals, so it must never be pointed at a system
//! directory or straight at a home directory.

use crate::errors::MediaError;
use std::path::Path;

const DANGEROUS_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

pub fn check_dangerous_directory(path: &Path) -> Result<(), MediaError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    for candidate in [path, canonical.as_path()] {
        let path_str = candidate.to_string_lossy();
        let trimmed = if path_str.len() > 1 {
            path_str.trim_end_matches('/')
        } else {
            path_str.as_ref()
        };
        if DANGEROUS_DIRS.contains(&trimmed) {
            return Err(MediaError::UnsafeTarget(format!(
                "Refusing to operate on '{}': it is a protected system directory. \
                 Please specify a safe subdirectory instead.",
                trimmed
            )));
        }
    }

    // /home/<user> and /Users/<user> themselves
    let depth = canonical.components().count();
    let path_str = canonical.to_string_lossy();
    if depth <= 3 && (path_str.starts_with("/Users/") || path_str.starts_with("/home/")) {
        return Err(MediaError::UnsafeTarget(format!(
            "Refusing to operate on '{}': it is too close to a home directory root. \
             Please specify a subdirectory like ~/Pictures/phone instead.",
            path.display()
        )));
    }

    Ok(())
}
