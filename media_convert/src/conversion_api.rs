//! Conversion API Module
//!
//! Converts one discovered file into its canonical format inside an output
//! directory. Files that are already canonical are moved without touching the
//! transcoder. The original is deleted only once the new file has been
//! written and verified.

use serde::{Deserialize, Serialize};
use shared_utils::common_utils::move_file;
use shared_utils::conversion::{safe_delete_original, verify_output_integrity, ConversionResult};
use shared_utils::ffmpeg::{ImageEncodeParams, TranscodeJob, Transcoder, VideoEncodeParams};
use shared_utils::media_kind::{MediaFile, MediaKind};
use shared_utils::TranscodeError;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do when the output name is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail the file and leave both the original and the existing output alone.
    #[default]
    Error,
    /// Pick the first free `<stem>_<n>.<ext>`.
    Suffix,
    /// Replace the existing output.
    Overwrite,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    pub image: ImageEncodeParams,
    pub video: VideoEncodeParams,
    pub collision: CollisionPolicy,
}

/// Hidden sibling of the final output that the transcoder writes into.
/// Removed again on drop unless it was renamed into place, which also covers
/// unwinding out of the transcoder.
#[derive(Debug)]
struct PartialOutput {
    path: PathBuf,
    armed: bool,
}

impl PartialOutput {
    /// Claim `.<stem>.part.<ext>` (or `.<stem>_<n>.part.<ext>`) with
    /// `create_new`. The real extension stays last so ffmpeg still picks the
    /// muxer from the name.
    fn create(dir: &Path, stem: &str, ext: &str) -> Result<Self, TranscodeError> {
        let mut n = 0u32;
        loop {
            let name = if n == 0 {
                format!(".{}.part.{}", stem, ext)
            } else {
                format!(".{}_{}.part.{}", stem, n, ext)
            };
            let path = dir.join(name);
            match create_placeholder(&path) {
                Ok(()) => return Ok(Self { path, armed: true }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => {
                    return Err(TranscodeError::io(
                        format!("failed to create {}", path.display()),
                        e,
                    ))
                }
            }
        }
    }

    /// Rename over `dest`, replacing whatever is there.
    fn persist(&mut self, dest: &Path) -> io::Result<()> {
        fs::rename(&self.path, dest)?;
        self.armed = false;
        Ok(())
    }

    /// Leave the file where it is.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove partial output");
            }
        }
    }
}

pub struct TranscodeAdapter {
    transcoder: Arc<dyn Transcoder>,
    config: ConversionConfig,
}

impl TranscodeAdapter {
    pub fn new(transcoder: Arc<dyn Transcoder>, config: ConversionConfig) -> Self {
        Self { transcoder, config }
    }

    /// Convert `file` into `output_dir`. Never panics on I/O or tool errors;
    /// every failure is returned as an unsuccessful [`ConversionResult`].
    pub fn convert(&self, file: &MediaFile, output_dir: &Path) -> ConversionResult {
        match self.try_convert(file, output_dir) {
            Ok(result) => {
                debug!(file = %file.path.display(), message = %result.message, "conversion finished");
                result
            }
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "conversion failed");
                ConversionResult::failed(file, e)
            }
        }
    }

    fn try_convert(
        &self,
        file: &MediaFile,
        output_dir: &Path,
    ) -> Result<ConversionResult, TranscodeError> {
        let stem = output_name_stem(&file.path);
        let ext = file.kind.canonical_extension();
        let policy = self.config.collision;

        if policy == CollisionPolicy::Error {
            let primary = output_dir.join(format!("{}.{}", stem, ext));
            if primary.exists() {
                return Err(TranscodeError::OutputExists(primary));
            }
        }

        let mut partial = PartialOutput::create(output_dir, &stem, ext)?;

        if file.kind.is_canonical(&file.path) {
            move_file(&file.path, &partial.path).map_err(|e| {
                TranscodeError::io(format!("failed to move into {}", output_dir.display()), e)
            })?;
            return match place_output(&mut partial, output_dir, &stem, ext, policy) {
                Ok(dest) => Ok(ConversionResult::moved(file, &dest)),
                Err(e) => {
                    if let Err(restore) = move_file(&partial.path, &file.path) {
                        warn!(
                            original = %file.path.display(),
                            kept_at = %partial.path.display(),
                            error = %restore,
                            "failed to move original back"
                        );
                        partial.keep();
                    }
                    Err(e)
                }
            };
        }

        let job = self.job_for(file, &partial.path);
        self.transcoder.transcode(&job)?;
        verify_output_integrity(&partial.path).map_err(|reason| TranscodeError::BadOutput {
            path: partial.path.clone(),
            reason,
        })?;

        let dest = place_output(&mut partial, output_dir, &stem, ext, policy)?;
        // a failed delete keeps the verified output and reports the file as failed
        safe_delete_original(&file.path, &dest)?;
        Ok(ConversionResult::transcoded(file, &dest))
    }

    fn job_for(&self, file: &MediaFile, output: &Path) -> TranscodeJob {
        match file.kind {
            MediaKind::Image => TranscodeJob::Image {
                input: file.path.clone(),
                output: output.to_path_buf(),
                params: self.config.image,
            },
            MediaKind::Video => TranscodeJob::Video {
                input: file.path.clone(),
                output: output.to_path_buf(),
                params: self.config.video.clone(),
            },
        }
    }
}

fn output_name_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Rename a finished, verified partial output to its final name in `dir`.
///
/// `Error` and `Suffix` claim the final name with `create_new` right before
/// the rename, so two tasks can never land on the same file and an existing
/// output is never replaced. `Overwrite` renames over the existing file,
/// which stays intact until the new one is complete.
fn place_output(
    partial: &mut PartialOutput,
    dir: &Path,
    stem: &str,
    ext: &str,
    policy: CollisionPolicy,
) -> Result<PathBuf, TranscodeError> {
    let primary = dir.join(format!("{}.{}", stem, ext));

    match policy {
        CollisionPolicy::Overwrite => {
            partial.persist(&primary).map_err(|e| {
                TranscodeError::io(format!("failed to replace {}", primary.display()), e)
            })?;
            Ok(primary)
        }
        CollisionPolicy::Error => {
            if !claim_name(&primary)? {
                return Err(TranscodeError::OutputExists(primary));
            }
            persist_claimed(partial, &primary)?;
            Ok(primary)
        }
        CollisionPolicy::Suffix => {
            let mut candidate = primary;
            let mut n = 0u32;
            while !claim_name(&candidate)? {
                n += 1;
                candidate = dir.join(format!("{}_{}.{}", stem, n, ext));
            }
            persist_claimed(partial, &candidate)?;
            Ok(candidate)
        }
    }
}

/// True when `path` was free and is now ours.
fn claim_name(path: &Path) -> Result<bool, TranscodeError> {
    match create_placeholder(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(TranscodeError::io(
            format!("failed to create {}", path.display()),
            e,
        )),
    }
}

fn persist_claimed(partial: &mut PartialOutput, claimed: &Path) -> Result<(), TranscodeError> {
    partial.persist(claimed).map_err(|e| {
        if let Err(rm) = fs::remove_file(claimed) {
            warn!(path = %claimed.display(), error = %rm, "failed to release claimed name");
        }
        TranscodeError::io(format!("failed to rename into {}", claimed.display()), e)
    })
}

fn create_placeholder(path: &Path) -> io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
}
