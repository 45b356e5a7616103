//! In-process stand-in for ffmpeg used by the unit tests.

use shared_utils::common_utils::file_name_lossy;
use shared_utils::ffmpeg::{TranscodeJob, Transcoder};
use shared_utils::TranscodeError;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Writes a small file to the job output instead of encoding. Counts calls
/// and the highest number of calls that were running at the same time.
#[derive(Default)]
pub struct FakeTranscoder {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    fail_on: Vec<String>,
    panic_on: Vec<String>,
    write_empty: bool,
    jobs: Mutex<Vec<TranscodeJob>>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Write a truncated output, then exit like ffmpeg does on corrupt input.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on.push(name.to_string());
        self
    }

    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panic_on.push(name.to_string());
        self
    }

    pub fn writing_empty_output(mut self) -> Self {
        self.write_empty = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        std::thread::sleep(self.delay);

        let name = job.input().map(file_name_lossy).unwrap_or_default();
        if self.panic_on.contains(&name) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("simulated encoder crash on {}", name);
        }

        let outcome = if self.fail_on.contains(&name) {
            // ffmpeg has usually opened and started the output by the time it gives up
            fs::write(job.output(), b"partial")
                .map_err(|e| TranscodeError::io("fake write", e))
                .and(Err(TranscodeError::Failed {
                    tool: "ffmpeg".to_string(),
                    exit_code: Some(1),
                    stderr: "Invalid data found when processing input".to_string(),
                }))
        } else {
            let bytes: &[u8] = if self.write_empty { b"" } else { b"encoded" };
            fs::write(job.output(), bytes).map_err(|e| TranscodeError::io("fake write", e))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
