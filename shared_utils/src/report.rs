//! Report Module
//!
//! End-of-run summary box for batch operations.

use crate::batch::BatchResult;
use crate::progress::format_duration;
use console::style;
use std::fmt::Write as _;
use std::time::Duration;

const RULE: &str = "══════════════════════════════════════════════════════════════";

/// Summary box as a string. Plain text, callers add color.
pub fn render_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "╔{}╗", RULE);
    let _ = writeln!(out, "║  📊 {:<56}║", format!("{} Summary Report", operation_name));
    let _ = writeln!(out, "╠{}╣", RULE);
    let _ = writeln!(out, "║  📁 Files Processed:  {:>10}{:28}║", result.total, "");
    let _ = writeln!(out, "║  🔄 Converted:        {:>10}{:28}║", result.transcoded, "");
    let _ = writeln!(out, "║  📦 Moved:            {:>10}{:28}║", result.moved, "");
    let _ = writeln!(out, "║  ❌ Failed:           {:>10}{:28}║", result.failed, "");
    let _ = writeln!(out, "║  📈 Success Rate:     {:>9.1}%{:28}║", result.success_rate(), "");
    let _ = writeln!(out, "╠{}╣", RULE);
    let _ = writeln!(out, "║  ⏱️  Total Time:       {:>10}{:28}║", format_duration(duration), "");
    if result.total > 0 {
        let avg_time = duration.as_secs_f64() / result.total as f64;
        let _ = writeln!(out, "║  ⏱️  Avg Time/File:    {:>9.2}s{:28}║", avg_time, "");
    }
    let _ = write!(out, "╚{}╝", RULE);

    if !result.errors.is_empty() {
        let _ = write!(out, "\n\n❌ Errors encountered:");
        for (path, error) in &result.errors {
            let _ = write!(out, "\n   {} → {}", path.display(), error);
        }
    }

    out
}

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    let report = render_summary_report(result, duration, operation_name);
    println!();
    if result.all_succeeded() {
        println!("{}", style(report).green());
    } else {
        println!("{}", style(report).yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::ConversionResult;
    use crate::media_kind::{MediaFile, MediaKind};
    use std::path::Path;

    fn mixed_batch() -> BatchResult {
        let ok = MediaFile::new("/in/a.png", MediaKind::Image);
        let bad = MediaFile::new("/in/broken.mov", MediaKind::Video);
        let mut batch = BatchResult::new();
        batch.record(&ConversionResult::transcoded(&ok, Path::new("/out/a.jpg")));
        batch.record(&ConversionResult::failed(&bad, "ffmpeg failed (exit code 1)"));
        batch
    }

    #[test]
    fn test_report_lists_counts_and_errors() {
        let report = render_summary_report(&mixed_batch(), Duration::from_secs(10), "Media Convert");

        assert!(report.contains("Media Convert Summary Report"));
        assert!(report.contains("Files Processed:           2"));
        assert!(report.contains("50.0%"));
        assert!(report.contains("Avg Time/File:         5.00s"));
        assert!(report.contains("/in/broken.mov"));
        assert!(report.contains("exit code 1"));
    }

    #[test]
    fn test_report_empty_batch() {
        let report = render_summary_report(&BatchResult::new(), Duration::from_secs(1), "Test");
        assert!(report.contains("100.0%"));
        assert!(!report.contains("Avg Time/File"));
        assert!(!report.contains("Errors encountered"));
    }

    #[test]
    fn test_print_summary_report_no_panic() {
        print_summary_report(&mixed_batch(), Duration::from_secs(3), "Test");
        print_summary_report(&BatchResult::new(), Duration::ZERO, "Test");
    }
}
