//! Pipeline test module
//!
//! End-to-end runs over temporary folders with an in-process transcoder.

#[cfg(test)]
mod end_to_end_tests {
    use crate::pipeline::*;
    use crate::test_support::FakeTranscoder;
    use shared_utils::{ConversionAction, ConversionResult, MediaTypeFilter};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, format!("source {}", path.display())).unwrap();
    }

    fn pipeline(fake: &Arc<FakeTranscoder>, workers: usize) -> Pipeline {
        Pipeline::new(
            fake.clone(),
            PipelineConfig {
                max_workers: workers,
                ..PipelineConfig::default()
            },
        )
    }

    #[test]
    fn test_mixed_folder_with_two_workers() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("a.png"));
        touch(&root.join("b.jpg"));
        touch(&root.join("c.mov"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = pipeline(&fake, 2).run(root, MediaTypeFilter::Both).unwrap();

        assert!(report.all_succeeded());
        assert_eq!(report.summary.succeeded, 3);
        assert_eq!(report.summary.transcoded, 2);
        assert_eq!(report.summary.moved, 1);
        assert!(root.join("JPG_CONVERTED/a.jpg").is_file());
        assert!(root.join("JPG_CONVERTED/b.jpg").is_file());
        assert!(root.join("MP4_CONVERTED/c.mp4").is_file());
        assert!(!root.join("a.png").exists());
        assert!(!root.join("b.jpg").exists());
        assert!(!root.join("c.mov").exists());
        assert_eq!(fake.calls(), 2, "b.jpg takes the fast path");
    }

    #[test]
    fn test_nested_sources_flatten_into_root_output_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("2024/summer/beach.heic"));
        touch(&root.join("2024/clips/dive.mkv"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = pipeline(&fake, 4).run(root, MediaTypeFilter::Both).unwrap();

        assert!(report.all_succeeded());
        assert!(root.join("JPG_CONVERTED/beach.jpg").is_file());
        assert!(root.join("MP4_CONVERTED/dive.mp4").is_file());
    }

    #[test]
    fn test_second_run_does_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("a.png"));
        touch(&root.join("b.jpeg"));
        touch(&root.join("c.avi"));

        let first = pipeline(&Arc::new(FakeTranscoder::new()), 2)
            .run(root, MediaTypeFilter::Both)
            .unwrap();
        assert_eq!(first.summary.total, 3);

        let fake = Arc::new(FakeTranscoder::new());
        let second = pipeline(&fake, 2).run(root, MediaTypeFilter::Both).unwrap();

        assert!(second.is_empty());
        assert!(second.all_succeeded());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_workers_bound_concurrent_transcodes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for i in 0..12 {
            touch(&root.join(format!("clip_{:02}.mov", i)));
        }
        let fake = Arc::new(FakeTranscoder::new().with_delay(std::time::Duration::from_millis(30)));

        let report = pipeline(&fake, 3).run(root, MediaTypeFilter::Videos).unwrap();

        assert_eq!(report.summary.total, 12);
        assert!(report.all_succeeded());
        assert_eq!(fake.calls(), 12);
        assert!(
            fake.max_in_flight() <= 3,
            "at most 3 concurrent transcodes, saw {}",
            fake.max_in_flight()
        );
        assert!(fake.max_in_flight() >= 1);
    }

    #[test]
    fn test_one_failure_does_not_affect_others() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("good1.png"));
        touch(&root.join("broken.png"));
        touch(&root.join("good2.bmp"));
        let fake = Arc::new(FakeTranscoder::new().failing_on("broken.png"));

        let report = pipeline(&fake, 2).run(root, MediaTypeFilter::Images).unwrap();

        assert!(!report.all_succeeded());
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(root.join("broken.png").exists());
        assert!(!root.join("JPG_CONVERTED/broken.jpg").exists());
        assert!(root.join("JPG_CONVERTED/good1.jpg").exists());
        assert!(root.join("JPG_CONVERTED/good2.jpg").exists());

        let failed: Vec<&ConversionResult> = report.results.iter().filter(|r| !r.success).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source_name, "broken.png");
        assert_eq!(failed[0].action, ConversionAction::Failed);
    }

    #[test]
    fn test_panicking_task_becomes_failed_result() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("boom.gif"));
        touch(&root.join("fine.gif"));
        let fake = Arc::new(FakeTranscoder::new().panicking_on("boom.gif"));

        let report = pipeline(&fake, 2).run(root, MediaTypeFilter::Images).unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.failed, 1);
        let boom = report
            .results
            .iter()
            .find(|r| r.source_name == "boom.gif")
            .unwrap();
        assert!(boom.message.contains("worker panicked"));
        assert!(root.join("boom.gif").exists());
        let mut outputs: Vec<String> = fs::read_dir(root.join("JPG_CONVERTED"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        outputs.sort();
        assert_eq!(outputs, vec!["fine.jpg"], "partial output removed on unwind");
    }

    #[test]
    fn test_filter_leaves_other_kind_alone() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("a.png"));
        touch(&root.join("c.mov"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = pipeline(&fake, 2).run(root, MediaTypeFilter::Images).unwrap();

        assert_eq!(report.summary.total, 1);
        assert!(root.join("c.mov").exists());
        assert!(root.join("JPG_CONVERTED").is_dir());
        assert!(!root.join("MP4_CONVERTED").exists());
    }

    #[test]
    fn test_empty_root_creates_output_dirs_and_reports_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("notes.txt"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = pipeline(&fake, 4).run(root, MediaTypeFilter::Both).unwrap();

        assert!(report.is_empty());
        assert!(report.all_succeeded());
        assert!(root.join("JPG_CONVERTED").is_dir());
        assert!(root.join("MP4_CONVERTED").is_dir());
        assert!(root.join("notes.txt").exists());
    }

    #[test]
    fn test_observer_sees_every_result() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["a.png", "b.tif", "c.webm", "d.mp4"] {
            touch(&root.join(name));
        }
        let fake = Arc::new(FakeTranscoder::new());

        struct Recorder {
            total: Option<usize>,
            seen: Vec<String>,
        }
        impl RunObserver for Recorder {
            fn on_start(&mut self, total: usize) {
                self.total = Some(total);
            }
            fn on_result(&mut self, result: &ConversionResult) {
                self.seen.push(result.source_name.clone());
            }
        }

        let mut recorder = Recorder {
            total: None,
            seen: Vec::new(),
        };
        let report = pipeline(&fake, 2)
            .run_with_observer(root, MediaTypeFilter::Both, &mut recorder)
            .unwrap();

        assert_eq!(recorder.total, Some(4));
        recorder.seen.sort();
        assert_eq!(recorder.seen, vec!["a.png", "b.tif", "c.webm", "d.mp4"]);
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn test_closure_observer() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.png"));
        let fake = Arc::new(FakeTranscoder::new());
        let mut count = 0usize;

        pipeline(&fake, 1)
            .run_with_observer(temp.path(), MediaTypeFilter::Both, &mut |_: &ConversionResult| {
                count += 1
            })
            .unwrap();

        assert_eq!(count, 1);
    }

    #[test]
    fn test_run_helper_uses_defaults() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("x.gif"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = run(fake.clone(), temp.path(), MediaTypeFilter::Both, 1).unwrap();

        assert!(report.all_succeeded());
        assert!(temp.path().join("JPG_CONVERTED/x.jpg").is_file());
    }

    #[test]
    fn test_output_dir_blocked_by_file_is_setup_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("a.png"));
        touch(&root.join("c.mov"));
        fs::write(root.join("JPG_CONVERTED"), b"not a directory").unwrap();
        let fake = Arc::new(FakeTranscoder::new());

        let err = pipeline(&fake, 2).run(root, MediaTypeFilter::Both).unwrap_err();

        match err {
            shared_utils::MediaError::OutputDir { path, .. } => {
                assert_eq!(path, root.join("JPG_CONVERTED"))
            }
            other => panic!("expected output dir error, got {:?}", other),
        }
        assert_eq!(fake.calls(), 0);
        assert!(root.join("a.png").exists());
        assert!(root.join("c.mov").exists());
        assert!(root.join("JPG_CONVERTED").is_file());
    }

    #[test]
    fn test_missing_root_is_setup_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let fake = Arc::new(FakeTranscoder::new());

        let err = pipeline(&fake, 2).run(&missing, MediaTypeFilter::Both).unwrap_err();

        assert!(matches!(err, shared_utils::MediaError::InputNotFound(_)));
        assert!(!missing.exists());
    }

    #[test]
    fn test_report_serializes() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.png"));
        let fake = Arc::new(FakeTranscoder::new());

        let report = pipeline(&fake, 1).run(temp.path(), MediaTypeFilter::Both).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["total"], 1);
        assert_eq!(json["results"][0]["action"], "transcoded");
        assert_eq!(json["results"][0]["source_name"], "a.png");
    }
}
