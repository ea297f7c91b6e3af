//! Tests for running coqtop through the caching collector.

use std::time::Duration;

use coq_defsplit::coqtop::{
    run, CollectError, CoqtopCommand, MemoryStore, NoStore, TimeoutSpec, TranscriptCollector,
    TIMEOUT_MARKER,
};
use tempfile::TempDir;

fn script(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("script.sh");
    std::fs::write(&path, body).unwrap();
    path.display().to_string()
}

#[tokio::test]
async fn run_captures_stdout_and_stderr_together() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "echo out; echo err >&2; echo again\n");
    let command = CoqtopCommand::new("sh").arg(path);

    let output = run(&command, None).await.unwrap();

    assert_eq!(output.output, "out\nerr\nagain\n");
    assert_eq!(output.exit_code, Some(0));
    assert!(!output.timed_out);
}

#[tokio::test]
async fn run_feeds_input_on_stdin() {
    let command = CoqtopCommand::new("cat").input("Check nat.\r\n\r\n");

    let output = run(&command, None).await.unwrap();

    assert_eq!(output.output, "Check nat.\n\n");
}

#[tokio::test]
async fn run_uses_working_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
    let command = CoqtopCommand::new("cat")
        .arg("marker.txt")
        .working_dir(dir.path());

    let output = run(&command, None).await.unwrap();

    assert_eq!(output.output, "here");
}

#[tokio::test]
async fn run_marks_timeouts() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "echo started\nexec sleep 30\n");
    let command = CoqtopCommand::new("sh").arg(path);

    let output = run(&command, Some(Duration::from_millis(300))).await.unwrap();

    assert!(output.timed_out);
    assert!(output.output.starts_with("started\n"));
    assert!(output.output.ends_with(TIMEOUT_MARKER));
    assert!(output.elapsed < Duration::from_secs(10));
}

#[tokio::test]
async fn run_reports_missing_binary() {
    let command = CoqtopCommand::new("/nonexistent/coqtop-binary");

    let err = run(&command, None).await.unwrap_err();

    assert!(matches!(err, CollectError::NotFound(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn collector_reuses_cached_output() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "date +%s%N\n");
    let command = CoqtopCommand::new("sh")
        .arg(path)
        .timeout(TimeoutSpec::Unlimited);
    let mut collector = TranscriptCollector::<MemoryStore>::default();

    let first = collector.collect(&command).await.unwrap();
    let second = collector.collect(&command).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(collector.runs(), 1);
    assert_eq!(collector.store().len(), 1);
}

#[tokio::test]
async fn collector_runs_again_after_invalidate() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "echo ok\n");
    let command = CoqtopCommand::new("sh")
        .arg(path)
        .timeout(TimeoutSpec::Unlimited);
    let mut collector = TranscriptCollector::<MemoryStore>::default();

    collector.collect(&command).await.unwrap();
    assert!(collector.invalidate(&command));
    collector.collect(&command).await.unwrap();

    assert_eq!(collector.runs(), 2);
    assert!(!collector.invalidate(&command.clone().input("other")));
}

#[tokio::test]
async fn collector_without_store_always_runs() {
    let command = CoqtopCommand::new("true").timeout(TimeoutSpec::Unlimited);
    let mut collector = TranscriptCollector::new(NoStore);

    collector.collect(&command).await.unwrap();
    collector.collect(&command).await.unwrap();

    assert_eq!(collector.runs(), 2);
}

#[tokio::test]
async fn collector_learns_timeout_from_first_bounded_run() {
    let mut collector = TranscriptCollector::<MemoryStore>::default();

    collector
        .collect(&CoqtopCommand::new("true").timeout(TimeoutSpec::Unlimited))
        .await
        .unwrap();
    assert_eq!(collector.timeouts().learned(), None);

    collector
        .collect(&CoqtopCommand::new("true").arg("first"))
        .await
        .unwrap();
    assert_eq!(collector.timeouts().learned(), Some(Duration::from_secs(3)));

    collector.reset_timeout();
    assert_eq!(collector.timeouts().learned(), None);
}

#[tokio::test]
async fn collector_does_not_retry_missing_binary() {
    let command = CoqtopCommand::new("/nonexistent/coqtop-binary");
    let mut collector =
        TranscriptCollector::<MemoryStore>::default().with_retries(3, Duration::from_millis(1));

    let err = collector.collect(&command).await.unwrap_err();

    assert!(matches!(err, CollectError::NotFound(_)));
    assert_eq!(collector.runs(), 1);
    assert!(collector.store().is_empty());
}
