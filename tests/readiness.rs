// ABOUTME: Tests for the log-line readiness probe.
// ABOUTME: Uses a scripted runtime to feed container output in arbitrary frames.

mod support;

use natsbox::deploy::{READY_LOG_LINE, ReadinessError, wait_for_log_line};
use natsbox::runtime::LogError;
use natsbox::types::ContainerId;
use std::time::Duration;
use support::fake_runtime::{Call, FakeRuntime};

fn id() -> ContainerId {
    ContainerId::new("container-1")
}

#[tokio::test]
async fn ready_line_in_one_frame() {
    let runtime = FakeRuntime::new();

    wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(runtime.calls(), vec![Call::Logs(id())]);
}

#[tokio::test]
async fn ready_line_split_across_frames() {
    let runtime = FakeRuntime::new().with_output(
        &["[1] [INF] Server is", " re", "ady\n"],
        true,
    );

    wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_secs(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn several_lines_in_one_frame() {
    let runtime = FakeRuntime::new().with_output(
        &["[1] [INF] Starting\n[1] [INF] Server is ready\n[1] [INF] extra\n"],
        false,
    );

    wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_secs(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn times_out_when_line_never_appears() {
    let runtime = FakeRuntime::new().with_output(&["[1] [INF] Starting\n", "[1] [WRN] slow\n"], true);

    let err = wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_millis(50))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(
        message.starts_with("server not ready after 50ms"),
        "got: {message}"
    );

    match err {
        ReadinessError::Timeout {
            timeout,
            recent_output,
        } => {
            assert_eq!(timeout, Duration::from_millis(50));
            assert_eq!(recent_output, "[1] [INF] Starting\n[1] [WRN] slow");
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn output_ending_early_is_reported() {
    let runtime = FakeRuntime::new().with_output(&["fatal: bad flag\n"], false);

    let err = wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ReadinessError::OutputEnded { .. }));
    assert!(err.to_string().contains("fatal: bad flag"));
}

#[tokio::test]
async fn log_failure_is_propagated() {
    let runtime = FakeRuntime::new().failing_logs();

    let err = wait_for_log_line(&runtime, &id(), READY_LOG_LINE, Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReadinessError::Logs(LogError::ContainerNotFound(_))
    ));
}

#[tokio::test]
async fn custom_pattern() {
    let runtime = FakeRuntime::new().with_output(&["listening on 4222\n"], true);

    wait_for_log_line(&runtime, &id(), "listening on", Duration::from_secs(1))
        .await
        .unwrap();
}
