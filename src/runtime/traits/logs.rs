// ABOUTME: Log operations trait for container runtimes.
// ABOUTME: Stream container output, used as the server readiness signal.

use crate::types::ContainerId;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of log chunks as produced by the runtime.
pub type LogLineStream = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

/// Log streaming operations.
#[async_trait]
pub trait LogOps: Send + Sync {
    /// Stream logs from a container.
    async fn container_logs(
        &self,
        id: &ContainerId,
        opts: &LogOptions,
    ) -> Result<LogLineStream, LogError>;
}

/// Options for log streaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Follow log output (like `tail -f`).
    pub follow: bool,
    /// Prefix each chunk with a timestamp.
    pub timestamps: bool,
    /// Number of lines to show from end (None = all).
    pub tail: Option<u64>,
}

impl LogOptions {
    /// Follow stdout and stderr from the beginning, without timestamps.
    pub fn follow_output() -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: true,
            timestamps: false,
            tail: None,
        }
    }
}

/// A chunk of container output.
///
/// Runtimes deliver output in frames that may hold several lines or a
/// partial line, so consumers must not assume one line per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub content: String,
    pub stream: LogStream,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
