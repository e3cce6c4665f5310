// ABOUTME: Log-line readiness probe for freshly started containers.
// ABOUTME: Follows container output until a marker line appears or the deadline passes.

use crate::runtime::{LogError, LogOps, LogOptions};
use crate::types::ContainerId;
use futures::StreamExt;
use humantime_serde::re::humantime;
use std::collections::VecDeque;
use std::time::Duration;

/// Line the NATS server prints once it accepts client connections.
pub const READY_LOG_LINE: &str = "Server is ready";

/// Lines of output kept for error reports.
const RECENT_LINES: usize = 20;

/// Bytes of an unterminated line kept beyond the pattern length.
const MAX_PARTIAL: usize = 4096;

/// Readiness rule: wait until `pattern` shows up in the container output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub pattern: String,
    pub timeout: Duration,
}

impl ReadinessProbe {
    pub fn log_line(pattern: impl Into<String>, timeout: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            timeout,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessError {
    #[error("server not ready after {}\n\nRecent output:\n{recent_output}", format_timeout(.timeout))]
    Timeout {
        timeout: Duration,
        recent_output: String,
    },

    #[error("container output ended before the server became ready\n\nRecent output:\n{recent_output}")]
    OutputEnded { recent_output: String },

    #[error("failed to read container output: {0}")]
    Logs(#[from] LogError),
}

fn format_timeout(timeout: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*timeout)
}

/// Block until `pattern` appears in the container's stdout or stderr.
///
/// Output frames may split or merge lines, so matching runs on a buffer of
/// the current partial line plus the incoming frame.
pub async fn wait_for_log_line<R: LogOps + ?Sized>(
    runtime: &R,
    id: &ContainerId,
    pattern: &str,
    timeout: Duration,
) -> Result<(), ReadinessError> {
    let mut scanner = LineScanner::new(pattern);

    let outcome = tokio::time::timeout(timeout, scan_output(runtime, id, &mut scanner)).await;

    match outcome {
        Ok(result) => result,
        Err(_elapsed) => Err(ReadinessError::Timeout {
            timeout,
            recent_output: scanner.recent_output(),
        }),
    }
}

async fn scan_output<R: LogOps + ?Sized>(
    runtime: &R,
    id: &ContainerId,
    scanner: &mut LineScanner<'_>,
) -> Result<(), ReadinessError> {
    let mut stream = runtime
        .container_logs(id, &LogOptions::follow_output())
        .await?;

    while let Some(chunk) = stream.next().await {
        if scanner.push(&chunk?.content) {
            tracing::debug!(container = %id, "readiness line observed");
            return Ok(());
        }
    }

    Err(ReadinessError::OutputEnded {
        recent_output: scanner.recent_output(),
    })
}

struct LineScanner<'a> {
    pattern: &'a str,
    partial: String,
    recent: VecDeque<String>,
}

impl<'a> LineScanner<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            partial: String::new(),
            recent: VecDeque::with_capacity(RECENT_LINES),
        }
    }

    /// Feed one frame; returns true once the pattern has been seen.
    fn push(&mut self, chunk: &str) -> bool {
        self.partial.push_str(chunk);
        if self.partial.contains(self.pattern) {
            return true;
        }

        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.recent.len() == RECENT_LINES {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }

        // Bound an unterminated line; the kept tail is longer than the pattern.
        let limit = self.pattern.len() + MAX_PARTIAL;
        if self.partial.len() > limit {
            let mut cut = self.partial.len() - limit;
            while !self.partial.is_char_boundary(cut) {
                cut += 1;
            }
            self.partial.drain(..cut);
        }
        false
    }

    fn recent_output(&self) -> String {
        let mut lines: Vec<&str> = self.recent.iter().map(String::as_str).collect();
        if !self.partial.is_empty() {
            lines.push(&self.partial);
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_matches_within_a_single_frame() {
        let mut scanner = LineScanner::new(READY_LOG_LINE);
        assert!(scanner.push("[1] [INF] Server is ready\n"));
    }

    #[test]
    fn scanner_matches_across_frames() {
        let mut scanner = LineScanner::new(READY_LOG_LINE);
        assert!(!scanner.push("[1] [INF] Server is r"));
        assert!(scanner.push("eady\n"));
    }

    #[test]
    fn scanner_keeps_only_recent_lines() {
        let mut scanner = LineScanner::new(READY_LOG_LINE);
        for i in 0..(RECENT_LINES + 5) {
            assert!(!scanner.push(&format!("line {i}\n")));
        }
        let output = scanner.recent_output();
        assert!(!output.contains("line 4\n"));
        assert!(output.starts_with("line 5"));
        assert!(output.ends_with(&format!("line {}", RECENT_LINES + 4)));
    }

    #[test]
    fn unterminated_output_is_bounded() {
        let mut scanner = LineScanner::new(READY_LOG_LINE);
        for _ in 0..10 {
            assert!(!scanner.push(&"é".repeat(1000)));
        }
        assert!(scanner.partial.len() <= READY_LOG_LINE.len() + MAX_PARTIAL);

        assert!(!scanner.push("Server is r"));
        assert!(scanner.push("eady"));
    }

    #[test]
    fn recent_output_includes_partial_line() {
        let mut scanner = LineScanner::new(READY_LOG_LINE);
        scanner.push("first\nsecond half");
        assert_eq!(scanner.recent_output(), "first\nsecond half");
    }
}
