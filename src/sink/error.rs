//! Error types for sink operations.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while applying a sink. All of these are
/// non-fatal to the run: the orchestrator records them and keeps going.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// The external program could not be started at all
    #[error("external tool '{tool}' is not available: {reason}\n  Suggestion: {suggestion}")]
    ToolUnavailable {
        /// Program name that failed to spawn
        tool: String,
        /// Why the spawn failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The external program ran but exited unsuccessfully
    #[error("external tool '{tool}' failed ({status}): {stderr}\n  Suggestion: {suggestion}")]
    ToolFailed {
        /// Program name that failed
        tool: String,
        /// Exit status description
        status: String,
        /// Captured stderr, truncated
        stderr: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// A file write failed
    #[error("could not write '{path}': {reason}\n  Suggestion: {suggestion}")]
    WriteFailed {
        /// The path being written
        path: String,
        /// Why the write failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

const STDERR_PREVIEW_LEN: usize = 400;

impl SinkError {
    /// Creates a `ToolUnavailable` error for a spawn failure.
    #[must_use]
    pub fn tool_unavailable(tool: &str, reason: &str) -> Self {
        Self::ToolUnavailable {
            tool: tool.to_string(),
            reason: reason.to_string(),
            suggestion: format!("Install '{tool}' or point the matching PAPERFLOW_*_BIN at it"),
        }
    }

    /// Creates a `ToolFailed` error from an unsuccessful exit.
    #[must_use]
    pub fn tool_failed(tool: &str, status: &str, stderr: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(stderr).trim().to_string();
        let mut preview: String = raw.chars().take(STDERR_PREVIEW_LEN).collect();
        if raw.chars().count() > STDERR_PREVIEW_LEN {
            preview.push('…');
        }
        Self::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr: preview,
            suggestion: format!("Run '{tool}' by hand with the same inputs to inspect the failure"),
        }
    }

    /// Creates a `WriteFailed` error for a filesystem problem.
    #[must_use]
    pub fn write_failed(path: &Path, reason: &str) -> Self {
        Self::WriteFailed {
            path: path.display().to_string(),
            reason: reason.to_string(),
            suggestion: "Check the directory permissions and free space".to_string(),
        }
    }
}
