//! Error types for run orchestration.

use std::path::PathBuf;

use thiserror::Error;

use crate::classify::ClassifyError;
use crate::resolve::ResolveError;

/// Pre-flight errors that abort the run before any sink is touched.
#[derive(Debug, Error)]
pub enum RunError {
    /// Input classification failed
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Title resolution failed fatally
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A declared PDF attachment does not exist
    #[error(
        "missing attachment '{}': the file does not exist\n  Suggestion: Check the path or drop it from --pdf",
        .path.display()
    )]
    MissingAttachment {
        /// The attachment path that failed validation
        path: PathBuf,
    },
}

impl RunError {
    /// Creates a `MissingAttachment` error.
    #[must_use]
    pub fn missing_attachment(path: impl Into<PathBuf>) -> Self {
        Self::MissingAttachment { path: path.into() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attachment_message() {
        let err = RunError::missing_attachment("/tmp/gone.pdf");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/gone.pdf"));
        assert!(msg.contains("--pdf"), "suggestion should mention --pdf");
    }

    #[test]
    fn test_classify_error_converts() {
        let err: RunError = crate::classify::ClassifyError::unrecognized("x").into();
        assert!(matches!(err, RunError::Classify(_)));
    }
}
