//! Error types for identifier classification.

use thiserror::Error;

/// Errors that can occur while classifying an input token.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// Input matched no identifier rule and is not an existing file path
    #[error("invalid identifier '{input}': {reason}\n  Suggestion: {suggestion}")]
    InvalidIdentifier {
        /// The input that failed classification
        input: String,
        /// Why classification failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl ClassifyError {
    /// Creates an `InvalidIdentifier` error for empty input.
    #[must_use]
    pub fn empty() -> Self {
        Self::InvalidIdentifier {
            input: String::new(),
            reason: "input is empty".to_string(),
            suggestion: "Pass a DOI, arXiv id, URL, or local file path".to_string(),
        }
    }

    /// Creates an `InvalidIdentifier` error for a token no rule matched.
    #[must_use]
    pub fn unrecognized(input: &str) -> Self {
        Self::InvalidIdentifier {
            input: input.to_string(),
            reason: "not a DOI, arXiv id, URL, or existing file path".to_string(),
            suggestion: "Check the identifier format, or the path if it names a local file"
                .to_string(),
        }
    }
}
