//! Error types for metadata resolution.

use thiserror::Error;

/// Errors that can occur during metadata resolution.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A single metadata source failed; the chain falls through to the next
    #[error("metadata lookup via {source} failed for '{input}': {reason}\n  Suggestion: {suggestion}")]
    LookupFailed {
        /// The source that failed (e.g., "doi.org", "crossref")
        source: String,
        /// The identifier being resolved
        input: String,
        /// Why the lookup failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// No source (including the filename fallback) produced a title; fatal
    #[error(
        "could not resolve a title for '{input}' after trying {tried} source(s)\n  Suggestion: Pass --title to set one manually"
    )]
    UnresolvedTitle {
        /// The identifier that could not be resolved
        input: String,
        /// Number of sources attempted
        tried: usize,
    },
}

impl ResolveError {
    /// Creates a `LookupFailed` error for a single source.
    #[must_use]
    pub fn lookup_failed(source: &str, input: &str, reason: &str) -> Self {
        Self::LookupFailed {
            source: source.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
            suggestion: "Check your network connection and the identifier".to_string(),
        }
    }

    /// Creates an `UnresolvedTitle` error.
    #[must_use]
    pub fn unresolved_title(input: &str, tried: usize) -> Self {
        Self::UnresolvedTitle {
            input: input.to_string(),
            tried,
        }
    }
}
