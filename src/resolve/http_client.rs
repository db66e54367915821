//! Shared HTTP client construction policy for metadata sources.
//!
//! Centralizes networking defaults so sources stay consistent on timeout,
//! user-agent, and compression.

use std::time::Duration;

use reqwest::Client;

use super::ResolveError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// One shared user-agent for every metadata source.
#[must_use]
pub fn standard_user_agent() -> String {
    format!(
        "paperflow/{} (personal research-note tool; +https://github.com/fierce/paperflow)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Builds a metadata-source HTTP client using shared project policy.
///
/// # Errors
///
/// Returns [`ResolveError`] when client construction fails.
pub fn build_source_http_client(source_name: &str) -> Result<Client, ResolveError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .user_agent(standard_user_agent())
        .gzip(true)
        .build()
        .map_err(|e| {
            ResolveError::lookup_failed(
                source_name,
                source_name,
                &format!("HTTP client construction failed: {e}"),
            )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_user_agent_identifies_tool() {
        let ua = standard_user_agent();
        assert!(ua.contains("paperflow/"), "UA must identify the tool");
        assert!(ua.contains("github.com"), "UA must carry the project URL");
    }

    #[test]
    fn test_build_source_http_client_succeeds() {
        assert!(build_source_http_client("test").is_ok());
    }
}
