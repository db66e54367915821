//! arXiv id detection and normalization for a single input token.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

const ARXIV_HOST: &str = "arxiv.org";

/// Matches bare new-style (`2301.01234v2`) and old-style
/// (`hep-th/9901001`) arXiv ids, with an optional version suffix.
#[allow(clippy::expect_used)]
static ARXIV_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{4}\.\d{4,5}|[a-z\-]+(?:\.[a-z]{2})?/\d{7})(?:v\d+)?$")
        .expect("arXiv id regex is valid") // Static pattern, safe to panic
});

/// Returns the normalized arXiv id when the token is arXiv-shaped.
///
/// Accepts bare ids, `arxiv:`-prefixed ids, and `arxiv.org/abs|pdf` URLs.
#[must_use]
pub(crate) fn detect(input: &str) -> Option<String> {
    let trimmed = input.trim();

    if let Some(stripped) = strip_arxiv_prefix(trimmed) {
        return normalize_id(stripped);
    }

    if let Some(id) = extract_from_url(trimmed) {
        return Some(id);
    }

    normalize_id(trimmed)
}

fn strip_arxiv_prefix(input: &str) -> Option<&str> {
    if input.len() >= 6 && input[..6].eq_ignore_ascii_case("arxiv:") {
        Some(input[6..].trim_start())
    } else {
        None
    }
}

fn extract_from_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if !host.eq_ignore_ascii_case(ARXIV_HOST) {
        return None;
    }

    let path = parsed.path();
    if let Some(id) = path.strip_prefix("/abs/") {
        return normalize_id(id);
    }
    if let Some(id) = path.strip_prefix("/pdf/") {
        return normalize_id(id.strip_suffix(".pdf").unwrap_or(id));
    }

    None
}

fn normalize_id(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim().trim_matches('/');
    if ARXIV_ID_RE.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bare_new_style_id() {
        assert_eq!(detect("2301.01234").unwrap(), "2301.01234");
        assert_eq!(detect("2301.01234v2").unwrap(), "2301.01234v2");
    }

    #[test]
    fn test_detect_bare_old_style_id() {
        assert_eq!(detect("hep-th/9901001").unwrap(), "hep-th/9901001");
        assert_eq!(detect("math.GT/0309136").unwrap(), "math.GT/0309136");
    }

    #[test]
    fn test_detect_arxiv_prefix() {
        assert_eq!(detect("arXiv:2301.01234").unwrap(), "2301.01234");
        assert_eq!(detect("arxiv: 2301.01234v1").unwrap(), "2301.01234v1");
    }

    #[test]
    fn test_detect_abs_url() {
        assert_eq!(
            detect("https://arxiv.org/abs/2301.01234v2").unwrap(),
            "2301.01234v2"
        );
    }

    #[test]
    fn test_detect_pdf_url() {
        assert_eq!(
            detect("https://arxiv.org/pdf/2301.01234.pdf").unwrap(),
            "2301.01234"
        );
    }

    #[test]
    fn test_detect_www_host() {
        assert_eq!(
            detect("https://www.arxiv.org/abs/2301.01234").unwrap(),
            "2301.01234"
        );
    }

    #[test]
    fn test_detect_rejects_other_hosts() {
        assert!(detect("https://example.com/abs/2301.01234").is_none());
    }

    #[test]
    fn test_detect_rejects_non_arxiv_tokens() {
        assert!(detect("10.1234/example").is_none());
        assert!(detect("paper.pdf").is_none());
        assert!(detect("2301").is_none());
    }
}
