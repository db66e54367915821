//! DOI detection, validation, and normalization for a single input token.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Whole-token shape of a bare DOI: `10.<registrant>/<suffix>`, where the
/// registrant may carry nested numeric segments (`10.1000.10/example`).
#[allow(clippy::expect_used)]
static DOI_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^10\.\d{4,9}(?:\.\d+)*/[^\s<>"']+$"#).expect("DOI regex is valid") // Static pattern, safe to panic
});

const URL_PREFIXES: [&str; 4] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

/// Returns the normalized DOI when the token is DOI-shaped and valid.
///
/// Accepts bare DOIs, `doi:`-labelled DOIs, and `doi.org` URLs. Anything
/// else yields `None` so classification moves on to the next rule.
#[must_use]
pub(crate) fn detect(input: &str) -> Option<String> {
    let candidate = normalize(input);
    if !DOI_SHAPE.is_match(&candidate) {
        return None;
    }

    let candidate = trim_unbalanced(&candidate, '(', ')');
    let candidate = trim_unbalanced(&candidate, '{', '}');

    match check(&candidate) {
        Ok(()) => {
            debug!(doi = %candidate, "DOI validated");
            Some(candidate)
        }
        Err(reason) => {
            debug!(doi = %candidate, reason, "DOI-shaped token failed validation");
            None
        }
    }
}

/// Reduces the token to a bare DOI: drops a `doi.org` URL prefix or a
/// `doi:` label, percent-decodes, and trims.
fn normalize(input: &str) -> String {
    let token = input.trim();
    let token = URL_PREFIXES
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix))
        .unwrap_or(token);
    let token = match token.get(..4) {
        Some(label) if label.eq_ignore_ascii_case("doi:") => token[4..].trim_start(),
        _ => token,
    };
    match urlencoding::decode(token) {
        Ok(decoded) => decoded.trim().to_string(),
        Err(_) => token.trim().to_string(),
    }
}

/// Structural checks beyond the shape regex: the first registrant segment
/// must be 4+ digits and the suffix non-empty.
fn check(doi: &str) -> Result<(), &'static str> {
    let rest = doi.strip_prefix("10.").ok_or("missing '10.' prefix")?;
    let (registrant, suffix) = rest
        .split_once('/')
        .ok_or("no '/' separating registrant and suffix")?;

    let leading = registrant.split('.').next().unwrap_or("");
    if leading.len() < 4 || leading.bytes().any(|b| !b.is_ascii_digit()) {
        return Err("first registrant segment is not 4+ digits");
    }
    if suffix.is_empty() {
        return Err("suffix is empty");
    }
    Ok(())
}

/// Drops trailing `close` characters from the suffix while they outnumber
/// `open`, so a DOI quoted as `{10.1234/x}` loses the stray brace but a
/// suffix like `10.1002/(SICI)1097-4636` keeps its parentheses.
fn trim_unbalanced(doi: &str, open: char, close: char) -> String {
    let Some(slash) = doi.find('/') else {
        return doi.to_string();
    };

    let mut out = doi.to_string();
    while out.ends_with(close) {
        let suffix = &out[slash + 1..];
        if suffix.matches(close).count() <= suffix.matches(open).count() {
            break;
        }
        out.pop();
    }
    out
}
