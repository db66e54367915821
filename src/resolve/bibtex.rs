//! Light BibTeX field reading for records fetched from the DOI resolver.
//!
//! This is not a general BibTeX parser: it pulls the handful of fields
//! paperflow needs (title, author, year) out of a single fetched entry,
//! handling braced, quoted, and bare values with nested braces.

use std::sync::LazyLock;

use regex::Regex;

use super::record::PartialRecord;

#[allow(clippy::expect_used)]
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year regex is valid")); // Static pattern, safe to panic

/// True when the text starts like a BibTeX entry (`@type{key, ...`).
#[must_use]
pub(crate) fn looks_like_bibtex(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('@') && trimmed.contains('{')
}

/// Builds a partial record from a fetched BibTeX entry.
#[must_use]
pub(crate) fn partial_from_entry(text: &str) -> PartialRecord {
    let title = extract_field(text, "title");
    let authors = extract_field(text, "author").map(|a| a.replace(" and ", "; "));
    let year = extract_field(text, "year")
        .as_deref()
        .and_then(extract_year);

    PartialRecord {
        title,
        authors,
        year,
        bibtex: Some(text.to_string()),
        bibtex_path: None,
    }
}

fn extract_year(value: &str) -> Option<i32> {
    YEAR_RE.find(value)?.as_str().parse().ok()
}

/// Extracts one field value from a BibTeX entry, case-insensitively.
///
/// Returns the value with outer braces/quotes removed, inner braces
/// dropped, and whitespace collapsed.
#[must_use]
pub(crate) fn extract_field(text: &str, name: &str) -> Option<String> {
    let pattern = format!(r"(?i)[,{{]\s*{}\s*=\s*", regex::escape(name));
    let field_re = Regex::new(&pattern).ok()?;
    let value_start = field_re.find(text)?.end();
    let rest = &text[value_start..];

    let raw = match rest.chars().next()? {
        '{' => scan_braced(rest)?,
        '"' => scan_quoted(rest)?,
        _ => scan_bare(rest),
    };

    let cleaned: String = raw.chars().filter(|&c| c != '{' && c != '}').collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Scans a `{...}`-delimited value, honoring nested braces.
fn scan_braced(rest: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (idx, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[1..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scans a `"..."`-delimited value; braces inside protect quotes.
fn scan_quoted(rest: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (idx, c) in rest.char_indices().skip(1) {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '"' if depth == 0 => return Some(&rest[1..idx]),
            _ => {}
        }
    }
    None
}

/// Scans a bare value (numbers, macro names) up to the field delimiter.
fn scan_bare(rest: &str) -> &str {
    let end = rest
        .find(|c| c == ',' || c == '}' || c == '\n')
        .unwrap_or(rest.len());
    rest[..end].trim()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"@article{Smith_2020,
	doi = {10.1234/example},
	year = 2020,
	month = jul,
	publisher = {Example Press},
	author = {John Smith and Jane Doe},
	title = {A {Great} Paper on {DNA} Folding},
	journal = {Journal of Examples}
}"#;

    // ==================== Field Extraction Tests ====================

    #[test]
    fn test_extract_field_braced_with_nesting() {
        assert_eq!(
            extract_field(SAMPLE, "title").unwrap(),
            "A Great Paper on DNA Folding"
        );
    }

    #[test]
    fn test_extract_field_bare_number() {
        assert_eq!(extract_field(SAMPLE, "year").unwrap(), "2020");
    }

    #[test]
    fn test_extract_field_case_insensitive() {
        assert_eq!(extract_field(SAMPLE, "TITLE").unwrap(), "A Great Paper on DNA Folding");
    }

    #[test]
    fn test_extract_field_quoted_value() {
        let entry = r#"@misc{x, title = "A Quoted {Title}", year = {1999}}"#;
        assert_eq!(extract_field(entry, "title").unwrap(), "A Quoted Title");
        assert_eq!(extract_field(entry, "year").unwrap(), "1999");
    }

    #[test]
    fn test_extract_field_missing_returns_none() {
        assert!(extract_field(SAMPLE, "volume").is_none());
    }

    #[test]
    fn test_extract_field_collapses_whitespace() {
        let entry = "@article{x,\n  title = {Multi\n    Line   Title},\n}";
        assert_eq!(extract_field(entry, "title").unwrap(), "Multi Line Title");
    }

    #[test]
    fn test_extract_field_does_not_match_booktitle_for_title() {
        let entry = "@inproceedings{x, booktitle = {Proc. of Things}, title = {Real Title}}";
        assert_eq!(extract_field(entry, "title").unwrap(), "Real Title");
    }

    // ==================== Partial Record Tests ====================

    #[test]
    fn test_partial_from_entry_full() {
        let partial = partial_from_entry(SAMPLE);
        assert_eq!(partial.title.unwrap(), "A Great Paper on DNA Folding");
        assert_eq!(partial.authors.unwrap(), "John Smith; Jane Doe");
        assert_eq!(partial.year.unwrap(), 2020);
        assert!(partial.bibtex.unwrap().starts_with("@article"));
    }

    #[test]
    fn test_partial_from_entry_missing_fields() {
        let partial = partial_from_entry("@misc{x, note = {nothing useful}}");
        assert!(partial.title.is_none());
        assert!(partial.authors.is_none());
        assert!(partial.year.is_none());
        assert!(partial.bibtex.is_some(), "raw text is still kept");
    }

    // ==================== Shape Detection Tests ====================

    #[test]
    fn test_looks_like_bibtex() {
        assert!(looks_like_bibtex(SAMPLE));
        assert!(looks_like_bibtex("  @misc{x}"));
        assert!(!looks_like_bibtex("<html><body>Not found</body></html>"));
        assert!(!looks_like_bibtex("plain text"));
    }
}
