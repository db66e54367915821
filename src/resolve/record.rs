//! Bibliographic record types and per-field merge semantics.

use std::path::PathBuf;

use crate::classify::{Identifier, IdentifierKind};

/// What a single metadata source returns. Every field is optional; the
/// fallback chain merges partials with first-non-empty-wins per field.
#[derive(Debug, Clone, Default)]
pub struct PartialRecord {
    /// Paper title
    pub title: Option<String>,
    /// Formatted author list ("Family, Given; ...")
    pub authors: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Raw BibTeX text
    pub bibtex: Option<String>,
    /// Path of the cached BibTeX file, when persisted
    pub bibtex_path: Option<PathBuf>,
}

impl PartialRecord {
    /// Merges another partial into this one. A field already filled here
    /// is never overwritten; blank strings do not count as filled.
    pub fn merge(&mut self, other: PartialRecord) {
        if !filled(&self.title) {
            self.title = other.title.filter(|t| !t.trim().is_empty());
        }
        if !filled(&self.authors) {
            self.authors = other.authors.filter(|a| !a.trim().is_empty());
        }
        if self.year.is_none() {
            self.year = other.year;
        }
        if !filled(&self.bibtex) {
            self.bibtex = other.bibtex.filter(|b| !b.trim().is_empty());
        }
        if self.bibtex_path.is_none() {
            self.bibtex_path = other.bibtex_path;
        }
    }

    /// True once every field is filled; the chain stops early then.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        filled(&self.title) && filled(&self.authors) && self.year.is_some() && filled(&self.bibtex)
    }

    /// True when the title field is filled.
    #[must_use]
    pub fn has_title(&self) -> bool {
        filled(&self.title)
    }
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// A resolved bibliographic record. The title is never empty.
#[derive(Debug, Clone)]
pub struct BibliographicRecord {
    /// Paper title (non-empty)
    pub title: String,
    /// Formatted author list, when resolved
    pub authors: Option<String>,
    /// Publication year, when resolved
    pub year: Option<i32>,
    /// Raw BibTeX text, when resolved
    pub bibtex: Option<String>,
    /// Path of the cached BibTeX file, when persisted
    pub bibtex_path: Option<PathBuf>,
    /// Canonical link for the identifier
    pub link: String,
    /// Kind of the source identifier
    pub source_kind: IdentifierKind,
    /// Validated PDF attachments for this entry
    pub attachments: Vec<PathBuf>,
}

impl BibliographicRecord {
    /// Builds the final record from a merged partial. Returns `None` when
    /// the partial carries no title.
    #[must_use]
    pub fn from_partial(partial: PartialRecord, id: &Identifier) -> Option<Self> {
        let title = partial.title.filter(|t| !t.trim().is_empty())?;
        Some(Self {
            title: title.trim().to_string(),
            authors: partial.authors,
            year: partial.year,
            bibtex: partial.bibtex,
            bibtex_path: partial.bibtex_path,
            link: id.canonical_link(),
            source_kind: id.kind,
            attachments: Vec::new(),
        })
    }
}
