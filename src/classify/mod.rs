//! Identifier classification for single input tokens.
//!
//! [`classify`] inspects the one identifier passed on the command line and
//! tags it as a DOI, an arXiv reference, a generic URL, or a local file
//! path. Rules are checked in that order and the first match wins.

mod arxiv;
mod doi;
mod error;

pub use error::ClassifyError;

use std::fmt;
use std::path::Path;

use tracing::debug;
use url::Url;

/// Kind of identifier detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// DOI identifier (`10.XXXX/suffix`)
    Doi,
    /// arXiv id or arXiv URL
    Arxiv,
    /// Generic HTTP/HTTPS URL
    Url,
    /// Existing local filesystem path
    LocalPath,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doi => write!(f, "DOI"),
            Self::Arxiv => write!(f, "arXiv"),
            Self::Url => write!(f, "URL"),
            Self::LocalPath => write!(f, "local path"),
        }
    }
}

/// A classified identifier. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Identifier {
    /// Detected kind
    pub kind: IdentifierKind,
    /// Original input text
    pub raw: String,
    /// Normalized value (bare DOI, bare arXiv id, URL, or path)
    pub value: String,
}

impl Identifier {
    fn new(kind: IdentifierKind, raw: &str, value: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            value: value.into(),
        }
    }

    /// Canonical link for this identifier, used in note rows and slides.
    #[must_use]
    pub fn canonical_link(&self) -> String {
        match self.kind {
            IdentifierKind::Doi => format!("https://doi.org/{}", self.value),
            IdentifierKind::Arxiv => format!("https://arxiv.org/abs/{}", self.value),
            IdentifierKind::Url | IdentifierKind::LocalPath => self.value.clone(),
        }
    }

    /// Filename stem for local paths, the last-resort title fallback.
    #[must_use]
    pub fn file_stem(&self) -> Option<String> {
        match self.kind {
            IdentifierKind::LocalPath => Path::new(&self.value)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.value)
    }
}

/// Classifies a single input token.
///
/// Rules, checked in order, first match wins:
/// 1. DOI pattern (bare, `doi:`-prefixed, or `doi.org` URL)
/// 2. arXiv id or arXiv URL
/// 3. Syntactically valid http/https URL with a host
/// 4. Existing local filesystem path
///
/// Deterministic function of the string, apart from the rule-4 existence
/// probe.
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidIdentifier`] when no rule matches and
/// the token does not name an existing file.
#[tracing::instrument]
pub fn classify(raw: &str) -> Result<Identifier, ClassifyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClassifyError::empty());
    }

    if let Some(doi) = doi::detect(trimmed) {
        debug!(doi = %doi, "classified as DOI");
        return Ok(Identifier::new(IdentifierKind::Doi, raw, doi));
    }

    if let Some(id) = arxiv::detect(trimmed) {
        debug!(arxiv_id = %id, "classified as arXiv");
        return Ok(Identifier::new(IdentifierKind::Arxiv, raw, id));
    }

    if let Some(normalized) = valid_web_url(trimmed) {
        debug!(url = %normalized, "classified as URL");
        return Ok(Identifier::new(IdentifierKind::Url, raw, normalized));
    }

    if Path::new(trimmed).exists() {
        debug!(path = %trimmed, "classified as local path");
        return Ok(Identifier::new(IdentifierKind::LocalPath, raw, trimmed));
    }

    Err(ClassifyError::unrecognized(trimmed))
}

/// Validates that the token is an http/https URL with a host.
fn valid_web_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    parsed.host_str()?;
    Some(parsed.to_string())
}
