//! User-supplied context attached to a paper entry.

/// Contextual fields supplied once per invocation. Immutable.
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    /// Why the paper matters (free-form)
    pub relevance: String,
    /// How the paper will be used (free-form)
    pub application: String,
    /// Deduplicated tags, insertion order preserved
    pub tags: Vec<String>,
    /// Manual title override; wins over every resolver step
    pub title_override: Option<String>,
}

impl Annotation {
    /// Creates an annotation, trimming and deduplicating tags.
    #[must_use]
    pub fn new(
        relevance: impl Into<String>,
        application: impl Into<String>,
        tags: Vec<String>,
        title_override: Option<String>,
    ) -> Self {
        let mut seen = Vec::new();
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }

        Self {
            relevance: relevance.into(),
            application: application.into(),
            tags: seen,
            title_override: title_override.filter(|t| !t.trim().is_empty()),
        }
    }
}
