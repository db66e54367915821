//! Per-library sink targets, derived from the library name by convention.

use std::path::PathBuf;

use crate::config::Config;

const NOTES_FILENAME: &str = "quick_notes.md";
const DECK_FILENAME: &str = "paperdeck.pptx";

/// File-system locations and slide options for one library. Derived
/// deterministically from the library name; parents are created by the
/// sinks on demand.
#[derive(Debug, Clone)]
pub struct SinkTarget {
    /// Library name, also the bibliography-manager library selector
    pub library: String,
    /// Markdown note file (`<inbox-root>/<library>/quick_notes.md`)
    pub notes_path: PathBuf,
    /// Slide deck (`<slides-root>/<library>/paperdeck.pptx` unless overridden)
    pub deck_path: PathBuf,
    /// Slide theme template, when configured
    pub theme: Option<PathBuf>,
    /// Slide layout index inside the theme/deck
    pub layout: usize,
    /// Label for the relevance line on slides
    pub relevance_label: String,
    /// Label for the application line on slides
    pub application_label: String,
}

impl SinkTarget {
    /// Derives the target for a library, applying CLI overrides where
    /// given and configuration defaults otherwise.
    #[must_use]
    pub fn for_library(
        config: &Config,
        library: &str,
        deck_override: Option<PathBuf>,
        theme_override: Option<PathBuf>,
        layout_override: Option<usize>,
    ) -> Self {
        Self {
            library: library.to_string(),
            notes_path: config.inbox_root.join(library).join(NOTES_FILENAME),
            deck_path: deck_override
                .unwrap_or_else(|| config.slides_root.join(library).join(DECK_FILENAME)),
            theme: theme_override.or_else(|| config.theme.clone()),
            layout: layout_override.unwrap_or(config.layout),
            relevance_label: config.relevance_label.clone(),
            application_label: config.application_label.clone(),
        }
    }
}
