//! Process-wide configuration, built once from the environment.
//!
//! Every default a sink or source needs lives here so nothing reads
//! environment variables ad hoc. CLI flags override these values where a
//! matching flag exists.

use std::env;
use std::path::PathBuf;

/// Default 0-based slide layout index inside the theme/deck.
pub const DEFAULT_LAYOUT: usize = 1;

/// Resolved configuration bundle threaded into target derivation and the
/// orchestrator at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for per-library note files
    pub inbox_root: PathBuf,
    /// Root directory for per-library slide decks
    pub slides_root: PathBuf,
    /// BibTeX cache directory
    pub cache_dir: PathBuf,
    /// Slide theme template path, when configured
    pub theme: Option<PathBuf>,
    /// Slide layout index inside the theme/deck
    pub layout: usize,
    /// Label for the relevance line on slides
    pub relevance_label: String,
    /// Label for the application line on slides
    pub application_label: String,
    /// Contact email for the Crossref polite pool
    pub mailto: String,
    /// Bibliography manager program name
    pub papis_bin: String,
    /// Slide-appender helper program name
    pub slide_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let cache_root = dirs::cache_dir().unwrap_or_else(|| home.join(".cache"));
        Self {
            inbox_root: home.join("papers_inbox"),
            slides_root: home.join("papers_slides"),
            cache_dir: cache_root.join("paperflow").join("bibtex"),
            theme: None,
            layout: DEFAULT_LAYOUT,
            relevance_label: "Relevance".to_string(),
            application_label: "Application".to_string(),
            mailto: "paperflow@example.com".to_string(),
            papis_bin: "papis".to_string(),
            slide_bin: "make_paper_slide".to_string(),
        }
    }
}

impl Config {
    /// Builds the configuration from `PAPERFLOW_*` environment variables,
    /// falling back to the defaults above.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(root) = env_path("PAPERFLOW_INBOX_ROOT") {
            config.inbox_root = root;
        }
        if let Some(root) = env_path("PAPERFLOW_SLIDES_ROOT") {
            config.slides_root = root;
        }
        if let Some(dir) = env_path("PAPERFLOW_CACHE_DIR") {
            config.cache_dir = dir;
        }
        config.theme = env_path("PAPERFLOW_PPT_THEME");
        if let Some(layout) = env_string("PAPERFLOW_PPT_LAYOUT").and_then(|v| v.parse().ok()) {
            config.layout = layout;
        }
        if let Some(label) = env_string("PAPERFLOW_REL_LABEL") {
            config.relevance_label = label;
        }
        if let Some(label) = env_string("PAPERFLOW_APP_LABEL") {
            config.application_label = label;
        }
        if let Some(mailto) = env_string("PAPERFLOW_MAILTO") {
            config.mailto = mailto;
        }
        if let Some(bin) = env_string("PAPERFLOW_PAPIS_BIN") {
            config.papis_bin = bin;
        }
        if let Some(bin) = env_string("PAPERFLOW_SLIDE_BIN") {
            config.slide_bin = bin;
        }

        config
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}
