//! Metadata resolution pipeline: an ordered fallback chain of sources.
//!
//! This module turns a classified [`Identifier`] into a
//! [`BibliographicRecord`] through a priority-ordered chain of metadata
//! sources with per-field merge and graceful degradation.
//!
//! # Architecture
//!
//! - [`MetadataSource`] - Async trait that individual sources implement
//! - [`FallbackChain`] - Ordered collection of sources with the resolution loop
//! - [`DoiBibtexSource`] - doi.org BibTeX content negotiation with local cache
//! - [`CrossrefSource`] - Crossref works/search lookup
//! - [`ArxivSource`] - arXiv Atom metadata endpoint
//!
//! # Example
//!
//! ```no_run
//! use paperflow_core::classify::classify;
//! use paperflow_core::config::Config;
//! use paperflow_core::resolve::build_default_chain;
//! use paperflow_core::Annotation;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let chain = build_default_chain(&config);
//! let id = classify("10.1038/s41586-020-2622-0")?;
//! let record = chain.resolve(&id, &Annotation::default()).await?;
//! println!("Resolved title: {}", record.title);
//! # Ok(())
//! # }
//! ```

mod arxiv;
mod bibtex;
mod cache;
mod chain;
mod crossref;
mod doi_org;
mod error;
mod http_client;
mod record;

pub use arxiv::ArxivSource;
pub use cache::{BibtexCache, CachedBibtex};
pub use chain::FallbackChain;
pub use crossref::CrossrefSource;
pub use doi_org::DoiBibtexSource;
pub use error::ResolveError;
pub use http_client::{build_source_http_client, standard_user_agent};
pub use record::{BibliographicRecord, PartialRecord};

use async_trait::async_trait;
use tracing::warn;

use crate::classify::Identifier;
use crate::config::Config;

/// Context passed to sources during resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// Manual title override, used as the search query when present.
    pub title_hint: Option<String>,
}

/// Trait that all metadata sources implement.
///
/// Sources turn an identifier into a partial bibliographic record. Each
/// source declares what identifier kinds it handles; the chain merges
/// their partials in registration order.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn MetadataSource>`.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns the source's name (e.g., "doi.org", "crossref", "arxiv").
    fn name(&self) -> &'static str;

    /// Returns true if this source can handle the given identifier.
    fn can_handle(&self, id: &Identifier) -> bool;

    /// Attempts to look up metadata for the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the lookup fails; the chain logs and
    /// falls through to the next source.
    async fn lookup(
        &self,
        id: &Identifier,
        ctx: &ResolveContext,
    ) -> Result<PartialRecord, ResolveError>;
}

/// Builds the default fallback chain used by CLI execution flows.
///
/// Order is deterministic: doi.org BibTeX first, then Crossref search,
/// then the arXiv endpoint. A source whose construction fails is skipped
/// with a warning so the remaining steps still run.
#[must_use]
pub fn build_default_chain(config: &Config) -> FallbackChain {
    let mut chain = FallbackChain::new();

    match DoiBibtexSource::new(BibtexCache::new(config.cache_dir.clone())) {
        Ok(source) => chain.register(Box::new(source)),
        Err(error) => warn!(
            error = %error,
            "doi.org source unavailable; continuing with remaining sources"
        ),
    }

    match CrossrefSource::new(config.mailto.as_str()) {
        Ok(source) => chain.register(Box::new(source)),
        Err(error) => warn!(
            error = %error,
            "Crossref source unavailable; continuing with remaining sources"
        ),
    }

    match ArxivSource::new() {
        Ok(source) => chain.register(Box::new(source)),
        Err(error) => warn!(
            error = %error,
            "arXiv source unavailable; continuing with filename fallback only"
        ),
    }

    chain
}
