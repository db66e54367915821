//! Ordered fallback chain over metadata sources.
//!
//! The [`FallbackChain`] tries registered sources in order, merging each
//! partial result field by field (first non-empty wins) and stopping
//! early once the record is complete. It never fails on a single source;
//! only a missing title after every step, including the filename
//! fallback, is fatal.

use tracing::{debug, info, warn};

use crate::annotation::Annotation;
use crate::classify::Identifier;

use super::record::{BibliographicRecord, PartialRecord};
use super::{MetadataSource, ResolveContext, ResolveError};

/// An ordered collection of metadata sources with the resolution loop.
pub struct FallbackChain {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl FallbackChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Appends a source to the chain. Registration order is resolution
    /// order.
    pub fn register(&mut self, source: Box<dyn MetadataSource>) {
        debug!(name = source.name(), "Registering metadata source");
        self.sources.push(source);
    }

    /// Returns the number of registered sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolves an identifier into a bibliographic record.
    ///
    /// A manual title from the annotation pre-seeds the title field; the
    /// chain still runs to fill authors/year/BibTeX. Sources that fail
    /// log and fall through. When no source yields a title, the filename
    /// stem of a local path is the last resort.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnresolvedTitle`] when no step, including
    /// the filename fallback, produced a title.
    #[tracing::instrument(skip(self, annotation), fields(identifier = %id))]
    pub async fn resolve(
        &self,
        id: &Identifier,
        annotation: &Annotation,
    ) -> Result<BibliographicRecord, ResolveError> {
        let mut merged = PartialRecord {
            title: annotation.title_override.clone(),
            ..PartialRecord::default()
        };
        let ctx = ResolveContext {
            title_hint: annotation.title_override.clone(),
        };

        let mut tried: usize = 0;
        for source in &self.sources {
            if merged.is_complete() {
                break;
            }
            if !source.can_handle(id) {
                continue;
            }

            tried += 1;
            debug!(source = source.name(), "Trying metadata source");
            match source.lookup(id, &ctx).await {
                Ok(partial) => {
                    info!(source = source.name(), "Metadata source succeeded");
                    merged.merge(partial);
                }
                Err(err) => {
                    warn!(
                        source = source.name(),
                        error = %err,
                        "Metadata source failed, falling through"
                    );
                }
            }
        }

        if !merged.has_title() {
            if let Some(stem) = id.file_stem() {
                debug!(stem = %stem, "Falling back to filename stem for title");
                merged.title = Some(stem);
            }
        }

        BibliographicRecord::from_partial(merged, id)
            .ok_or_else(|| ResolveError::unresolved_title(&id.raw, tried))
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}
