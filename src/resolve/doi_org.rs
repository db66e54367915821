//! DOI-to-BibTeX source using doi.org content negotiation.
//!
//! The [`DoiBibtexSource`] asks `doi.org` for `application/x-bibtex` and
//! populates every record field from the returned entry. Successful
//! fetches persist to the [`BibtexCache`]; repeated invocations with the
//! same DOI hit the cache and never touch the network.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::classify::{Identifier, IdentifierKind};

use super::bibtex;
use super::cache::BibtexCache;
use super::http_client::build_source_http_client;
use super::record::PartialRecord;
use super::{MetadataSource, ResolveContext, ResolveError};

/// Default doi.org base URL.
const DEFAULT_BASE_URL: &str = "https://doi.org";

const BIBTEX_ACCEPT: &str = "application/x-bibtex; charset=utf-8";

/// Resolves DOIs to full bibliographic records via doi.org content
/// negotiation, with a write-once local BibTeX cache.
pub struct DoiBibtexSource {
    client: Client,
    base_url: String,
    cache: BibtexCache,
}

impl DoiBibtexSource {
    /// Creates a new `DoiBibtexSource` against the public doi.org.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn new(cache: BibtexCache) -> Result<Self, ResolveError> {
        Self::build(cache, DEFAULT_BASE_URL.to_string())
    }

    /// Creates a `DoiBibtexSource` with a custom base URL (for testing
    /// with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn with_base_url(
        cache: BibtexCache,
        base_url: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        Self::build(cache, base_url.into())
    }

    fn build(cache: BibtexCache, base_url: String) -> Result<Self, ResolveError> {
        let client = build_source_http_client("doi.org")?;
        Ok(Self {
            client,
            base_url,
            cache,
        })
    }
}

impl std::fmt::Debug for DoiBibtexSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoiBibtexSource")
            .field("base_url", &self.base_url)
            .field("cache_dir", &self.cache.dir())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for DoiBibtexSource {
    fn name(&self) -> &'static str {
        "doi.org"
    }

    fn can_handle(&self, id: &Identifier) -> bool {
        id.kind == IdentifierKind::Doi
    }

    #[tracing::instrument(skip(self, _ctx), fields(source = "doi.org", doi = %id.value))]
    async fn lookup(
        &self,
        id: &Identifier,
        _ctx: &ResolveContext,
    ) -> Result<PartialRecord, ResolveError> {
        let doi = &id.value;

        if let Some(cached) = self.cache.load(doi) {
            let mut partial = bibtex::partial_from_entry(&cached.text);
            partial.bibtex_path = Some(cached.path);
            return Ok(partial);
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(doi));
        debug!(api_url = %url, "Requesting BibTeX from doi.org");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, BIBTEX_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "doi.org request failed");
                ResolveError::lookup_failed(
                    "doi.org",
                    doi,
                    "Cannot reach doi.org. Check your network connection.",
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.as_u16() {
                404 => "DOI is not registered".to_string(),
                406 => "no BibTeX representation available for this DOI".to_string(),
                s if s >= 500 => "doi.org unavailable. Try again later.".to_string(),
                s => format!("doi.org returned HTTP {s}"),
            };
            debug!(status = status.as_u16(), %reason, "doi.org error");
            return Err(ResolveError::lookup_failed("doi.org", doi, &reason));
        }

        let text = response.text().await.map_err(|e| {
            warn!(error = %e, "failed to read doi.org response body");
            ResolveError::lookup_failed("doi.org", doi, "Could not read the response body")
        })?;

        if !bibtex::looks_like_bibtex(&text) {
            return Err(ResolveError::lookup_failed(
                "doi.org",
                doi,
                "response is not a BibTeX entry",
            ));
        }

        let mut partial = bibtex::partial_from_entry(&text);
        match self.cache.store(doi, &text) {
            Ok(path) => partial.bibtex_path = Some(path),
            Err(e) => warn!(error = %e, "could not persist BibTeX cache entry"),
        }

        Ok(partial)
    }
}
