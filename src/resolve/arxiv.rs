//! arXiv metadata source using the export.arxiv.org Atom endpoint.

use async_trait::async_trait;
use chrono::Datelike;
use reqwest::Client;
use tracing::{debug, warn};

use crate::classify::{Identifier, IdentifierKind};

use super::http_client::build_source_http_client;
use super::record::PartialRecord;
use super::{MetadataSource, ResolveContext, ResolveError};

/// Default arXiv API base URL.
const DEFAULT_BASE_URL: &str = "http://export.arxiv.org";

/// Resolves arXiv ids to title/authors/year via the Atom query API.
pub struct ArxivSource {
    client: Client,
    base_url: String,
}

impl ArxivSource {
    /// Creates a new `ArxivSource` against the public arXiv API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ResolveError> {
        Self::build(DEFAULT_BASE_URL.to_string())
    }

    /// Creates an `ArxivSource` with a custom base URL (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ResolveError> {
        Self::build(base_url.into())
    }

    fn build(base_url: String) -> Result<Self, ResolveError> {
        let client = build_source_http_client("arxiv")?;
        Ok(Self { client, base_url })
    }
}

impl std::fmt::Debug for ArxivSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for ArxivSource {
    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn can_handle(&self, id: &Identifier) -> bool {
        id.kind == IdentifierKind::Arxiv
    }

    #[tracing::instrument(skip(self, _ctx), fields(source = "arxiv", arxiv_id = %id.value))]
    async fn lookup(
        &self,
        id: &Identifier,
        _ctx: &ResolveContext,
    ) -> Result<PartialRecord, ResolveError> {
        let url = format!(
            "{}/api/query?id_list={}&max_results=1",
            self.base_url,
            urlencoding::encode(&id.value)
        );
        debug!(api_url = %url, "Calling arXiv query API");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(error = %e, "arXiv API request failed");
            ResolveError::lookup_failed(
                "arxiv",
                &id.value,
                "Cannot reach the arXiv API. Check your network connection.",
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.as_u16() {
                s if s >= 500 => "arXiv API unavailable. Try again later.".to_string(),
                s => format!("arXiv API returned HTTP {s}"),
            };
            return Err(ResolveError::lookup_failed("arxiv", &id.value, &reason));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read arXiv response body");
            ResolveError::lookup_failed("arxiv", &id.value, "Could not read the response body")
        })?;

        let feed = feed_rs::parser::parse(body.as_ref()).map_err(|e| {
            warn!(error = %e, "failed to parse arXiv Atom feed");
            ResolveError::lookup_failed("arxiv", &id.value, "Unexpected arXiv feed format")
        })?;

        let Some(entry) = feed.entries.into_iter().next() else {
            return Err(ResolveError::lookup_failed(
                "arxiv",
                &id.value,
                "no feed entry for this arXiv id",
            ));
        };

        // The feed answers unknown ids with a single "Error" entry.
        let title = entry
            .title
            .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("error"));
        if title.is_none() {
            return Err(ResolveError::lookup_failed(
                "arxiv",
                &id.value,
                "arXiv feed entry carries no usable title",
            ));
        }

        let authors = entry
            .authors
            .iter()
            .map(|person| person.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        let year = entry
            .published
            .or(entry.updated)
            .map(|date| date.year());

        Ok(PartialRecord {
            title,
            authors: if authors.is_empty() { None } else { Some(authors) },
            year,
            bibtex: None,
            bibtex_path: None,
        })
    }
}
