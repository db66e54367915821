//! Crossref bibliographic search source.
//!
//! The [`CrossrefSource`] queries the Crossref REST API: `/works/{doi}`
//! for DOI identifiers and `/works?query.bibliographic=...` otherwise,
//! preferring a manual title hint as the query text. It fills title,
//! authors, and year; it never produces BibTeX.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::classify::{Identifier, IdentifierKind};

use super::http_client::build_source_http_client;
use super::record::PartialRecord;
use super::{MetadataSource, ResolveContext, ResolveError};

const API_ROOT: &str = "https://api.crossref.org";

// ==================== Response Types ====================

/// Envelope for `/works/{doi}`: the message is the work itself.
#[derive(Debug, Deserialize)]
struct WorksEnvelope {
    status: String,
    message: Work,
}

/// Envelope for `/works?query.bibliographic=...`: the message holds hits.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: String,
    message: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    items: Option<Vec<Work>>,
}

/// The subset of a Crossref work entry paperflow reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Work {
    title: Option<Vec<String>>,
    author: Option<Vec<Author>>,
    published: Option<PartialDate>,
    published_print: Option<PartialDate>,
    published_online: Option<PartialDate>,
}

#[derive(Debug, Deserialize)]
struct Author {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PartialDate {
    date_parts: Option<Vec<Vec<Option<i32>>>>,
}

impl Work {
    fn into_partial(self) -> PartialRecord {
        // Print and online dates stand in when the plain published date
        // is absent, in that order.
        let year = [&self.published, &self.published_print, &self.published_online]
            .into_iter()
            .find_map(|date| date.as_ref().and_then(PartialDate::year));

        let title = self
            .title
            .into_iter()
            .flatten()
            .map(|t| t.trim().to_string())
            .find(|t| !t.is_empty());

        let authors: Vec<String> = self
            .author
            .into_iter()
            .flatten()
            .filter_map(Author::display_name)
            .collect();

        PartialRecord {
            title,
            authors: (!authors.is_empty()).then(|| authors.join("; ")),
            year,
            bibtex: None,
            bibtex_path: None,
        }
    }
}

impl Author {
    /// `Family, Given` when both parts exist; whichever part is present
    /// otherwise (consortia only carry a family name).
    fn display_name(self) -> Option<String> {
        match (self.family, self.given) {
            (Some(family), Some(given)) => Some(format!("{family}, {given}")),
            (Some(part), None) | (None, Some(part)) => Some(part),
            (None, None) => None,
        }
    }
}

impl PartialDate {
    fn year(&self) -> Option<i32> {
        self.date_parts.as_ref()?.first()?.first().copied().flatten()
    }
}

// ==================== CrossrefSource ====================

/// Bibliographic search against the Crossref REST API.
///
/// Every request carries a `mailto` query parameter so the calls land in
/// Crossref's polite pool and its higher rate limits.
pub struct CrossrefSource {
    client: Client,
    base_url: String,
    mailto: String,
}

impl CrossrefSource {
    /// Creates a source against the public Crossref API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the mailto carries control characters
    /// or HTTP client construction fails.
    pub fn new(mailto: impl Into<String>) -> Result<Self, ResolveError> {
        Self::build(mailto.into(), API_ROOT.to_string())
    }

    /// Same as [`CrossrefSource::new`] with the API root swapped out, for
    /// testing with wiremock.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the mailto carries control characters
    /// or HTTP client construction fails.
    pub fn with_base_url(
        mailto: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        Self::build(mailto.into(), base_url.into())
    }

    fn build(mailto: String, base_url: String) -> Result<Self, ResolveError> {
        if mailto.contains(['\n', '\r', '\0']) {
            return Err(ResolveError::lookup_failed(
                "crossref",
                &mailto,
                "mailto contains control characters",
            ));
        }
        Ok(Self {
            client: build_source_http_client("crossref")?,
            base_url,
            mailto,
        })
    }

    async fn by_doi(&self, doi: &str) -> Result<Work, ResolveError> {
        let url = format!(
            "{}/works/{}?mailto={}",
            self.base_url,
            urlencoding::encode(doi),
            urlencoding::encode(&self.mailto)
        );
        let envelope: WorksEnvelope = self.fetch(&url, doi).await?;
        ensure_ok(&envelope.status, doi)?;
        Ok(envelope.message)
    }

    async fn by_query(&self, query: &str) -> Result<Work, ResolveError> {
        let url = format!(
            "{}/works?query.bibliographic={}&rows=1&mailto={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.mailto)
        );
        let envelope: SearchEnvelope = self.fetch(&url, query).await?;
        ensure_ok(&envelope.status, query)?;

        envelope
            .message
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                ResolveError::lookup_failed("crossref", query, "no search results for the query")
            })
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, input: &str) -> Result<T, ResolveError> {
        debug!(api_url = %url, "Calling Crossref API");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Crossref API request failed");
            ResolveError::lookup_failed(
                "crossref",
                input,
                "Cannot reach the Crossref API. Check your network connection.",
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.as_u16() {
                404 => "not in the Crossref index".to_string(),
                429 => "Crossref rate limit exceeded. Try again in a few seconds.".to_string(),
                s if s >= 500 => "Crossref API unavailable. Try again later.".to_string(),
                s => format!("Crossref API answered HTTP {s}"),
            };
            debug!(status = status.as_u16(), %reason, "Crossref API error");
            return Err(ResolveError::lookup_failed("crossref", input, &reason));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Crossref response JSON");
            ResolveError::lookup_failed("crossref", input, "Unexpected Crossref API response format")
        })
    }
}

fn ensure_ok(status: &str, input: &str) -> Result<(), ResolveError> {
    if status.eq_ignore_ascii_case("ok") {
        Ok(())
    } else {
        Err(ResolveError::lookup_failed(
            "crossref",
            input,
            "Unexpected Crossref response status",
        ))
    }
}

impl std::fmt::Debug for CrossrefSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefSource")
            .field("base_url", &self.base_url)
            .field("mailto", &self.mailto)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for CrossrefSource {
    fn name(&self) -> &'static str {
        "crossref"
    }

    // Local paths are searchable only through a manual title hint,
    // checked in lookup where the context is available.
    fn can_handle(&self, _id: &Identifier) -> bool {
        true
    }

    #[tracing::instrument(skip(self, ctx), fields(source = "crossref", input = %id.value))]
    async fn lookup(
        &self,
        id: &Identifier,
        ctx: &ResolveContext,
    ) -> Result<PartialRecord, ResolveError> {
        let work = match id.kind {
            IdentifierKind::Doi => self.by_doi(&id.value).await?,
            IdentifierKind::LocalPath => {
                let Some(hint) = ctx.title_hint.as_deref() else {
                    return Err(ResolveError::lookup_failed(
                        "crossref",
                        &id.value,
                        "a local path is only searchable with a manual title",
                    ));
                };
                self.by_query(hint).await?
            }
            IdentifierKind::Arxiv | IdentifierKind::Url => {
                self.by_query(ctx.title_hint.as_deref().unwrap_or(&id.raw))
                    .await?
            }
        };

        Ok(work.into_partial())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn work_json() -> serde_json::Value {
        serde_json::json!({
            "status": "ok",
            "message": {
                "title": ["Quantifying Reef Recovery"],
                "author": [{"given": "Mara", "family": "Ortiz"}],
                "published": {"date-parts": [[2024, 6, 15]]}
            }
        })
    }

    fn search_json() -> serde_json::Value {
        serde_json::json!({
            "status": "ok",
            "message": {
                "items": [{
                    "title": ["Searching Finds This One"],
                    "author": [{"given": "Theo", "family": "Brandt"}],
                    "published": {"date-parts": [[2023]]}
                }]
            }
        })
    }

    // ==================== Deserialization Tests ====================

    #[test]
    fn test_works_envelope_deserialize_minimal() {
        let json = serde_json::json!({"status": "ok", "message": {}});
        let envelope: WorksEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.status, "ok");
        assert!(envelope.message.title.is_none());
    }

    #[test]
    fn test_search_envelope_deserialize_empty_items() {
        let json = serde_json::json!({"status": "ok", "message": {"items": []}});
        let envelope: SearchEnvelope = serde_json::from_value(json).unwrap();
        assert!(envelope.message.items.unwrap().is_empty());
    }

    // ==================== Extraction Tests ====================

    #[test]
    fn test_into_partial_formats_authors() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "author": [
                {"given": "A", "family": "First"},
                {"family": "Consortium"},
                {"given": "C", "family": "Third"}
            ]
        }))
        .unwrap();
        let partial = work.into_partial();
        assert_eq!(partial.authors.unwrap(), "First, A; Consortium; Third, C");
        assert!(partial.title.is_none());
    }

    #[test]
    fn test_into_partial_year_fallback_order() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "published-online": {"date-parts": [[2022]]}
        }))
        .unwrap();
        assert_eq!(work.into_partial().year.unwrap(), 2022);
    }

    // ==================== Constructor Tests ====================

    #[test]
    fn test_constructor_rejects_invalid_mailto() {
        assert!(CrossrefSource::new("invalid\nmailto@example.com").is_err());
    }

    #[test]
    fn test_can_handle_everything() {
        let source = CrossrefSource::new("test@example.com").unwrap();
        assert!(source.can_handle(&classify("10.1234/test").unwrap()));
        assert!(source.can_handle(&classify("arXiv:2301.01234").unwrap()));
    }

    // ==================== Lookup Tests (wiremock) ====================

    #[tokio::test]
    async fn test_lookup_doi_uses_works_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"/works/10\..+"))
            .and(query_param("mailto", "test@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(work_json()))
            .mount(&server)
            .await;

        let source = CrossrefSource::with_base_url("test@example.com", server.uri()).unwrap();
        let id = classify("10.1234/test").unwrap();
        let partial = source.lookup(&id, &ResolveContext::default()).await.unwrap();

        assert_eq!(partial.title.unwrap(), "Quantifying Reef Recovery");
        assert_eq!(partial.authors.unwrap(), "Ortiz, Mara");
        assert_eq!(partial.year.unwrap(), 2024);
        assert!(partial.bibtex.is_none(), "crossref never yields BibTeX");
    }

    #[tokio::test]
    async fn test_lookup_url_uses_bibliographic_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works"))
            .and(query_param("rows", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_json()))
            .mount(&server)
            .await;

        let source = CrossrefSource::with_base_url("test@example.com", server.uri()).unwrap();
        let id = classify("https://example.com/paper.pdf").unwrap();
        let partial = source.lookup(&id, &ResolveContext::default()).await.unwrap();
        assert_eq!(partial.title.unwrap(), "Searching Finds This One");
    }

    #[tokio::test]
    async fn test_lookup_prefers_title_hint_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works"))
            .and(query_param("query.bibliographic", "Attention Is All You Need"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_json()))
            .mount(&server)
            .await;

        let source = CrossrefSource::with_base_url("test@example.com", server.uri()).unwrap();
        let id = classify("https://example.com/paper.pdf").unwrap();
        let ctx = ResolveContext {
            title_hint: Some("Attention Is All You Need".to_string()),
        };
        assert!(source.lookup(&id, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_lookup_local_path_without_hint_fails_without_network() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        // Unroutable base URL: the lookup must fail before any request.
        let source =
            CrossrefSource::with_base_url("test@example.com", "http://127.0.0.1:1").unwrap();
        let id = classify(tmp.path().to_str().unwrap()).unwrap();
        let err = source
            .lookup(&id, &ResolveContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("manual title"), "{err}");
    }

    #[tokio::test]
    async fn test_lookup_empty_search_results_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "message": {"items": []}
            })))
            .mount(&server)
            .await;

        let source = CrossrefSource::with_base_url("test@example.com", server.uri()).unwrap();
        let id = classify("https://example.com/paper.pdf").unwrap();
        let err = source
            .lookup(&id, &ResolveContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no search results"), "{err}");
    }

    #[tokio::test]
    async fn test_lookup_429_reports_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = CrossrefSource::with_base_url("test@example.com", server.uri()).unwrap();
        let id = classify("10.1234/test").unwrap();
        let err = source
            .lookup(&id, &ResolveContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rate limit"), "{err}");
    }
}
