//! HTTP client for the Wikipedia REST and classic query APIs.
//!
//! One [`WikiClient`] serves a single language edition. Calls are issued
//! sequentially; the only failures that propagate are transport errors on
//! calls with no sensible empty default (search, the primary page fetch).
//! Secondary enrichment calls degrade to empty values with a warning.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use wikideck_shared::{PageRecord, Result, SearchResult, WikideckError, WikipediaConfig};

use crate::api;
use crate::sanitize;

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("wikideck/", env!("CARGO_PKG_VERSION"));

/// Link cap applied when `get_page` fetches outbound links.
const PAGE_LINK_LIMIT: u32 = 50;

/// Category cap for the categories query.
const CATEGORY_LIMIT: u32 = 50;

/// Client for one language edition of the encyclopedia.
pub struct WikiClient {
    /// REST API base, e.g. `https://en.wikipedia.org/api/rest_v1/`.
    rest_base: Url,
    /// Classic query API endpoint, e.g. `https://en.wikipedia.org/w/api.php`.
    api_base: Url,
    /// Canonical article base, e.g. `https://en.wikipedia.org/wiki/`.
    page_base: Url,
    client: reqwest::Client,
}

impl WikiClient {
    /// Create a client for the configured language edition.
    pub fn new(config: &WikipediaConfig) -> Result<Self> {
        if config.language.is_empty() || !config.language.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(WikideckError::config(format!(
                "invalid language code: {:?}",
                config.language
            )));
        }

        let origin = Url::parse(&format!("https://{}.wikipedia.org/", config.language))
            .map_err(|e| WikideckError::config(format!("bad origin: {e}")))?;

        Self::with_origin(&origin, config)
    }

    /// Create a client against an explicit origin.
    ///
    /// Useful for self-hosted MediaWiki mirrors and for tests against a mock
    /// server; `new` points this at `https://{language}.wikipedia.org/`.
    pub fn with_origin(origin: &Url, config: &WikipediaConfig) -> Result<Self> {
        let rest_base = origin
            .join("api/rest_v1/")
            .map_err(|e| WikideckError::config(format!("bad REST base: {e}")))?;
        let api_base = origin
            .join("w/api.php")
            .map_err(|e| WikideckError::config(format!("bad API base: {e}")))?;
        let page_base = origin
            .join("wiki/")
            .map_err(|e| WikideckError::config(format!("bad page base: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WikideckError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            rest_base,
            api_base,
            page_base,
            client,
        })
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Full-text search for pages matching `query`.
    ///
    /// Returns at most `limit` results with markup-free snippets. Transport
    /// failure is an error; search has no sensible empty default.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
        if limit < 1 {
            return Err(WikideckError::validation("search limit must be at least 1"));
        }

        let limit_str = limit.to_string();
        let response: api::SearchResponse = self
            .api_get(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit_str),
                ("srprop", "snippet|titlesnippet|size|timestamp"),
            ])
            .await?;

        let results = response
            .query
            .search
            .into_iter()
            .map(|item| SearchResult {
                url: self.page_url(&item.title),
                snippet: sanitize::clean_snippet(&item.snippet),
                title: item.title,
                size: item.size,
                timestamp: item.timestamp,
            })
            .collect::<Vec<_>>();

        debug!(count = results.len(), "search complete");
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Page retrieval
    // -----------------------------------------------------------------------

    /// Retrieve a complete page as a [`PageRecord`].
    ///
    /// Returns `Ok(None)` when the source reports the title as not found.
    /// The primary content fetch must succeed; summary, categories, and
    /// links are degraded fetches that fall back to empty values.
    #[instrument(skip(self))]
    pub async fn get_page(&self, title: &str, include_links: bool) -> Result<Option<PageRecord>> {
        let content_url = self.rest_url(&["page", "html"], title);

        let response = self
            .client
            .get(content_url.clone())
            .send()
            .await
            .map_err(|e| WikideckError::Network(format!("{content_url}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%title, "page not found");
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(WikideckError::Network(format!(
                "{content_url}: HTTP {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| WikideckError::Network(format!("{content_url}: body read failed: {e}")))?;

        let content = sanitize::extract_text(&html);

        let summary = degraded("summary", title, self.try_rest_summary(title).await);
        let categories = degraded("categories", title, self.try_page_categories(title).await);
        let links = if include_links {
            degraded(
                "links",
                title,
                self.try_page_links(title, PAGE_LINK_LIMIT).await,
            )
        } else {
            Vec::new()
        };

        Ok(Some(PageRecord {
            title: title.to_string(),
            content,
            url: self.page_url(title),
            summary,
            categories,
            links,
        }))
    }

    /// Get a plain-text summary limited to `sentences` sentences.
    ///
    /// Returns `Ok(None)` when the source's page map carries only the
    /// missing-page sentinel id.
    #[instrument(skip(self))]
    pub async fn get_summary(&self, title: &str, sentences: u32) -> Result<Option<String>> {
        let sentences_str = sentences.to_string();
        let response: api::PagesResponse = self
            .api_get(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", &sentences_str),
                ("titles", title),
            ])
            .await?;

        for (page_id, page) in &response.query.pages {
            if page_id != api::MISSING_PAGE_ID {
                return Ok(Some(page.extract.clone().unwrap_or_default()));
            }
        }

        Ok(None)
    }

    /// Get a random main-namespace page title.
    #[instrument(skip(self))]
    pub async fn get_random_page(&self) -> Result<Option<String>> {
        let response: api::RandomResponse = self
            .api_get(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "random"),
                ("rnnamespace", "0"),
                ("rnlimit", "1"),
            ])
            .await?;

        Ok(response.query.random.into_iter().next().map(|r| r.title))
    }

    // -----------------------------------------------------------------------
    // Links & categories
    // -----------------------------------------------------------------------

    /// Get up to `limit` internal links from a page.
    ///
    /// Transport failure degrades to an empty list.
    pub async fn get_page_links(&self, title: &str, limit: u32) -> Vec<String> {
        degraded("links", title, self.try_page_links(title, limit).await)
    }

    /// Get the categories of a page, `Category:` prefixes stripped.
    ///
    /// Transport failure degrades to an empty list.
    pub async fn get_page_categories(&self, title: &str) -> Vec<String> {
        degraded("categories", title, self.try_page_categories(title).await)
    }

    async fn try_page_links(&self, title: &str, limit: u32) -> Result<Vec<String>> {
        let limit_str = limit.to_string();
        let response: api::PagesResponse = self
            .api_get(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "links"),
                ("titles", title),
                ("pllimit", &limit_str),
                ("plnamespace", "0"),
            ])
            .await?;

        let mut links = Vec::new();
        for page in response.query.pages.into_values() {
            links.extend(page.links.into_iter().map(|l| l.title));
        }
        Ok(links)
    }

    async fn try_page_categories(&self, title: &str) -> Result<Vec<String>> {
        let limit_str = CATEGORY_LIMIT.to_string();
        let response: api::PagesResponse = self
            .api_get(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "categories"),
                ("titles", title),
                ("cllimit", &limit_str),
            ])
            .await?;

        let mut categories = Vec::new();
        for page in response.query.pages.into_values() {
            categories.extend(
                page.categories
                    .into_iter()
                    .map(|c| c.title.trim_start_matches("Category:").to_string()),
            );
        }
        Ok(categories)
    }

    async fn try_rest_summary(&self, title: &str) -> Result<String> {
        let url = self.rest_url(&["page", "summary"], title);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| WikideckError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikideckError::Network(format!("{url}: HTTP {status}")));
        }

        let summary: api::SummaryResponse = response
            .json()
            .await
            .map_err(|e| WikideckError::parse(format!("{url}: {e}")))?;

        Ok(summary.extract)
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// Issue a classic-API GET and decode the JSON body.
    async fn api_get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(self.api_base.clone())
            .query(params)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| WikideckError::Network(format!("{}: {e}", self.api_base)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikideckError::Network(format!(
                "{}: HTTP {status}",
                self.api_base
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| WikideckError::parse(format!("{}: {e}", self.api_base)))
    }

    /// Canonical, percent-encoded article URL for a title.
    pub fn page_url(&self, title: &str) -> String {
        let mut url = self.page_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(title);
        }
        url.to_string()
    }

    /// REST endpoint URL with the title as a trailing percent-encoded segment.
    fn rest_url(&self, segments: &[&str], title: &str) -> Url {
        let mut url = self.rest_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push(title);
        }
        url
    }
}

/// Unwrap a secondary-fetch result, logging and defaulting on failure.
///
/// This is the degrade path for enrichment calls: the caller keeps going
/// with an empty value instead of failing the page.
fn degraded<T: Default>(what: &str, title: &str, result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(%title, error = %err, "{what} fetch degraded to empty default");
            T::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
