//! Typed deserialization targets for the MediaWiki response shapes.
//!
//! Every field defaults so a partially-populated response degrades to empty
//! values instead of failing the decode.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Page-id key the classic query API uses for a missing title.
pub(crate) const MISSING_PAGE_ID: &str = "-1";

// ---------------------------------------------------------------------------
// action=query&list=search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub query: SearchQuery,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchItem {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// action=query&prop=... (pages keyed by page id)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PagesResponse {
    #[serde(default)]
    pub query: PagesQuery,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PagesQuery {
    #[serde(default)]
    pub pages: HashMap<String, PageEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageEntry {
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub links: Vec<TitleRef>,
    #[serde(default)]
    pub categories: Vec<TitleRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TitleRef {
    pub title: String,
}

// ---------------------------------------------------------------------------
// action=query&list=random
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RandomResponse {
    #[serde(default)]
    pub query: RandomQuery,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RandomQuery {
    #[serde(default)]
    pub random: Vec<TitleRef>,
}

// ---------------------------------------------------------------------------
// REST page/summary
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    #[serde(default)]
    pub extract: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_decodes() {
        let json = r#"{
            "batchcomplete": "",
            "query": {
                "search": [
                    {"title": "Rust", "snippet": "a <b>language</b>", "size": 100,
                     "timestamp": "2024-03-01T12:00:00Z"},
                    {"title": "Iron oxide"}
                ]
            }
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(parsed.query.search.len(), 2);
        assert_eq!(parsed.query.search[0].title, "Rust");
        assert!(parsed.query.search[0].timestamp.is_some());
        assert_eq!(parsed.query.search[1].size, 0);
    }

    #[test]
    fn pages_response_tolerates_missing_sections() {
        let json = r#"{"query": {"pages": {"-1": {"missing": ""}}}}"#;
        let parsed: PagesResponse = serde_json::from_str(json).expect("decode");
        let entry = parsed.query.pages.get(MISSING_PAGE_ID).expect("entry");
        assert!(entry.extract.is_none());
        assert!(entry.links.is_empty());
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let parsed: PagesResponse = serde_json::from_str("{}").expect("decode");
        assert!(parsed.query.pages.is_empty());

        let parsed: RandomResponse = serde_json::from_str("{}").expect("decode");
        assert!(parsed.query.random.is_empty());
    }
}
