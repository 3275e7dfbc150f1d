//! Core domain types shared between retrieval and assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// Normalized result of fetching one encyclopedia page.
///
/// `content` is plain text: no markup tag spans and no bracketed numeric
/// reference markers survive retrieval. `url` is the canonical,
/// percent-encoded page address derived from the title and the configured
/// language. Immutable once returned by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Requested or resolved page title.
    pub title: String,
    /// Cleaned plain-text body.
    pub content: String,
    /// Canonical page URL.
    pub url: String,
    /// Short summary; empty when the source has none.
    #[serde(default)]
    pub summary: String,
    /// Category names, `Category:` prefix stripped.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Outbound internal link titles; empty when link retrieval was skipped.
    #[serde(default)]
    pub links: Vec<String>,
}

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// One hit from a full-text search against the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching page title.
    pub title: String,
    /// Markup-free, entity-decoded snippet.
    pub snippet: String,
    /// Page size in bytes as reported by the source.
    pub size: u64,
    /// Last-edit timestamp, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Canonical page URL.
    pub url: String,
}

// ---------------------------------------------------------------------------
// TopicSummary
// ---------------------------------------------------------------------------

/// A search hit paired with its extracted summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Page title.
    pub title: String,
    /// Canonical page URL.
    pub url: String,
    /// Search snippet for the hit.
    pub snippet: String,
    /// Extracted summary; `None` when the page has gone missing or the
    /// summary call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_record_roundtrip() {
        let record = PageRecord {
            title: "Machine learning".into(),
            content: "Machine learning is a field of study.".into(),
            url: "https://en.wikipedia.org/wiki/Machine_learning".into(),
            summary: "A field of study.".into(),
            categories: vec!["Artificial intelligence".into()],
            links: vec!["Neural network".into()],
        };

        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: PageRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }

    #[test]
    fn search_result_defaults_missing_fields() {
        let json = r#"{
            "title": "Rust",
            "snippet": "A systems language",
            "size": 1024,
            "url": "https://en.wikipedia.org/wiki/Rust"
        }"#;
        let parsed: SearchResult = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.title, "Rust");
        assert!(parsed.timestamp.is_none());
    }

    #[test]
    fn topic_summary_omits_absent_summary() {
        let topic = TopicSummary {
            title: "Rust".into(),
            url: "https://en.wikipedia.org/wiki/Rust".into(),
            snippet: "A systems language".into(),
            summary: None,
        };
        let json = serde_json::to_string(&topic).expect("serialize");
        assert!(!json.contains("summary"));
    }
}
