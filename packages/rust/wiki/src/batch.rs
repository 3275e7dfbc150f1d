//! Batch helpers over the client: iterate a topic list strictly in order,
//! logging per-item outcomes so one bad title never aborts the batch.

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use wikideck_shared::{PageRecord, Result, TopicSummary};

use crate::client::WikiClient;

/// Sentence count used when summarizing search hits.
const SUMMARY_SENTENCES: u32 = 3;

/// Fetch a [`PageRecord`] for every topic that resolves.
///
/// Topics the source does not know, and topics whose fetch fails, are
/// logged and skipped.
#[instrument(skip_all, fields(topics = topics.len()))]
pub async fn create_knowledge_base(
    client: &WikiClient,
    topics: &[String],
) -> HashMap<String, PageRecord> {
    let mut knowledge_base = HashMap::new();

    for topic in topics {
        match client.get_page(topic, true).await {
            Ok(Some(page)) => {
                info!(%topic, "added to knowledge base");
                knowledge_base.insert(topic.clone(), page);
            }
            Ok(None) => {
                warn!(%topic, "not found, skipping");
            }
            Err(err) => {
                warn!(%topic, error = %err, "fetch failed, skipping");
            }
        }
    }

    info!(entries = knowledge_base.len(), "knowledge base complete");
    knowledge_base
}

/// Search for `query` and pair each of the top hits with its summary.
///
/// The initial search propagates failure; a per-hit summary failure
/// degrades that entry's summary to `None`.
#[instrument(skip(client))]
pub async fn search_and_summarize(
    client: &WikiClient,
    query: &str,
    num_results: u32,
) -> Result<Vec<TopicSummary>> {
    let hits = client.search(query, num_results).await?;
    let mut summaries = Vec::with_capacity(hits.len());

    for hit in hits {
        let summary = match client.get_summary(&hit.title, SUMMARY_SENTENCES).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(title = %hit.title, error = %err, "summary failed, continuing");
                None
            }
        };

        summaries.push(TopicSummary {
            title: hit.title,
            url: hit.url,
            snippet: hit.snippet,
            summary,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wikideck_shared::WikipediaConfig;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> WikiClient {
        let origin = Url::parse(&server.uri()).expect("server uri");
        WikiClient::with_origin(&origin, &WikipediaConfig::default()).expect("client")
    }

    fn json_body(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
    }

    #[tokio::test]
    async fn knowledge_base_skips_missing_topics() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/html/Rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Rust exists.</p>"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/html/Nonsense"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        // Enrichment endpoints fail; pages still degrade to empty values.
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/rest_v1/page/summary/.*$"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let topics = vec!["Rust".to_string(), "Nonsense".to_string()];
        let kb = create_knowledge_base(&client, &topics).await;

        assert_eq!(kb.len(), 1);
        assert_eq!(kb["Rust"].content, "Rust exists.");
        assert!(!kb.contains_key("Nonsense"));
    }

    #[tokio::test]
    async fn search_and_summarize_pairs_hits_with_summaries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .respond_with(json_body(
                r#"{"query": {"search": [
                    {"title": "Machine learning", "snippet": "learning <b>machines</b>", "size": 10},
                    {"title": "Gone", "snippet": "vanished", "size": 5}
                ]}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .and(query_param("titles", "Machine learning"))
            .respond_with(json_body(
                r#"{"query": {"pages": {"11": {"extract": "Machines that learn."}}}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .and(query_param("titles", "Gone"))
            .respond_with(json_body(r#"{"query": {"pages": {"-1": {"missing": ""}}}}"#))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let summaries = search_and_summarize(&client, "learning", 2)
            .await
            .expect("batch");

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Machine learning");
        assert_eq!(summaries[0].summary.as_deref(), Some("Machines that learn."));
        assert_eq!(summaries[0].snippet, "learning machines");
        assert!(summaries[1].summary.is_none());
    }

    #[tokio::test]
    async fn search_and_summarize_propagates_search_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert!(search_and_summarize(&client, "anything", 3).await.is_err());
    }
}
