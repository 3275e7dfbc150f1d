//! End-to-end `build` pipeline: topics → retrieval → deck → artifact.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, instrument, warn};

use wikideck_deck::Presentation;
use wikideck_shared::{PageRecord, Result, WikideckError};
use wikideck_wiki::WikiClient;

use crate::outline;

/// Configuration for the `build` pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Explicit topic titles to include, in order.
    pub topics: Vec<String>,
    /// Search query used to discover topics when none are given explicitly.
    pub query: Option<String>,
    /// Deck title; defaults to the first topic or the query.
    pub title: Option<String>,
    /// Output artifact path.
    pub output: PathBuf,
    /// Maximum bullet points per content slide.
    pub max_points: usize,
    /// Result cap when expanding a query into topics.
    pub search_limit: u32,
}

/// Result of the `build` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    /// Path of the saved artifact.
    pub output: PathBuf,
    /// Slides in the saved deck.
    pub slide_count: usize,
    /// Topics that made it into the deck, in slide order.
    pub topics_included: Vec<String>,
    /// Topics that were requested but could not be retrieved.
    pub topics_missing: Vec<String>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each topic fetch attempt.
    fn topic_fetched(&self, title: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn topic_fetched(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Resolve topics (explicit list, or expand the query via search)
/// 2. Fetch each topic strictly in order, tolerating per-topic failures
/// 3. Assemble the deck
/// 4. Save the artifact
#[instrument(skip_all, fields(output = %config.output.display()))]
pub async fn build_deck(
    config: &BuildConfig,
    client: &WikiClient,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();

    // --- Phase 1: Topics ---
    progress.phase("Resolving topics");
    let topics = resolve_topics(config, client).await?;
    if topics.is_empty() {
        return Err(WikideckError::validation(
            "no topics to build from: pass topics or a search query",
        ));
    }
    info!(count = topics.len(), "topics resolved");

    // --- Phase 2: Retrieval ---
    progress.phase("Fetching pages");
    let total = topics.len();
    let mut records: Vec<PageRecord> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for (i, topic) in topics.iter().enumerate() {
        progress.topic_fetched(topic, i + 1, total);

        match client.get_page(topic, false).await {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {
                warn!(%topic, "not found, skipping");
                missing.push(topic.clone());
            }
            Err(err) => {
                warn!(%topic, error = %err, "fetch failed, skipping");
                missing.push(topic.clone());
            }
        }
    }

    if records.is_empty() {
        return Err(WikideckError::validation(
            "none of the requested topics could be retrieved",
        ));
    }

    // --- Phase 3: Assembly ---
    progress.phase("Assembling deck");
    let title = config
        .title
        .clone()
        .or_else(|| config.query.clone())
        .unwrap_or_else(|| records[0].title.clone());
    let subtitle = format!("{} topics from Wikipedia", records.len());

    let deck: Presentation =
        outline::deck_from_records(&title, &subtitle, &records, config.max_points);

    // --- Phase 4: Save ---
    progress.phase("Saving");
    deck.save(&config.output)?;

    let result = BuildResult {
        output: config.output.clone(),
        slide_count: deck.slide_count(),
        topics_included: records.into_iter().map(|r| r.title).collect(),
        topics_missing: missing,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        slide_count = result.slide_count,
        included = result.topics_included.len(),
        missing = result.topics_missing.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "build pipeline complete"
    );

    Ok(result)
}

/// Topics from config: the explicit list, or search hits for the query.
async fn resolve_topics(config: &BuildConfig, client: &WikiClient) -> Result<Vec<String>> {
    if !config.topics.is_empty() {
        return Ok(config.topics.clone());
    }

    let Some(query) = config.query.as_deref() else {
        return Ok(Vec::new());
    };

    let hits = client.search(query, config.search_limit).await?;
    Ok(hits.into_iter().map(|hit| hit.title).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wikideck_shared::WikipediaConfig;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> WikiClient {
        let origin = Url::parse(&server.uri()).expect("server uri");
        WikiClient::with_origin(&origin, &WikipediaConfig::default()).expect("client")
    }

    fn build_config(output: PathBuf, topics: &[&str]) -> BuildConfig {
        BuildConfig {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            query: None,
            title: Some("Test Deck".into()),
            output,
            max_points: 3,
            search_limit: 5,
        }
    }

    #[tokio::test]
    async fn build_tolerates_missing_topics() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/html/Alpha"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<p>Alpha is first. Alpha is fine.</p>"),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/rest_v1/page/html/Ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

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

        let dir = std::env::temp_dir().join("wikideck-pipeline-test");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let output = dir.join("deck.pptx");

        let client = test_client(&server);
        let config = build_config(output.clone(), &["Alpha", "Ghost"]);
        let result = build_deck(&config, &client, &SilentProgress)
            .await
            .expect("build");

        assert_eq!(result.topics_included, vec!["Alpha"]);
        assert_eq!(result.topics_missing, vec!["Ghost"]);
        // Title + Alpha + sources.
        assert_eq!(result.slide_count, 3);

        let loaded = Presentation::load(&output).expect("load");
        assert_eq!(loaded.slide_count(), 3);
        assert!(loaded.slide_text(1).contains("Alpha is first."));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn build_fails_without_any_retrievable_topic() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/api/rest_v1/page/html/.*$"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = std::env::temp_dir().join("wikideck-pipeline-empty-test");
        std::fs::create_dir_all(&dir).expect("temp dir");

        let client = test_client(&server);
        let config = build_config(dir.join("deck.pptx"), &["Ghost"]);
        let err = build_deck(&config, &client, &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could be retrieved"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn build_rejects_empty_input() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        let config = BuildConfig {
            topics: vec![],
            query: None,
            title: None,
            output: PathBuf::from("unused.pptx"),
            max_points: 3,
            search_limit: 5,
        };
        assert!(build_deck(&config, &client, &SilentProgress).await.is_err());
    }
}
