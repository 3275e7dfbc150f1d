//! Application configuration for wikideck.
//!
//! User config lives at `~/.wikideck/wikideck.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikideckError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikideck.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikideck";

// ---------------------------------------------------------------------------
// Config structs (matching wikideck.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote knowledge source settings.
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    /// Retrieval defaults.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Deck assembly defaults.
    #[serde(default)]
    pub deck: DeckConfig,
}

/// `[wikipedia]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// Wikipedia language code (subdomain of the API host).
    #[serde(default = "default_language")]
    pub language: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_language() -> String {
    "en".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default maximum search results.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Default maximum internal links fetched per page.
    #[serde(default = "default_link_limit")]
    pub link_limit: u32,

    /// Default sentence count for summary extraction.
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            link_limit: default_link_limit(),
            summary_sentences: default_summary_sentences(),
        }
    }
}

fn default_search_limit() -> u32 {
    10
}
fn default_link_limit() -> u32 {
    50
}
fn default_summary_sentences() -> u32 {
    3
}

/// `[deck]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Default output directory for generated decks.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default body font name.
    #[serde(default = "default_body_font")]
    pub body_font: String,

    /// Default body font size in points.
    #[serde(default = "default_body_font_size")]
    pub body_font_size: u32,

    /// Maximum bullet points per content slide.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            body_font: default_body_font(),
            body_font_size: default_body_font_size(),
            max_points: default_max_points(),
        }
    }
}

fn default_output_dir() -> String {
    "~/wikideck".into()
}
fn default_body_font() -> String {
    "Arial".into()
}
fn default_body_font_size() -> u32 {
    18
}
fn default_max_points() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Get the path to the config directory (`~/.wikideck/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WikideckError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikideck/wikideck.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WikideckError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| WikideckError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WikideckError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WikideckError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WikideckError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("language"));
        assert!(toml_str.contains("output_dir"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.wikipedia.language, "en");
        assert_eq!(parsed.retrieval.search_limit, 10);
        assert_eq!(parsed.deck.body_font, "Arial");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[wikipedia]
language = "de"

[deck]
output_dir = "/tmp/decks"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.wikipedia.language, "de");
        assert_eq!(config.wikipedia.timeout_secs, 30);
        assert_eq!(config.deck.output_dir, "/tmp/decks");
        assert_eq!(config.retrieval.link_limit, 50);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config: AppConfig = toml::from_str("").expect("parse empty");
        assert_eq!(config.wikipedia.language, "en");
        assert_eq!(config.deck.max_points, 5);
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/tmp/decks"), PathBuf::from("/tmp/decks"));
        let expanded = expand_tilde("~/decks");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
