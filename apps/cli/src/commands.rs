//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wikideck_core::pipeline::{BuildConfig, BuildResult, ProgressReporter, build_deck};
use wikideck_deck::Presentation;
use wikideck_shared::{AppConfig, expand_tilde, init_config, load_config};
use wikideck_wiki::WikiClient;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikideck — turn encyclopedia topics into slide decks.
#[derive(Parser)]
#[command(
    name = "wikideck",
    version,
    about = "Retrieve Wikipedia content and assemble it into PowerPoint decks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search for pages matching a query.
    Search {
        /// Search query.
        query: String,

        /// Maximum number of results.
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Fetch one page and show its normalized record.
    Page {
        /// Page title.
        title: String,

        /// Skip outbound link retrieval.
        #[arg(long)]
        no_links: bool,
    },

    /// Fetch a sentence-limited summary of a page.
    Summary {
        /// Page title.
        title: String,

        /// Number of sentences.
        #[arg(short, long)]
        sentences: Option<u32>,
    },

    /// Pick a random page title.
    Random,

    /// Build a deck from topics or a search query.
    Build {
        /// Topic titles to include, in order.
        topics: Vec<String>,

        /// Search query to expand into topics when none are given.
        #[arg(short, long)]
        query: Option<String>,

        /// Output path for the .pptx artifact.
        #[arg(short, long)]
        out: Option<String>,

        /// Deck title (defaults to the query or first topic).
        #[arg(long)]
        title: Option<String>,
    },

    /// Show the slide count and text of an existing deck.
    Inspect {
        /// Path to a .pptx artifact.
        path: PathBuf,
    },

    /// Print the agent capability registry as JSON.
    Agents,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikideck=info",
        1 => "wikideck=debug",
        _ => "wikideck=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;

    match cli.command {
        Command::Search { query, limit } => cmd_search(&config, &query, limit).await,
        Command::Page { title, no_links } => cmd_page(&config, &title, !no_links).await,
        Command::Summary { title, sentences } => cmd_summary(&config, &title, sentences).await,
        Command::Random => cmd_random(&config).await,
        Command::Build {
            topics,
            query,
            out,
            title,
        } => cmd_build(&config, topics, query, out, title).await,
        Command::Inspect { path } => cmd_inspect(&path),
        Command::Agents => cmd_agents(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

async fn cmd_search(config: &AppConfig, query: &str, limit: Option<u32>) -> Result<()> {
    let client = WikiClient::new(&config.wikipedia)?;
    let limit = limit.unwrap_or(config.retrieval.search_limit);

    let results = client.search(query, limit).await?;
    if results.is_empty() {
        println!("No results for \"{query}\".");
        return Ok(());
    }

    for result in &results {
        println!("- {} ({} bytes)", result.title, result.size);
        if !result.snippet.is_empty() {
            println!("  {}", result.snippet);
        }
        println!("  {}", result.url);
    }
    Ok(())
}

async fn cmd_page(config: &AppConfig, title: &str, include_links: bool) -> Result<()> {
    let client = WikiClient::new(&config.wikipedia)?;

    let Some(page) = client.get_page(title, include_links).await? else {
        println!("Not found: {title}");
        return Ok(());
    };

    println!("{}", page.title);
    println!("{}", page.url);
    if !page.summary.is_empty() {
        println!("\n{}", page.summary);
    }
    if !page.categories.is_empty() {
        println!("\nCategories: {}", page.categories.join(", "));
    }
    if !page.links.is_empty() {
        let shown: Vec<_> = page.links.iter().take(10).cloned().collect();
        println!("Links ({} total): {}", page.links.len(), shown.join(", "));
    }
    println!(
        "\nContent: {} words",
        page.content.split_whitespace().count()
    );
    Ok(())
}

async fn cmd_summary(config: &AppConfig, title: &str, sentences: Option<u32>) -> Result<()> {
    let client = WikiClient::new(&config.wikipedia)?;
    let sentences = sentences.unwrap_or(config.retrieval.summary_sentences);

    match client.get_summary(title, sentences).await? {
        Some(summary) if !summary.is_empty() => println!("{summary}"),
        Some(_) => println!("No summary available for {title}."),
        None => println!("Not found: {title}"),
    }
    Ok(())
}

async fn cmd_random(config: &AppConfig) -> Result<()> {
    let client = WikiClient::new(&config.wikipedia)?;

    match client.get_random_page().await? {
        Some(title) => println!("{title}"),
        None => println!("The source returned no random page."),
    }
    Ok(())
}

async fn cmd_build(
    config: &AppConfig,
    topics: Vec<String>,
    query: Option<String>,
    out: Option<String>,
    title: Option<String>,
) -> Result<()> {
    let client = WikiClient::new(&config.wikipedia)?;

    let output = match out {
        Some(path) => expand_tilde(&path),
        None => {
            let stem = title
                .as_deref()
                .or(query.as_deref())
                .or_else(|| topics.first().map(String::as_str))
                .unwrap_or("deck");
            expand_tilde(&config.deck.output_dir).join(format!("{}.pptx", slug(stem)))
        }
    };

    let build_config = BuildConfig {
        topics,
        query,
        title,
        output,
        max_points: config.deck.max_points,
        search_limit: config.retrieval.search_limit,
    };

    let progress = BarProgress::new();
    let result = build_deck(&build_config, &client, &progress).await?;

    info!(
        output = %result.output.display(),
        slides = result.slide_count,
        "deck build complete"
    );
    println!(
        "Saved {} ({} slides, {} topics) in {:.1}s",
        result.output.display(),
        result.slide_count,
        result.topics_included.len(),
        result.elapsed.as_secs_f64()
    );
    if !result.topics_missing.is_empty() {
        println!("Skipped: {}", result.topics_missing.join(", "));
    }
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let presentation = Presentation::load(path)?;

    println!("{}: {} slides", path.display(), presentation.slide_count());
    for (label, texts) in presentation.extract_all_text() {
        println!("\n{label}:");
        for text in texts {
            for line in text.lines() {
                println!("  - {line}");
            }
        }
    }
    Ok(())
}

fn cmd_agents() -> Result<()> {
    let registry = wikideck_core::agents::registry();
    println!("{}", serde_json::to_string_pretty(&registry)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress bar adapter
// ---------------------------------------------------------------------------

/// Adapts the pipeline's progress callbacks to an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl ProgressReporter for BarProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
        self.bar.tick();
    }

    fn topic_fetched(&self, title: &str, current: usize, total: usize) {
        self.bar.set_message(format!("[{current}/{total}] {title}"));
        self.bar.tick();
    }

    fn done(&self, _result: &BuildResult) {
        self.bar.finish_and_clear();
    }
}

/// Filesystem-safe slug from a title or query.
fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() { "deck".into() } else { slug }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_normalizes_titles() {
        assert_eq!(slug("Machine Learning"), "machine-learning");
        assert_eq!(slug("  C++ (language)!  "), "c-language");
        assert_eq!(slug("???"), "deck");
    }
}
