//! wikideck CLI — encyclopedia topics in, slide decks out.
//!
//! Searches and retrieves Wikipedia content, assembles it into PowerPoint
//! presentations, and inspects existing decks.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
