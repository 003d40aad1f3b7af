//! nizam-docs: build and preview the nizam documentation catalog.
//!
//! Fetches the manifest's Markdown files into `docs.json` and renders
//! documents the way the website shows them.

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
