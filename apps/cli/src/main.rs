//! RankScout CLI: keyword discovery and search ranking monitor.
//!
//! Collects keywords for a site, tracks its search engine rankings and
//! turns the history into prioritized optimization opportunities.

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
