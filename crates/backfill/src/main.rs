//! backfill CLI - Mirror GitLab commit activity into a git repository.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> Result<()> {
    // Before parsing so `.env` can provide BACKFILL_CONFIG and RUST_LOG.
    let dotenv = backfill_config::load_dotenv().context("failed to load development environment")?;
    let cli = cli::Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = dotenv {
        info!(?path, "loaded development environment");
    }

    cli.run()
}
