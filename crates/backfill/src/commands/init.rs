//! Initialize command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use backfill_config::{CONFIG_FILE_NAME, write_template};
use clap::Args;

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Where to write the configuration file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    pub path: PathBuf,
}

/// Runs the init command.
pub fn run(args: InitArgs) -> Result<()> {
    write_template(&args.path, args.force)
        .with_context(|| format!("failed to write {}", args.path.display()))?;

    println!("Created {}", args.path.display());
    println!("Fill in the tokens (or export them), then run `backfill import`.");
    Ok(())
}
