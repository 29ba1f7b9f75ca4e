//! Subcommands.

pub mod import;
pub mod init;
pub mod projects;

use std::path::PathBuf;

use anyhow::{Context, Result};
use backfill_config::{CONFIG_FILE_NAME, Config, apply_env_overrides, load_or_default};
use clap::Args;
use tokio::runtime::Runtime;

/// Configuration file selection shared by commands that talk to GitLab.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Path to the configuration file
    #[arg(short, long, env = "BACKFILL_CONFIG", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,
}

impl ConfigArgs {
    /// Loads the file, if any, and applies environment overrides.
    pub fn load(&self) -> Result<Config> {
        let mut config = load_or_default(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }
}

fn runtime() -> Result<Runtime> {
    Runtime::new().context("failed to create async runtime")
}
