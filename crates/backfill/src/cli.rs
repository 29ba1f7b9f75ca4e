//! CLI definition.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Mirror your GitLab commit activity into a git repository you own.
#[derive(Debug, Parser)]
#[command(name = "backfill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch commits from GitLab, record them locally and push
    Import(commands::import::ImportArgs),

    /// List the projects the token's user contributed to
    Projects(commands::projects::ProjectsArgs),

    /// Write a starter configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Import(args) => commands::import::run(args),
            Commands::Projects(args) => commands::projects::run(args),
            Commands::Init(args) => commands::init::run(args),
        }
    }
}
