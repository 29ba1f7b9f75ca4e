//! Projects command.

use std::sync::Arc;

use anyhow::{Context, Result};
use backfill_core::Importer;
use backfill_gitlab::{ClientSettings, GitLabClient};
use clap::Args;

use super::ConfigArgs;

/// Arguments for the projects command.
#[derive(Debug, Args)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Runs the projects command.
pub fn run(args: ProjectsArgs) -> Result<()> {
    let config = args.config.load()?;
    config.validate_gitlab().context("invalid configuration")?;

    let client = GitLabClient::new(
        ClientSettings::new(
            config.gitlab.base_url.unwrap_or_default(),
            config.gitlab.token.unwrap_or_default(),
        )
        .with_timeout(std::time::Duration::from_secs(config.gitlab.timeout_secs)),
    )
    .context("failed to create GitLab client")?;
    let importer = Importer::new(Arc::new(client), config.author.name.unwrap_or_default());

    let rt = super::runtime()?;
    let (user, projects) = rt.block_on(async {
        let user = importer.resolve_user().await?;
        let projects = importer.contributed_projects(&user).await?;
        anyhow::Ok((user, projects))
    })?;

    println!(
        "{} ({}) contributed to {} project(s)",
        user.username,
        user.id,
        projects.len()
    );
    for project in &projects {
        let path = project
            .path_with_namespace
            .as_deref()
            .or(project.name.as_deref())
            .unwrap_or("-");
        println!("  {:>8}  {path}", project.id);
    }

    Ok(())
}
