//! Import command.

use std::sync::Arc;

use anyhow::{Context, Result};
use backfill_core::{CoreError, Importer, RunOptions, RunSummary};
use backfill_git::{Identity, RepoSettings, Repository};
use backfill_gitlab::{ClientSettings, GitLabClient, PaginationStop};
use clap::Args;
use tracing::info;

use super::ConfigArgs;

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Record commits locally without pushing
    #[arg(long)]
    pub no_push: bool,
}

/// Runs the import command.
pub fn run(args: ImportArgs) -> Result<()> {
    let settings = args
        .config
        .load()?
        .resolve()
        .context("invalid configuration")?;

    let client = GitLabClient::new(
        ClientSettings::new(&settings.gitlab_url, &settings.gitlab_token)
            .with_timeout(settings.timeout),
    )
    .context("failed to create GitLab client")?;
    let importer = Importer::new(Arc::new(client), settings.author_name.clone());

    let repo_settings = RepoSettings {
        repo_url: settings.origin_url.clone(),
        token: Some(settings.origin_token.clone()),
        path: settings.clone_path.clone(),
        branch: settings.branch.clone(),
        identity: Identity {
            name: settings.author_name.clone(),
            email: settings.author_email.clone(),
        },
    };
    let push = !args.no_push;
    let open_store = move || Repository::open_or_clone(&repo_settings);

    let rt = super::runtime()?;
    let result = rt.block_on(importer.run(open_store, RunOptions { push }));

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(CoreError::EmptyContributions { user_id }) => {
            info!(user_id, "no contributed projects, nothing to import");
            println!("No contributed projects found, nothing to import.");
            Ok(())
        }
        Err(e) => Err(e).context("import failed"),
    }
}

fn print_summary(summary: &RunSummary) {
    let report = &summary.report;
    let failed = report.failures().count();
    let user = &summary.user.username;
    let pushed = if summary.pushed { "yes" } else { "no" };

    println!(
        "Imported {} new commit(s) for {user} from {} project(s)",
        summary.imported,
        summary.project_count()
    );
    println!(
        "  projects: {} fetched, {} empty, {failed} failed",
        report.fetched_count(),
        report.empty_count()
    );
    println!("  commits fetched: {}", report.total_commits());
    println!("  pushed: {pushed}");
    println!("  elapsed: {:.1}s", summary.elapsed.as_secs_f64());

    if failed > 0 {
        println!();
        println!("Failed projects:");
        for (project, reason) in report.failures() {
            println!("  {project}: {reason}");
        }
    }

    if !summary.store_failures.is_empty() {
        println!();
        println!("Batches not recorded:");
        for (project, reason) in &summary.store_failures {
            println!("  {project}: {reason}");
        }
    }

    let truncated: Vec<_> = report.truncated().collect();
    if !truncated.is_empty() {
        println!();
        println!("History possibly incomplete:");
        for (project, stop) in truncated {
            println!("  {project}: {}", describe_stop(stop));
        }
    }
}

fn describe_stop(stop: PaginationStop) -> String {
    match stop {
        PaginationStop::Exhausted => "complete".to_string(),
        PaginationStop::DuplicatePage { page } => format!("page {page} repeated earlier commits"),
        PaginationStop::PageLimit { pages } => format!("stopped after {pages} pages"),
    }
}
