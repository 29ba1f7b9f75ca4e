//! End-to-end import run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use backfill_commit::{CommitBatch, Project, ProjectId, User};
use backfill_git::GitResult;
use backfill_gitlab::{FetchReport, GitLabApi, PageLimits, fetch_all};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{CommitStore, CoreError, CoreResult};

/// Options for [`Importer::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Push the mirror branch once every batch is recorded.
    pub push: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { push: true }
    }
}

/// What one [`Importer::run`] did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The authenticated user.
    pub user: User,
    /// Per-project fetch outcomes.
    pub report: FetchReport,
    /// Local commits created.
    pub imported: usize,
    /// Batches the store refused, with the reason.
    pub store_failures: Vec<(ProjectId, String)>,
    /// Whether the mirror was pushed.
    pub pushed: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Number of projects the run covered.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.report.outcomes().len()
    }

    /// Returns true if any project or batch was lost.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.report.failures().next().is_some() || !self.store_failures.is_empty()
    }
}

/// Output of the consumer task.
struct Consumed {
    imported: usize,
    failures: Vec<(ProjectId, String)>,
    pushed: bool,
}

/// Imports a user's GitLab activity into a [`CommitStore`].
pub struct Importer {
    api: Arc<dyn GitLabApi>,
    author: String,
    limits: PageLimits,
}

impl Importer {
    /// Creates an importer filtering commits by `author`.
    #[must_use]
    pub fn new(api: Arc<dyn GitLabApi>, author: impl Into<String>) -> Self {
        Self {
            api,
            author: author.into(),
            limits: PageLimits::default(),
        }
    }

    /// Sets the pagination limits.
    #[must_use]
    pub fn with_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolves the token's user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn resolve_user(&self) -> CoreResult<User> {
        let user = self.api.current_user().await?;
        info!(user_id = user.id, username = %user.username, "resolved user");
        Ok(user)
    }

    /// Lists the projects `user` contributed to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn contributed_projects(&self, user: &User) -> CoreResult<Vec<Project>> {
        let projects = self.api.contributed_projects(user.id).await?;
        info!(
            user_id = user.id,
            count = projects.len(),
            "found contributed projects"
        );
        Ok(projects)
    }

    /// Runs a full import.
    ///
    /// The user is resolved and their projects listed before `open_store` is
    /// called, so a user without projects never touches the mirror. Fetches
    /// then run concurrently while a single blocking consumer records each
    /// batch as it arrives; the mirror is pushed after the last batch unless
    /// `options.push` is false. A project or batch that fails is reported in
    /// the summary and does not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyContributions`] if the user has no projects,
    /// or an error if resolving the user, listing projects, opening the store
    /// or pushing fails.
    pub async fn run<S, F>(&self, open_store: F, options: RunOptions) -> CoreResult<RunSummary>
    where
        S: CommitStore,
        F: FnOnce() -> GitResult<S> + Send + 'static,
    {
        let started = Instant::now();

        let user = self.resolve_user().await?;
        let projects = self.contributed_projects(&user).await?;
        if projects.is_empty() {
            return Err(CoreError::EmptyContributions { user_id: user.id });
        }
        let ids: Vec<ProjectId> = projects.iter().map(|p| p.id).collect();

        let store = tokio::task::spawn_blocking(open_store)
            .await
            .map_err(|e| CoreError::ConsumerPanicked(e.to_string()))??;

        let (tx, rx) = mpsc::channel(ids.len());
        let consumer = tokio::task::spawn_blocking(move || consume(store, rx, options.push));

        let api = Arc::clone(&self.api);
        let report = fetch_all(api, &ids, &self.author, self.limits, tx).await;
        debug!(
            fetched = report.fetched_count(),
            "fetch finished, waiting for consumer"
        );

        let consumed = consumer
            .await
            .map_err(|e| CoreError::ConsumerPanicked(e.to_string()))??;

        let summary = RunSummary {
            user,
            report,
            imported: consumed.imported,
            store_failures: consumed.failures,
            pushed: consumed.pushed,
            elapsed: started.elapsed(),
        };
        info!(
            projects = summary.project_count(),
            imported = summary.imported,
            pushed = summary.pushed,
            elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            "import finished"
        );

        Ok(summary)
    }
}

/// Records batches until every producer is gone, then pushes.
fn consume<S: CommitStore>(
    mut store: S,
    mut rx: mpsc::Receiver<CommitBatch>,
    push: bool,
) -> GitResult<Consumed> {
    let mut imported = 0;
    let mut failures = Vec::new();

    while let Some(batch) = rx.blocking_recv() {
        match store.materialize_commits(&batch.commits) {
            Ok(created) => {
                info!(project = %batch.project, received = batch.len(), created, "batch recorded");
                imported += created;
            }
            Err(e) => {
                error!(project = %batch.project, error = %e, "failed to record batch");
                failures.push((batch.project, e.to_string()));
            }
        }
    }

    if !push {
        info!("push disabled, mirror left local");
        return Ok(Consumed {
            imported,
            failures,
            pushed: false,
        });
    }

    store.push()?;
    Ok(Consumed {
        imported,
        failures,
        pushed: true,
    })
}
