//! Concurrent fan-in of per-project commit fetches.

use std::sync::Arc;

use async_trait::async_trait;
use backfill_commit::{CommitBatch, ProjectId};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{GitLabApi, GitLabError, PageLimits, PaginationStop, fetch_project_commits};

/// The receiving side of the batches went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("commit sink closed")]
pub struct SinkClosed;

/// Destination of fetched batches.
///
/// Every fetch task owns a clone; the sink counts as closed once the last
/// clone is dropped.
#[async_trait]
pub trait BatchSink: Clone + Send + Sync + 'static {
    /// Delivers one batch, waiting for capacity if needed.
    async fn send(&self, batch: CommitBatch) -> Result<(), SinkClosed>;
}

#[async_trait]
impl BatchSink for mpsc::Sender<CommitBatch> {
    async fn send(&self, batch: CommitBatch) -> Result<(), SinkClosed> {
        mpsc::Sender::send(self, batch)
            .await
            .map_err(|_| SinkClosed)
    }
}

/// What happened to one project during [`fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// A batch of `commits` was delivered to the sink.
    Fetched {
        commits: usize,
        stop: PaginationStop,
    },
    /// The project has no commits by the author.
    Empty,
    /// The fetch or the delivery failed; the project contributed nothing.
    Failed { reason: String },
}

/// Per-project outcomes of one [`fetch_all`] run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    outcomes: Vec<(ProjectId, ProjectOutcome)>,
}

impl FetchReport {
    /// Returns all outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[(ProjectId, ProjectOutcome)] {
        &self.outcomes
    }

    /// Returns the outcome for `project`, if it was part of the run.
    #[must_use]
    pub fn outcome(&self, project: ProjectId) -> Option<&ProjectOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == project)
            .map(|(_, outcome)| outcome)
    }

    /// Number of projects whose batch was delivered.
    #[must_use]
    pub fn fetched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ProjectOutcome::Fetched { .. }))
            .count()
    }

    /// Number of projects without commits by the author.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ProjectOutcome::Empty))
            .count()
    }

    /// Failed projects with their reason.
    pub fn failures(&self) -> impl Iterator<Item = (ProjectId, &str)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            ProjectOutcome::Failed { reason } => Some((*id, reason.as_str())),
            _ => None,
        })
    }

    /// Projects whose pagination stopped before an empty page.
    pub fn truncated(&self) -> impl Iterator<Item = (ProjectId, PaginationStop)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            ProjectOutcome::Fetched { stop, .. } if stop.is_truncated() => Some((*id, *stop)),
            _ => None,
        })
    }

    /// Total commits delivered across all projects.
    #[must_use]
    pub fn total_commits(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                ProjectOutcome::Fetched { commits, .. } => *commits,
                _ => 0,
            })
            .sum()
    }
}

/// Fetches the commits of every project concurrently and feeds them to `sink`.
///
/// One task is spawned per project, without a concurrency cap. A failing
/// project is logged and reported as [`ProjectOutcome::Failed`]; it never
/// aborts the others. Once every task has finished, the orchestrator drops its
/// own handle on `sink`, which closes an mpsc channel exactly once and only
/// after all producers are done.
pub async fn fetch_all<S: BatchSink>(
    api: Arc<dyn GitLabApi>,
    projects: &[ProjectId],
    author: &str,
    limits: PageLimits,
    sink: S,
) -> FetchReport {
    let mut handles = Vec::with_capacity(projects.len());

    for &project in projects {
        let api = Arc::clone(&api);
        let sink = sink.clone();
        let author = author.to_string();

        debug!(%project, "spawning commit fetch");
        let handle = tokio::spawn(async move {
            match fetch_project_commits(api.as_ref(), project, &author, limits).await {
                Ok(fetched) => {
                    let commits = fetched.commits.len();
                    let stop = fetched.stop;
                    info!(%project, commits, "fetched commits");

                    match sink.send(CommitBatch::new(project, fetched.commits)).await {
                        Ok(()) => ProjectOutcome::Fetched { commits, stop },
                        Err(e) => {
                            warn!(%project, "batch dropped: {e}");
                            ProjectOutcome::Failed {
                                reason: e.to_string(),
                            }
                        }
                    }
                }
                Err(GitLabError::NoCommits { .. }) => {
                    info!(%project, "no commits by author");
                    ProjectOutcome::Empty
                }
                Err(e) => {
                    warn!(%project, error = %e, "failed to fetch commits");
                    ProjectOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        });

        handles.push((project, handle));
    }

    info!(
        tasks = handles.len(),
        "waiting for all commits to be fetched"
    );

    let mut outcomes = Vec::with_capacity(handles.len());
    for (project, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%project, "fetch task aborted: {e}");
                ProjectOutcome::Failed {
                    reason: format!("fetch task aborted: {e}"),
                }
            }
        };
        outcomes.push((project, outcome));
    }

    drop(sink);
    debug!("all fetch tasks finished, sink released");

    FetchReport { outcomes }
}
