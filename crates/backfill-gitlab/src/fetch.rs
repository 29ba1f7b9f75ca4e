//! Paginated commit history of a single project.

use std::collections::HashSet;

use backfill_commit::{Commit, ProjectId};
use tracing::{debug, info, warn};

use crate::{GitLabApi, GitLabError, GitLabResult};

/// Page size and page bound for one project fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Commits requested per page.
    pub per_page: u32,
    /// Hard cap on page requests per project.
    pub max_pages: u32,
}

impl PageLimits {
    /// GitLab's maximum page size.
    pub const DEFAULT_PER_PAGE: u32 = 100;
    /// Guards against a server that never returns an empty page.
    pub const DEFAULT_MAX_PAGES: u32 = 50;
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            per_page: Self::DEFAULT_PER_PAGE,
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }
}

/// Why pagination of a project ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStop {
    /// The server returned an empty page.
    Exhausted,
    /// The given page contained only commits already seen.
    DuplicatePage { page: u32 },
    /// The page bound was reached while commits were still coming.
    PageLimit { pages: u32 },
}

impl PaginationStop {
    /// Returns true if history may have been cut short.
    #[must_use]
    pub fn is_truncated(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// The deduplicated commits of one project.
#[derive(Debug, Clone)]
pub struct ProjectCommits {
    /// Project the commits came from.
    pub project: ProjectId,
    /// Commits in the order the server returned them, each id once.
    pub commits: Vec<Commit>,
    /// How pagination ended.
    pub stop: PaginationStop,
}

/// Fetches every commit of `project` authored by `author`.
///
/// Pages are requested one after another starting at 1. Pagination ends on
/// the first empty page, on the first page that adds no unseen commit, or
/// after `limits.max_pages` pages. The last two are logged as warnings.
///
/// The duplicate-page stop trades completeness for termination: if the
/// server's ordering shifts under concurrent pushes, a page that looks fully
/// seen can precede older commits that were never returned.
///
/// # Errors
///
/// Returns the first request error, or [`GitLabError::NoCommits`] if
/// pagination ends without a single commit.
pub async fn fetch_project_commits(
    api: &dyn GitLabApi,
    project: ProjectId,
    author: &str,
    limits: PageLimits,
) -> GitLabResult<ProjectCommits> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut commits = Vec::new();
    let mut stop = None;

    for page in 1..=limits.max_pages {
        let received = api
            .commits_page(project, author, page, limits.per_page)
            .await?;

        if received.is_empty() {
            stop = Some(PaginationStop::Exhausted);
            break;
        }

        let before = commits.len();
        for commit in received {
            if seen.insert(commit.id.clone()) {
                commits.push(commit);
            }
        }

        if commits.len() == before {
            warn!(%project, page, "no new commits on page, stopping pagination");
            stop = Some(PaginationStop::DuplicatePage { page });
            break;
        }

        debug!(%project, page, new = commits.len() - before, "page fetched");
    }

    let stop = stop.unwrap_or_else(|| {
        warn!(
            %project,
            max_pages = limits.max_pages,
            "reached maximum page limit"
        );
        PaginationStop::PageLimit {
            pages: limits.max_pages,
        }
    });

    if commits.is_empty() {
        return Err(GitLabError::NoCommits { project });
    }

    info!(%project, count = commits.len(), "found commits");

    Ok(ProjectCommits {
        project,
        commits,
        stop,
    })
}
