//! Per-project commit batch.

use crate::{Commit, ProjectId};

/// All commits fetched for one project in one run.
///
/// Commits are deduplicated and keep the order the server returned them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBatch {
    /// Project the commits came from.
    pub project: ProjectId,

    /// The commits.
    pub commits: Vec<Commit>,
}

impl CommitBatch {
    /// Creates a batch.
    #[must_use]
    pub fn new(project: ProjectId, commits: Vec<Commit>) -> Self {
        Self { project, commits }
    }

    /// Number of commits in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns true if the batch holds no commits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
