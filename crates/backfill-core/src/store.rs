//! Destination of fetched commits.

use backfill_commit::Commit;
use backfill_git::{GitResult, Repository};

/// Records commit batches and publishes them.
///
/// A store is owned by the single consumer task, so it only needs to be
/// `Send`.
pub trait CommitStore: Send + 'static {
    /// Records `commits`, returning how many were new.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be recorded.
    fn materialize_commits(&mut self, commits: &[Commit]) -> GitResult<usize>;

    /// Publishes everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing fails.
    fn push(&self) -> GitResult<()>;
}

impl CommitStore for Repository {
    fn materialize_commits(&mut self, commits: &[Commit]) -> GitResult<usize> {
        Repository::materialize_commits(self, commits)
    }

    fn push(&self) -> GitResult<()> {
        Repository::push(self)
    }
}
