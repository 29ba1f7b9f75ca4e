//! Git error types.

use thiserror::Error;

/// Git-related errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Path exists but is not a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(std::path::PathBuf),

    /// Cloning the remote failed.
    #[error("failed to clone {url}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    /// The remote refused the pushed reference.
    #[error("push rejected: {0}")]
    PushRejected(String),

    /// Git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;
