//! Core error types.

use thiserror::Error;

/// Core-related errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// GitLab error.
    #[error("gitlab error: {0}")]
    GitLab(#[from] backfill_gitlab::GitLabError),

    /// Git error.
    #[error("git error: {0}")]
    Git(#[from] backfill_git::GitError),

    /// The user has no contributed projects.
    #[error("user {user_id} has no contributed projects")]
    EmptyContributions { user_id: u64 },

    /// The batch consumer stopped abnormally.
    #[error("commit consumer failed: {0}")]
    ConsumerPanicked(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
