//! GitLab error types.

use backfill_commit::ProjectId;
use thiserror::Error;

/// Errors raised while talking to the GitLab API.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Connection or IO failure, including timeouts.
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} failed with status code {status}")]
    Status { url: String, status: u16 },

    /// The response body was not the expected JSON.
    #[error("invalid JSON in response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Pagination finished without a single commit by the author.
    #[error("found no commits in project {project}")]
    NoCommits { project: ProjectId },
}

/// Result type for GitLab operations.
pub type GitLabResult<T> = Result<T, GitLabError>;
