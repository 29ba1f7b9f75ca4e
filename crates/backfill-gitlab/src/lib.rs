//! GitLab access for backfill.
//!
//! This crate provides:
//! - [`GitLabClient`]: authenticated reads against the GitLab v4 API
//! - [`fetch_project_commits`]: paginated, deduplicated commit history of one project
//! - [`fetch_all`]: concurrent fan-in of every project's commits into a [`BatchSink`]

mod client;
mod error;
mod fetch;
mod orchestrator;

pub use client::{
    ClientSettings, DEFAULT_TIMEOUT, GitLabApi, GitLabClient, PRIVATE_TOKEN_HEADER, USER_AGENT,
};
pub use error::{GitLabError, GitLabResult};
pub use fetch::{PageLimits, PaginationStop, ProjectCommits, fetch_project_commits};
pub use orchestrator::{BatchSink, FetchReport, ProjectOutcome, SinkClosed, fetch_all};
