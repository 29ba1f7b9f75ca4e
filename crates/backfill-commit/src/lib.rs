//! Data types shared across backfill.
//!
//! This crate provides the values that travel through the import pipeline:
//! - [`User`]: the identity behind the configured API token
//! - [`ProjectId`] / [`Project`]: projects the user contributed to
//! - [`Commit`]: a commit as returned by the GitLab commits API
//! - [`CommitBatch`]: every commit fetched for one project

mod batch;
mod commit;
mod project;
mod user;

pub use batch::CommitBatch;
pub use commit::Commit;
pub use project::{Project, ProjectId};
pub use user::User;
