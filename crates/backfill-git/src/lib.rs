//! Local mirror repository for backfill.
//!
//! This crate provides the git side of an import:
//! - Opening an existing clone or cloning the destination remote
//! - Recording fetched commits as empty local commits
//! - Pushing the mirror branch back to the remote

mod error;
mod repository;

pub use error::{GitError, GitResult};
pub use repository::{Identity, RepoSettings, Repository};
