//! Core library for backfill.
//!
//! This crate wires the GitLab fetcher to the local mirror: it resolves the
//! user, fans out one fetch per contributed project and records every batch
//! through a single [`CommitStore`] consumer.

mod error;
mod importer;
mod store;

pub use error::{CoreError, CoreResult};
pub use importer::{Importer, RunOptions, RunSummary};
pub use store::CommitStore;
