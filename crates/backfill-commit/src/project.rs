//! Project identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric GitLab project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ProjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A project the user contributed to.
///
/// Only the id is required; the remaining fields are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Namespaced path (e.g. `group/project`).
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}
