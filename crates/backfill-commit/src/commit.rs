//! Commit type as returned by the GitLab commits API.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A commit fetched from a remote project.
///
/// Field names follow the GitLab v4 payload so the type can be decoded
/// directly from a page of `repository/commits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit hash (SHA). Unique key of a commit.
    pub id: String,

    /// Abbreviated hash as reported by the server.
    #[serde(default)]
    pub short_id: String,

    /// First line of the message.
    #[serde(default)]
    pub title: String,

    /// The full commit message.
    #[serde(default)]
    pub message: String,

    /// The commit author name.
    #[serde(default)]
    pub author_name: String,

    /// The commit author email.
    #[serde(default)]
    pub author_email: String,

    /// When the change was authored, with the author's offset.
    pub authored_date: DateTime<FixedOffset>,

    /// The committer name.
    #[serde(default)]
    pub committer_name: String,

    /// The committer email.
    #[serde(default)]
    pub committer_email: String,

    /// When the commit was created. Falls back to `authored_date` when absent.
    #[serde(default)]
    pub committed_date: Option<DateTime<FixedOffset>>,

    /// Hashes of the parent commits.
    #[serde(default)]
    pub parent_ids: Vec<String>,

    /// Link to the commit in the GitLab UI.
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Commit {
    /// Creates a commit with the fields the importer relies on.
    ///
    /// Committer data mirrors the author; everything else is left empty.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        authored_date: DateTime<FixedOffset>,
    ) -> Self {
        let id = id.into();
        let message = message.into();
        let author_name = author_name.into();
        let author_email = author_email.into();

        Self {
            short_id: char_prefix(&id, 8).to_string(),
            title: message.lines().next().unwrap_or("").to_string(),
            committer_name: author_name.clone(),
            committer_email: author_email.clone(),
            id,
            message,
            author_name,
            author_email,
            authored_date,
            committed_date: None,
            parent_ids: Vec::new(),
            web_url: None,
        }
    }

    /// Returns the short hash (first 7 characters).
    #[must_use]
    pub fn short_hash(&self) -> &str {
        char_prefix(&self.id, 7)
    }
}

/// First `n` characters of `s`, or all of it when shorter.
fn char_prefix(s: &str, n: usize) -> &str {
    s.char_indices().nth(n).map_or(s, |(end, _)| &s[..end])
}
