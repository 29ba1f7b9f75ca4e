//! Authenticated user.

use serde::{Deserialize, Serialize};

/// The user behind the configured API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric user id.
    pub id: u64,

    /// Login name.
    #[serde(default)]
    pub username: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Primary email, only visible to the user themselves.
    #[serde(default)]
    pub email: Option<String>,

    /// Profile URL.
    #[serde(default)]
    pub web_url: Option<String>,
}
