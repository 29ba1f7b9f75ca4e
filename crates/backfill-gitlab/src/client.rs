//! Authenticated GitLab v4 client.

use std::time::Duration;

use async_trait::async_trait;
use backfill_commit::{Commit, Project, ProjectId, User};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{GitLabError, GitLabResult};

/// Header carrying the personal access token.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("backfill/", env!("CARGO_PKG_VERSION"));

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The reads the importer needs from GitLab.
///
/// [`GitLabClient`] is the production implementation; the fetch logic only
/// depends on this trait.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Returns the user owning the token.
    async fn current_user(&self) -> GitLabResult<User>;

    /// Returns the projects the given user contributed to.
    async fn contributed_projects(&self, user_id: u64) -> GitLabResult<Vec<Project>>;

    /// Returns one page of commits of `project` authored by `author`.
    ///
    /// Pages are 1-based. An empty vector means there are no more pages.
    async fn commits_page(
        &self,
        project: ProjectId,
        author: &str,
        page: u32,
        per_page: u32,
    ) -> GitLabResult<Vec<Commit>>;
}

/// Connection settings for [`GitLabClient`].
#[derive(Clone)]
pub struct ClientSettings {
    /// Instance root, e.g. `https://gitlab.com`.
    pub base_url: String,
    /// Personal access token.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientSettings {
    /// Creates settings with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// GitLab API client.
#[derive(Clone)]
pub struct GitLabClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitLabClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: ClientSettings) -> GitLabResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(GitLabError::Client)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token,
        })
    }

    /// Returns the instance root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4/{path}", self.base_url)
    }

    /// Sends an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> GitLabResult<T> {
        let mut request = self
            .client
            .get(url)
            .header(PRIVATE_TOKEN_HEADER, &self.token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|source| GitLabError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitLabError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| GitLabError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| GitLabError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn current_user(&self) -> GitLabResult<User> {
        let url = self.api_url("user");
        debug!(%url, "fetching current user");
        self.get_json(&url, &[]).await
    }

    async fn contributed_projects(&self, user_id: u64) -> GitLabResult<Vec<Project>> {
        let url = self.api_url(&format!("users/{user_id}/contributed_projects"));
        debug!(%url, "fetching contributed projects");
        self.get_json(&url, &[]).await
    }

    async fn commits_page(
        &self,
        project: ProjectId,
        author: &str,
        page: u32,
        per_page: u32,
    ) -> GitLabResult<Vec<Commit>> {
        let url = self.api_url(&format!("projects/{project}/repository/commits"));
        debug!(%project, page, "fetching commit page");
        self.get_json(
            &url,
            &[
                ("author", author.to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }
}
