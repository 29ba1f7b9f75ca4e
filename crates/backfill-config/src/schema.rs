//! Configuration schema.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Main configuration structure.
///
/// Every value may be left out of the file and supplied by the environment
/// instead; [`Config::resolve`] checks that the combination is complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source GitLab instance.
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Identity used as author filter and commit signature.
    #[serde(default)]
    pub author: AuthorConfig,

    /// Destination remote.
    #[serde(default)]
    pub origin: OriginConfig,

    /// Local clone of the destination.
    #[serde(default)]
    pub clone: CloneConfig,
}

/// GitLab API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GitLabConfig {
    /// Instance root, e.g. `https://gitlab.com`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Personal access token.
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("token", &redacted(self.token.as_deref()))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Author configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorConfig {
    /// Name matched against commit authors and used for local commits.
    #[serde(default)]
    pub name: Option<String>,

    /// Email used for local commits.
    #[serde(default)]
    pub email: Option<String>,
}

/// Destination remote configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Clone URL of the destination repository.
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Token used for clone and push.
    #[serde(default)]
    pub token: Option<String>,

    /// Branch receiving imported commits.
    #[serde(default = "default_branch")]
    pub branch: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            repo_url: None,
            token: None,
            branch: default_branch(),
        }
    }
}

impl fmt::Debug for OriginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginConfig")
            .field("repo_url", &self.repo_url)
            .field("token", &redacted(self.token.as_deref()))
            .field("branch", &self.branch)
            .finish()
    }
}

fn default_branch() -> String {
    "main".to_string()
}

/// Local clone configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneConfig {
    /// Clone directory. Defaults to `<home>/<repository name>`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Complete, validated configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub gitlab_url: String,
    pub gitlab_token: String,
    pub timeout: Duration,
    pub author_name: String,
    pub author_email: String,
    pub origin_url: String,
    pub origin_token: String,
    pub branch: String,
    pub clone_path: PathBuf,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("gitlab_url", &self.gitlab_url)
            .field("gitlab_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("author_name", &self.author_name)
            .field("author_email", &self.author_email)
            .field("origin_url", &self.origin_url)
            .field("origin_token", &"<redacted>")
            .field("branch", &self.branch)
            .field("clone_path", &self.clone_path)
            .finish()
    }
}

impl Config {
    /// Checks that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFields`] naming all missing keys, or
    /// [`ConfigError::Invalid`] for a zero timeout or an empty branch.
    pub fn validate(&self) -> ConfigResult<()> {
        check_required(&[
            ("gitlab.base_url", self.gitlab.base_url.as_deref()),
            ("gitlab.token", self.gitlab.token.as_deref()),
            ("author.name", self.author.name.as_deref()),
            ("author.email", self.author.email.as_deref()),
            ("origin.repo_url", self.origin.repo_url.as_deref()),
            ("origin.token", self.origin.token.as_deref()),
        ])?;
        self.validate_values()
    }

    /// Checks only what talking to GitLab needs.
    ///
    /// # Errors
    ///
    /// See [`Config::validate`].
    pub fn validate_gitlab(&self) -> ConfigResult<()> {
        check_required(&[
            ("gitlab.base_url", self.gitlab.base_url.as_deref()),
            ("gitlab.token", self.gitlab.token.as_deref()),
        ])?;
        self.validate_values()
    }

    fn validate_values(&self) -> ConfigResult<()> {
        if self.gitlab.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gitlab.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.origin.branch.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "origin.branch must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates and turns the configuration into [`Settings`].
    ///
    /// # Errors
    ///
    /// See [`Config::validate`].
    pub fn resolve(self) -> ConfigResult<Settings> {
        self.validate()?;

        let Self {
            gitlab,
            author,
            origin,
            clone,
        } = self;
        let origin_url = origin.repo_url.unwrap_or_default();
        let clone_path = clone
            .path
            .unwrap_or_else(|| default_clone_path(&origin_url, dirs::home_dir().as_deref()));

        Ok(Settings {
            gitlab_url: gitlab.base_url.unwrap_or_default(),
            gitlab_token: gitlab.token.unwrap_or_default(),
            timeout: Duration::from_secs(gitlab.timeout_secs),
            author_name: author.name.unwrap_or_default(),
            author_email: author.email.unwrap_or_default(),
            origin_url,
            origin_token: origin.token.unwrap_or_default(),
            branch: origin.branch,
            clone_path,
        })
    }
}

fn redacted(secret: Option<&str>) -> Option<&'static str> {
    secret.map(|_| "<redacted>")
}

fn check_required(required: &[(&'static str, Option<&str>)]) -> ConfigResult<()> {
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(key, _)| *key)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingFields(missing))
    }
}

/// Returns `<home>/<repository name>` for `repo_url`.
///
/// The repository name is the last path segment without a `.git` suffix.
/// Without a home directory the clone lands in the current directory.
pub fn default_clone_path(repo_url: &str, home: Option<&Path>) -> PathBuf {
    let trimmed = repo_url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);
    let name = if name.is_empty() { "backfill-mirror" } else { name };

    home.map_or_else(|| PathBuf::from(name), |home| home.join(name))
}
