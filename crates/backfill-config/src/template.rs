//! Starter configuration file.

use std::path::Path;

use tracing::info;

use crate::{ConfigError, ConfigResult};

/// Commented `backfill.toml` written by `backfill init`.
pub const TEMPLATE: &str = r#"# backfill configuration.
#
# Every value can also be set through the environment variable named in the
# comment above it; the environment wins over this file.

[gitlab]
# BASE_URL
base_url = "https://gitlab.com"
# GITLAB_TOKEN (scope: read_api)
# token = ""
timeout_secs = 30

[author]
# COMMITER_NAME: matched against commit authors and used for mirrored commits
# name = ""
# COMMITER_EMAIL
# email = ""

[origin]
# ORIGIN_REPO_URL: repository receiving the mirrored commits
# repo_url = "https://github.com/<you>/<activity>.git"
# ORIGIN_TOKEN
# token = ""
# ORIGIN_BRANCH
branch = "main"

[clone]
# CLONE_PATH: defaults to <home>/<repository name>
# path = ""
"#;

/// Writes [`TEMPLATE`] to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] if the file exists and `force` is
/// false, or an IO error if it cannot be written.
pub fn write_template(path: impl AsRef<Path>, force: bool) -> ConfigResult<()> {
    let path = path.as_ref();
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    std::fs::write(path, TEMPLATE)?;
    info!(?path, "configuration template written");
    Ok(())
}
