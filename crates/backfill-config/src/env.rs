//! Environment overrides.

use std::path::PathBuf;

use tracing::debug;

use crate::{Config, ConfigResult};

/// An environment variable that overrides one configuration key.
#[derive(Clone, Copy)]
pub struct EnvOverride {
    /// Variable name.
    pub var: &'static str,
    /// Dotted configuration key the variable sets.
    pub key: &'static str,
    apply: fn(&mut Config, String),
}

/// Environment variables that override file values.
pub const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: "BASE_URL",
        key: "gitlab.base_url",
        apply: |c, v| c.gitlab.base_url = Some(v),
    },
    EnvOverride {
        var: "GITLAB_TOKEN",
        key: "gitlab.token",
        apply: |c, v| c.gitlab.token = Some(v),
    },
    EnvOverride {
        var: "COMMITER_NAME",
        key: "author.name",
        apply: |c, v| c.author.name = Some(v),
    },
    EnvOverride {
        var: "COMMITER_EMAIL",
        key: "author.email",
        apply: |c, v| c.author.email = Some(v),
    },
    EnvOverride {
        var: "ORIGIN_REPO_URL",
        key: "origin.repo_url",
        apply: |c, v| c.origin.repo_url = Some(v),
    },
    EnvOverride {
        var: "ORIGIN_TOKEN",
        key: "origin.token",
        apply: |c, v| c.origin.token = Some(v),
    },
    EnvOverride {
        var: "ORIGIN_BRANCH",
        key: "origin.branch",
        apply: |c, v| c.origin.branch = v,
    },
    EnvOverride {
        var: "CLONE_PATH",
        key: "clone.path",
        apply: |c, v| c.clone.path = Some(PathBuf::from(v)),
    },
];

/// Overrides `config` with every variable `lookup` returns a non-empty
/// value for.
///
/// `lookup` is usually `|name| std::env::var(name).ok()`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    for &EnvOverride { var, key, apply } in ENV_OVERRIDES {
        let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        debug!(var, key, "configuration overridden from environment");
        apply(config, value);
    }
}

/// Loads `.env` from the current directory when `ENV=DEVELOPMENT`.
///
/// Returns the path of the loaded file. Variables already set in the
/// environment are kept.
///
/// # Errors
///
/// Returns an error if development mode is on and `.env` cannot be loaded.
pub fn load_dotenv() -> ConfigResult<Option<PathBuf>> {
    if std::env::var("ENV").as_deref() != Ok("DEVELOPMENT") {
        return Ok(None);
    }

    Ok(Some(dotenvy::dotenv()?))
}
