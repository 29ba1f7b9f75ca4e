//! Configuration loader.

use std::path::Path;

use tracing::debug;

use crate::{Config, ConfigError, ConfigResult};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "backfill.toml";

/// Loads configuration from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    Ok(config)
}

/// Loads configuration from the given path, or defaults if it is missing.
///
/// A run configured entirely through the environment has no file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Config> {
    match load_config(path) {
        Err(ConfigError::NotFound(path)) => {
            debug!(?path, "no configuration file, using defaults");
            Ok(Config::default())
        }
        other => other,
    }
}
