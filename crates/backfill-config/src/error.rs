//! Configuration error types.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(std::path::PathBuf),

    /// Configuration file already exists and overwriting was not requested.
    #[error("configuration file already exists: {0}")]
    AlreadyExists(std::path::PathBuf),

    /// Invalid TOML syntax.
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Required values missing from both the file and the environment.
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The development `.env` file could not be loaded.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
