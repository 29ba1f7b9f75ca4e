//! Configuration management for backfill.
//!
//! This crate loads `backfill.toml`, layers the environment on top of it and
//! validates the result into ready-to-use [`Settings`].

mod env;
mod error;
mod loader;
mod schema;
mod template;

pub use env::{ENV_OVERRIDES, EnvOverride, apply_env_overrides, load_dotenv};
pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_NAME, load_config, load_or_default};
pub use schema::{
    AuthorConfig, CloneConfig, Config, GitLabConfig, OriginConfig, Settings, default_clone_path,
};
pub use template::{TEMPLATE, write_template};
