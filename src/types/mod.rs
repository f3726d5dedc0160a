//! Core types shared across the crate.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Environment and config-file driven configuration

mod config;
mod errors;

pub use config::{
    env_snapshot, with_config_file, AuthConfig, AuthMode, Config, HttpConfig,
    ObservabilityConfig, CONFIG_FILE_VAR, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE,
    DEFAULT_REALM_HEADER,
};
pub(crate) use config::non_blank;
pub use errors::{Error, Result};
