//! Configuration file loading for clinichat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CLINICHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./clinichat.toml` or `./.clinichat.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/clinichat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileChatConfig, FileConfig, FileLoggingConfig, FileResponderConfig,
    ResponderKind, Severity,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
