//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of the conversation
    pub conversation_log: Option<String>,
    /// Directory for diagnostic log files; stderr when unset
    pub log_dir: Option<String>,
}
