//! Responder configuration from TOML (`[responder]` section)

use super::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which remote responder backs the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponderKind {
    /// Offline: repeats the last user message
    #[default]
    Echo,
    /// Google Gemini `generateContent` API
    Gemini,
}

impl fmt::Display for ResponderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponderKind::Echo => write!(f, "echo"),
            ResponderKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for ResponderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "echo" => Ok(ResponderKind::Echo),
            "gemini" | "google" => Ok(ResponderKind::Gemini),
            _ => Err(format!("Invalid responder kind: {}", s)),
        }
    }
}

/// Raw responder configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResponderConfig {
    /// "echo" or "gemini"
    pub kind: String,
    /// Model name sent to the backend
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Base URL override for the backend
    pub endpoint: Option<String>,
    /// Instruction sent with every request
    pub system_instruction: Option<String>,
    /// Artificial delay for the echo responder, in milliseconds
    pub echo_delay_ms: u64,
}

impl Default for FileResponderConfig {
    fn default() -> Self {
        Self {
            kind: ResponderKind::default().to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "LLM_API_KEY".to_string(),
            endpoint: None,
            system_instruction: None,
            echo_delay_ms: 0,
        }
    }
}

impl FileResponderConfig {
    /// Parse the responder kind, falling back to echo on error
    pub fn parse_kind(&self) -> (ResponderKind, Vec<ConfigIssue>) {
        match self.kind.parse::<ResponderKind>() {
            Ok(kind) => (kind, Vec::new()),
            Err(_) => (
                ResponderKind::default(),
                vec![ConfigIssue::invalid_value(
                    Severity::Warning,
                    "responder.kind",
                    &self.kind,
                    &["echo", "gemini"],
                )],
            ),
        }
    }

    /// Checks that only matter for network-backed responders
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (kind, mut issues) = self.parse_kind();
        if kind == ResponderKind::Gemini {
            if self.model.trim().is_empty() {
                issues.push(ConfigIssue::new(
                    Severity::Error,
                    "responder.model",
                    "responder.model must not be empty for the gemini responder",
                ));
            }
            if self.api_key_env.trim().is_empty() {
                issues.push(ConfigIssue::new(
                    Severity::Error,
                    "responder.api_key_env",
                    "responder.api_key_env must name the variable holding the API key",
                ));
            }
        }
        issues
    }
}
