//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enum-like fields are kept as strings and parsed with `parse_*` helpers
//! that report problems as [`ConfigIssue`]s instead of failing the load.

mod chat;
mod logging;
mod responder;

pub use chat::FileChatConfig;
pub use logging::FileLoggingConfig;
pub use responder::{FileResponderConfig, ResponderKind};

use clinichat_application::{DEFAULT_GREETING, SessionConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead.
    Warning,
}

/// A detected issue in the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(severity: Severity, field: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(
        severity: Severity,
        field: &str,
        value: &str,
        valid_values: &[&str],
    ) -> Self {
        Self::new(
            severity,
            field,
            format!(
                "{}: unknown value '{}', expected one of: {}",
                field,
                value,
                valid_values.join(", ")
            ),
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat session settings
    pub chat: FileChatConfig,
    /// Remote responder settings
    pub responder: FileResponderConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.chat.parse_dispatch_policy().1);
        issues.extend(self.responder.validate());

        if self
            .chat
            .greeting
            .as_deref()
            .is_some_and(|g| g.trim().is_empty())
        {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "chat.greeting",
                "chat.greeting is blank; no greeting will be shown",
            ));
        }

        issues
    }

    /// Build the application-level session configuration
    pub fn to_session_config(&self) -> SessionConfig {
        let (policy, _) = self.chat.parse_dispatch_policy();
        let timeout = match self.chat.responder_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let mut config = SessionConfig::default()
            .with_dispatch_policy(policy)
            .with_responder_timeout(timeout)
            .with_assert_on_defect(self.chat.assert_on_defect);

        config = if self.chat.show_greeting {
            config.with_greeting(self.chat.greeting.as_deref().unwrap_or(DEFAULT_GREETING))
        } else {
            config.without_greeting()
        };

        if let Some(text) = &self.chat.failure_text {
            config = config.with_failure_text(text.clone());
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinichat_domain::DispatchPolicy;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[chat]
show_greeting = true
greeting = "Hello, doctor."
dispatch_policy = "concurrent"
responder_timeout_secs = 15
assert_on_defect = true

[responder]
kind = "gemini"
model = "gemini-2.0-flash"
api_key_env = "MY_KEY"

[logging]
conversation_log = "/tmp/chat.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.greeting.as_deref(), Some("Hello, doctor."));
        assert_eq!(config.responder.parse_kind().0, ResponderKind::Gemini);
        assert_eq!(config.responder.api_key_env, "MY_KEY");
        assert_eq!(
            config.logging.conversation_log.as_deref(),
            Some("/tmp/chat.jsonl")
        );
        assert!(config.validate().is_empty());

        let session = config.to_session_config();
        assert_eq!(session.greeting.as_deref(), Some("Hello, doctor."));
        assert_eq!(session.dispatch_policy, DispatchPolicy::Concurrent);
        assert_eq!(session.responder_timeout, Some(Duration::from_secs(15)));
        assert!(session.assert_on_defect);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[chat]
dispatch_policy = "reject"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.parse_dispatch_policy().0, DispatchPolicy::Reject);
        // Defaults should apply
        assert!(config.chat.show_greeting);
        assert_eq!(config.responder.parse_kind().0, ResponderKind::Echo);
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        let session = config.to_session_config();
        assert_eq!(session.greeting.as_deref(), Some(DEFAULT_GREETING));
        assert_eq!(session.dispatch_policy, DispatchPolicy::Queue);
        assert_eq!(session.responder_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let mut config = FileConfig::default();
        config.chat.responder_timeout_secs = 0;
        config.chat.show_greeting = false;

        let session = config.to_session_config();
        assert!(session.responder_timeout.is_none());
        assert!(session.greeting.is_none());
    }

    #[test]
    fn test_validate_reports_bad_values() {
        let mut config = FileConfig::default();
        config.chat.dispatch_policy = "sometimes".to_string();
        config.chat.greeting = Some("  ".to_string());
        config.responder.kind = "carrier-pigeon".to_string();

        let issues = config.validate();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"chat.dispatch_policy"));
        assert!(fields.contains(&"chat.greeting"));
        assert!(fields.contains(&"responder.kind"));
        assert!(!issues.iter().any(|i| i.is_error()));
    }
}
