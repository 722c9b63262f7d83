//! Chat configuration from TOML (`[chat]` section)

use super::{ConfigIssue, Severity};
use clinichat_domain::DispatchPolicy;
use serde::{Deserialize, Serialize};

/// Raw chat session configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Seed the session with a greeting
    pub show_greeting: bool,
    /// Greeting text; the built-in greeting when unset
    pub greeting: Option<String>,
    /// "reject", "queue" or "concurrent"
    pub dispatch_policy: String,
    /// Seconds to wait for a reply; 0 disables the limit
    pub responder_timeout_secs: u64,
    /// Prefix of failed-reply messages
    pub failure_text: Option<String>,
    /// Panic on caller defects in debug builds
    pub assert_on_defect: bool,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            show_greeting: true,
            greeting: None,
            dispatch_policy: DispatchPolicy::default().to_string(),
            responder_timeout_secs: 60,
            failure_text: None,
            assert_on_defect: false,
        }
    }
}

impl FileChatConfig {
    /// Parse the dispatch policy, falling back to the default on error
    pub fn parse_dispatch_policy(&self) -> (DispatchPolicy, Vec<ConfigIssue>) {
        match self.dispatch_policy.parse::<DispatchPolicy>() {
            Ok(policy) => (policy, Vec::new()),
            Err(_) => (
                DispatchPolicy::default(),
                vec![ConfigIssue::invalid_value(
                    Severity::Warning,
                    "chat.dispatch_policy",
                    &self.dispatch_policy,
                    &["reject", "queue", "concurrent"],
                )],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatch_policy() {
        let config = FileChatConfig {
            dispatch_policy: "Concurrent".to_string(),
            ..Default::default()
        };
        let (policy, issues) = config.parse_dispatch_policy();
        assert_eq!(policy, DispatchPolicy::Concurrent);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unknown_dispatch_policy_falls_back() {
        let config = FileChatConfig {
            dispatch_policy: "whenever".to_string(),
            ..Default::default()
        };
        let (policy, issues) = config.parse_dispatch_policy();
        assert_eq!(policy, DispatchPolicy::Queue);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "chat.dispatch_policy");
    }
}
