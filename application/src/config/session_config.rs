//! Session configuration: how a chat session behaves.

use clinichat_domain::DispatchPolicy;
use std::time::Duration;

/// Greeting shown when the chat panel opens.
pub const DEFAULT_GREETING: &str = "Hi! 👋 How can I assist you today?\n\nFor example:\n- Provide a patient report to summarize.\n- Upload an X-ray image to interpret.";

/// Prefix of the text shown in place of a reply that could not be produced.
pub const DEFAULT_FAILURE_TEXT: &str = "⚠ The assistant could not respond";

/// Behaviour of a [`ChatSession`](crate::use_cases::chat_session::ChatSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Assistant message seeded at creation, if any.
    pub greeting: Option<String>,
    /// What happens to a submit while a reply is pending.
    pub dispatch_policy: DispatchPolicy,
    /// Upper bound on a single responder call. `None` waits indefinitely.
    pub responder_timeout: Option<Duration>,
    /// Prefix of failed-reply messages; the failure reason is appended.
    pub failure_text: String,
    /// Panic on caller defects (unknown message id, illegal status
    /// transition) in debug builds instead of only logging them.
    pub assert_on_defect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: Some(DEFAULT_GREETING.to_string()),
            dispatch_policy: DispatchPolicy::default(),
            responder_timeout: Some(Duration::from_secs(60)),
            failure_text: DEFAULT_FAILURE_TEXT.to_string(),
            assert_on_defect: false,
        }
    }
}

impl SessionConfig {
    // ==================== Builder Methods ====================

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn without_greeting(mut self) -> Self {
        self.greeting = None;
        self
    }

    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    pub fn with_responder_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.responder_timeout = timeout;
        self
    }

    pub fn with_assert_on_defect(mut self, enabled: bool) -> Self {
        self.assert_on_defect = enabled;
        self
    }

    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = text.into();
        self
    }

    /// Text of the failed assistant message for `reason`
    pub fn failure_message(&self, reason: &str) -> String {
        format!("{}: {}", self.failure_text, reason)
    }
}
