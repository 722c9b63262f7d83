//! Echo responder: replies with the last user message.
//!
//! Stands in for a backend when none is configured, and is handy for
//! exercising the chat panel offline.

use async_trait::async_trait;
use clinichat_application::{RemoteResponder, ResponderError};
use clinichat_domain::{Author, Message};
use std::time::Duration;

/// Repeats the most recent user message back
#[derive(Debug, Clone, Default)]
pub struct EchoResponder {
    delay: Option<Duration>,
}

impl EchoResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = (!delay.is_zero()).then_some(delay);
        self
    }
}

#[async_trait]
impl RemoteResponder for EchoResponder {
    fn name(&self) -> &str {
        "echo"
    }

    async fn respond(&self, history: &[Message]) -> Result<String, ResponderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        history
            .iter()
            .rev()
            .find(|m| m.author == Author::User)
            .map(|m| format!("Echo: {}", m.text))
            .ok_or(ResponderError::EmptyResponse)
    }
}
