//! Remote responder port
//!
//! Defines the interface the dispatch pipeline uses to obtain assistant
//! replies. Adapters (HTTP backends, echo, test stubs) live outside the
//! application layer.

use async_trait::async_trait;
use clinichat_domain::Message;
use thiserror::Error;

/// Errors that can occur while asking the responder for a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Responder returned an empty reply")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Produces assistant replies for a conversation.
///
/// Each call receives the full ordered history, including the user message
/// that triggered it, and resolves exactly once. Cancellation is by drop:
/// the session aborts the task polling this future when it is torn down,
/// so implementations must not rely on running to completion.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Ask for the next assistant reply
    async fn respond(&self, history: &[Message]) -> Result<String, ResponderError>;
}
