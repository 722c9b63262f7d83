//! Port for the machine-readable conversation transcript.
//!
//! `tracing` carries diagnostics; this port carries what was said and how
//! each dispatch ended, one [`ConversationEvent`] per record.

use clinichat_domain::{DispatchId, DispatchPolicy, MessageId};
use serde::Serialize;

/// One transcript record. Serialized with a `type` tag in `snake_case`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    SessionCreated {
        session: String,
        responder: String,
        policy: DispatchPolicy,
        /// Messages present at creation (the greeting)
        seeded: usize,
    },
    UserMessage {
        session: String,
        id: MessageId,
        text: String,
    },
    AssistantReply {
        session: String,
        dispatch: DispatchId,
        id: MessageId,
        responder: String,
        text: String,
    },
    AssistantFailure {
        session: String,
        dispatch: DispatchId,
        id: MessageId,
        error: String,
    },
    /// `dispatch` is `None` when a teardown cancelled `count` dispatches at once
    DispatchCancelled {
        session: String,
        dispatch: Option<DispatchId>,
        count: usize,
    },
    SessionDestroyed {
        session: String,
        messages: usize,
    },
}

impl ConversationEvent {
    /// The `type` tag this event serializes with
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionCreated { .. } => "session_created",
            Self::UserMessage { .. } => "user_message",
            Self::AssistantReply { .. } => "assistant_reply",
            Self::AssistantFailure { .. } => "assistant_failure",
            Self::DispatchCancelled { .. } => "dispatch_cancelled",
            Self::SessionDestroyed { .. } => "session_destroyed",
        }
    }
}

/// Sink for [`ConversationEvent`]s.
///
/// `log` is synchronous and infallible; a failing sink never reaches the
/// session.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
