//! Application layer for clinichat
//!
//! This crate contains the chat session use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_GREETING, SessionConfig};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    responder::{RemoteResponder, ResponderError},
    session_event::{SessionEvent, SessionView},
};
pub use use_cases::chat_session::{ChatSession, Resolution, SessionCommand};
