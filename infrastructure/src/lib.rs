//! Infrastructure layer for clinichat
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: remote responders, the JSONL conversation logger,
//! and configuration file loading.

pub mod config;
pub mod logging;
pub mod responders;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileChatConfig, FileConfig, FileLoggingConfig,
    FileResponderConfig, ResponderKind, Severity,
};
pub use logging::JsonlConversationLogger;
pub use responders::{EchoResponder, build_responder};
#[cfg(feature = "gemini")]
pub use responders::GeminiResponder;
