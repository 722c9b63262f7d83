//! Application-level configuration.
//!
//! - [`SessionConfig`]: greeting, overlap policy and responder timeout

pub mod session_config;

pub use session_config::{DEFAULT_FAILURE_TEXT, DEFAULT_GREETING, SessionConfig};
