//! Core domain concepts shared across the conversation domain.
//!
//! - [`error::SessionError`]: session-level errors

pub mod error;
