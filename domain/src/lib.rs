//! Domain layer for clinichat
//!
//! This crate contains the conversation entities, the message store and the
//! submit gate. It has no dependencies on infrastructure or presentation
//! concerns, and nothing in it suspends.
//!
//! # Core Concepts
//!
//! - **Message**: one turn, identified by a store-assigned [`MessageId`] and
//!   authored by a first-class [`Author`]
//! - **Message Store**: the ordered, append-only log of a session
//! - **Draft**: unsent input; only submittable (non-blank) drafts are committed
//! - **Dispatch**: one request/response cycle with the remote responder

pub mod conversation;
pub mod core;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    dispatch::{DispatchId, DispatchPolicy, DispatchState},
    draft::{Draft, SubmittedText, is_submittable},
    message::{Author, Message, MessageId, MessageStatus, NewMessage},
    store::{MessageStore, StoreError},
};
pub use core::error::SessionError;
