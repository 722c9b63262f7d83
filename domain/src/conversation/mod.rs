//! Conversation domain.
//!
//! - [`message::Message`]: a single turn, with [`message::Author`] and [`message::MessageStatus`]
//! - [`store::MessageStore`]: the append-only log of one session
//! - [`draft::Draft`] / [`draft::is_submittable`]: unsent input and the submit gate
//! - [`dispatch::DispatchPolicy`]: how overlapping replies are handled

pub mod dispatch;
pub mod draft;
pub mod message;
pub mod store;
