//! Session events emitted to the presentation layer
//!
//! These events form the output port from the chat session to whatever
//! renders it. Each event is sent after the state change it describes is
//! complete, so a renderer never sees a half-applied commit.

use clinichat_domain::{DispatchId, DispatchState, Message, SessionError};

/// Events emitted by [`ChatSession`](crate::use_cases::chat_session::ChatSession)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A message was appended to the store
    MessageAppended(Message),
    /// The draft changed; `submittable` drives the send affordance
    DraftChanged { draft: String, submittable: bool },
    /// The responder was called for this dispatch
    DispatchStarted(DispatchId),
    /// The dispatch waits for an outstanding one to finish
    DispatchQueued(DispatchId),
    /// The dispatch reached a terminal state
    DispatchFinished { id: DispatchId, state: DispatchState },
    /// A submit was refused and the draft kept, e.g. `Busy` under the
    /// reject policy
    SubmitRefused(SessionError),
    /// The session was torn down; no further events follow
    Destroyed,
}

/// Consistent read of a session taken in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub messages: Vec<Message>,
    pub draft: String,
    pub submittable: bool,
    pub pending_dispatches: usize,
}
