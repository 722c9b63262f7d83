//! Domain error types

use crate::conversation::message::{MessageId, MessageStatus};
use crate::conversation::store::StoreError;
use thiserror::Error;

/// Session-level errors
///
/// `Rejected` and `Busy` are ordinary outcomes of a submit attempt; only
/// `Busy` is worth telling the user about. `NotFound` and
/// `InvalidTransition` point at a defect in the caller. Responder failures
/// and cancellations are not errors here: they end up as a failed message
/// or a cancelled dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Draft is empty; nothing to send")]
    Rejected,

    #[error("A reply is still pending")]
    Busy,

    #[error("Message {0} not found")]
    NotFound(MessageId),

    #[error("Message {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: MessageId,
        from: MessageStatus,
        to: MessageStatus,
    },

}

impl SessionError {
    /// Outcomes that are handled locally and never shown to the user
    pub fn is_silent(&self) -> bool {
        matches!(self, SessionError::Rejected)
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => SessionError::NotFound(id),
            StoreError::InvalidTransition { id, from, to } => {
                SessionError::InvalidTransition { id, from, to }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_display() {
        assert_eq!(SessionError::Busy.to_string(), "A reply is still pending");
    }

    #[test]
    fn test_silent_outcomes() {
        assert!(SessionError::Rejected.is_silent());
        assert!(!SessionError::Busy.is_silent());
        assert!(!SessionError::NotFound(MessageId::new(3)).is_silent());
    }

    #[test]
    fn test_store_error_conversion() {
        let id = MessageId::new(9);
        let err: SessionError = StoreError::NotFound(id).into();
        assert_eq!(err, SessionError::NotFound(id));
        assert_eq!(err.to_string(), "Message #9 not found");
    }
}
