//! Append-only message log for a single session

use super::message::{Message, MessageId, MessageStatus, NewMessage};
use chrono::Utc;
use thiserror::Error;

/// Errors raised by [`MessageStore`] mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message {0} not found")]
    NotFound(MessageId),

    #[error("Message {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: MessageId,
        from: MessageStatus,
        to: MessageStatus,
    },
}

/// Ordered, append-only log of messages.
///
/// Insertion order is display order and causal order. There is no deletion
/// or reordering; the only in-place mutation is a pending message's status.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    last_id: Option<MessageId>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the end and return the assigned id.
    ///
    /// Text validity is the caller's concern; the store accepts whatever
    /// reaches it.
    pub fn append(&mut self, message: NewMessage) -> MessageId {
        let id = match self.last_id {
            Some(last) => last.next(),
            None => MessageId::new(1),
        };
        self.messages.push(Message {
            id,
            author: message.author,
            text: message.text,
            status: message.status,
            timestamp: Utc::now(),
        });
        self.last_id = Some(id);
        id
    }

    /// Transition the status of a single message.
    ///
    /// Only `Pending -> Committed` and `Pending -> Failed` are accepted.
    pub fn update_status(&mut self, id: MessageId, status: MessageStatus) -> Result<(), StoreError> {
        let index = self.index_of(id).ok_or(StoreError::NotFound(id))?;
        let message = &mut self.messages[index];
        if !message.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: message.status,
                to: status,
            });
        }
        message.status = status;
        Ok(())
    }

    /// Owned copy of the current sequence
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index_of(id).map(|i| &self.messages[i])
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    // ids are strictly increasing, so the log is sorted by id
    fn index_of(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }
}
