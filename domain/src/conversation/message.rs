//! Message entity and its value objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence identifier of a message within one session.
///
/// Assigned by [`MessageStore`](super::store::MessageStore) on append;
/// strictly increasing in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Who wrote a message.
///
/// A first-class discriminator: authorship is never derived from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
    System,
}

impl Author {
    /// Display label for this author
    pub fn label(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Assistant => "Assistant",
            Author::System => "System",
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Author::User)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Assistant => write!(f, "assistant"),
            Author::System => write!(f, "system"),
        }
    }
}

/// Lifecycle status of a message.
///
/// The only legal in-place mutations are `Pending -> Committed`
/// and `Pending -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    #[default]
    Committed,
    Failed,
}

impl MessageStatus {
    /// Returns true once the status can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MessageStatus::Pending)
    }

    /// Whether a message in this status may move to `next`
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (MessageStatus::Pending, MessageStatus::Committed)
                | (MessageStatus::Pending, MessageStatus::Failed)
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Pending => write!(f, "pending"),
            MessageStatus::Committed => write!(f, "committed"),
            MessageStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single turn in the conversation (Entity)
///
/// Identity is the `id`; `timestamp` only breaks display ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Lines of the text as they should be rendered.
    ///
    /// The stored text is left untouched; embedded line breaks only
    /// affect presentation.
    pub fn display_lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn is_failed(&self) -> bool {
        self.status == MessageStatus::Failed
    }

    pub fn is_committed(&self) -> bool {
        self.status == MessageStatus::Committed
    }
}

/// A message that has not yet been given an id by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author: Author,
    pub text: String,
    pub status: MessageStatus,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
            status: MessageStatus::Committed,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            author: Author::Assistant,
            text: text.into(),
            status: MessageStatus::Committed,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            author: Author::System,
            text: text.into(),
            status: MessageStatus::Committed,
        }
    }

    /// Assistant turn whose backend call failed
    pub fn assistant_failure(text: impl Into<String>) -> Self {
        Self::assistant(text).with_status(MessageStatus::Failed)
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }
}
