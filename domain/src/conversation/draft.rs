//! Draft input and the submit gate

use serde::{Deserialize, Serialize};

/// Whether `text` may be submitted: the trimmed text must be non-empty.
///
/// Pure and cheap; meant to be evaluated on every input change.
pub fn is_submittable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Unsent input text owned by a session (Value Object)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_submittable(&self) -> bool {
        is_submittable(&self.text)
    }

    /// Clear the draft and return what it held
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Text that passed the submit gate, already trimmed (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedText(String);

impl SubmittedText {
    /// Returns None if the text is blank
    pub fn try_new(text: &str) -> Option<Self> {
        if is_submittable(text) {
            Some(Self(text.trim().to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SubmittedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
