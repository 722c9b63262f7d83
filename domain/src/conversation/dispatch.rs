//! Dispatch identifiers, states and the overlap policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one request/response cycle with the remote responder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchId(u64);

impl DispatchId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch-{}", self.0)
    }
}

/// State of a single dispatch.
///
/// `Idle -> Pending -> {Resolved, Failed}`. `Cancelled` is reached only
/// through session teardown. A queued dispatch stays `Idle` until started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    #[default]
    Idle,
    Pending,
    Resolved,
    Failed,
    Cancelled,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::Resolved | DispatchState::Failed | DispatchState::Cancelled
        )
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchState::Idle => write!(f, "idle"),
            DispatchState::Pending => write!(f, "pending"),
            DispatchState::Resolved => write!(f, "resolved"),
            DispatchState::Failed => write!(f, "failed"),
            DispatchState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What a session does when the user submits while a dispatch is pending.
///
/// - **Reject**: the submit is refused with `Busy`; nothing is committed.
/// - **Queue** (default): the user message is committed immediately and its
///   dispatch waits until the outstanding one finishes.
/// - **Concurrent**: dispatches overlap; replies land in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    Reject,
    #[default]
    Queue,
    Concurrent,
}

impl DispatchPolicy {
    /// Get a short description for display
    pub fn description(&self) -> &'static str {
        match self {
            DispatchPolicy::Reject => "Reject: one reply at a time, extra sends refused",
            DispatchPolicy::Queue => "Queue: extra sends are committed and answered in turn",
            DispatchPolicy::Concurrent => "Concurrent: replies arrive as soon as they resolve",
        }
    }

    pub fn allows_overlap(&self) -> bool {
        matches!(self, DispatchPolicy::Concurrent)
    }
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPolicy::Reject => write!(f, "reject"),
            DispatchPolicy::Queue => write!(f, "queue"),
            DispatchPolicy::Concurrent => write!(f, "concurrent"),
        }
    }
}

impl std::str::FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" | "serial" => Ok(DispatchPolicy::Reject),
            "queue" | "queued" => Ok(DispatchPolicy::Queue),
            "concurrent" | "parallel" => Ok(DispatchPolicy::Concurrent),
            _ => Err(format!("Invalid DispatchPolicy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("reject".parse::<DispatchPolicy>().unwrap(), DispatchPolicy::Reject);
        assert_eq!("QUEUE".parse::<DispatchPolicy>().unwrap(), DispatchPolicy::Queue);
        assert_eq!(
            "parallel".parse::<DispatchPolicy>().unwrap(),
            DispatchPolicy::Concurrent
        );
        assert!("sometimes".parse::<DispatchPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [
            DispatchPolicy::Reject,
            DispatchPolicy::Queue,
            DispatchPolicy::Concurrent,
        ] {
            assert_eq!(policy.to_string().parse::<DispatchPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_default_policy_is_queue() {
        assert_eq!(DispatchPolicy::default(), DispatchPolicy::Queue);
        assert!(!DispatchPolicy::Queue.allows_overlap());
        assert!(DispatchPolicy::Concurrent.allows_overlap());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!DispatchState::Idle.is_terminal());
        assert!(!DispatchState::Pending.is_terminal());
        assert!(DispatchState::Resolved.is_terminal());
        assert!(DispatchState::Failed.is_terminal());
        assert!(DispatchState::Cancelled.is_terminal());
    }
}
