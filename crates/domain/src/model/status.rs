//! Checkout session status.

use serde::{Deserialize, Serialize};

/// The lifecycle status of a checkout session.
///
/// State transitions:
/// ```text
/// Incomplete ──(update)*──► CompleteInProgress ──► Completed
///     │
///     └──────────────────────────────────────────► Canceled
/// ```
///
/// `ReadyForComplete` and `RequiresEscalation` are part of the protocol
/// vocabulary but are never entered by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Incomplete,
    ReadyForComplete,
    CompleteInProgress,
    Completed,
    RequiresEscalation,
    Canceled,
}

impl CheckoutStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStatus::Completed | CheckoutStatus::Canceled)
    }

    /// Returns true if the session may still be updated, completed or canceled.
    pub fn is_mutable(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns the status name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Incomplete => "incomplete",
            CheckoutStatus::ReadyForComplete => "ready_for_complete",
            CheckoutStatus::CompleteInProgress => "complete_in_progress",
            CheckoutStatus::Completed => "completed",
            CheckoutStatus::RequiresEscalation => "requires_escalation",
            CheckoutStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_incomplete() {
        assert_eq!(CheckoutStatus::default(), CheckoutStatus::Incomplete);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CheckoutStatus::Incomplete.is_terminal());
        assert!(!CheckoutStatus::ReadyForComplete.is_terminal());
        assert!(!CheckoutStatus::CompleteInProgress.is_terminal());
        assert!(!CheckoutStatus::RequiresEscalation.is_terminal());
        assert!(CheckoutStatus::Completed.is_terminal());
        assert!(CheckoutStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&CheckoutStatus::CompleteInProgress).unwrap();
        assert_eq!(json, "\"complete_in_progress\"");
        let parsed: CheckoutStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, CheckoutStatus::Canceled);
        assert_eq!(CheckoutStatus::ReadyForComplete.to_string(), "ready_for_complete");
    }
}
