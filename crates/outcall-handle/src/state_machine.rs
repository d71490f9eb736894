//! Completion handle state machine.
//!
//! ```text
//! Pending -> Completed | Failed | Cancelled
//! Completed/Failed/Cancelled -> ERROR (terminal, no further transitions)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::HandleError;

/// Value-free projection of a handle's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for HandleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandleStatus::Pending => "pending",
            HandleStatus::Completed => "completed",
            HandleStatus::Failed => "failed",
            HandleStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Validate a handle status transition.
///
/// Returns `Ok(())` if the transition is valid, or `Err(HandleError)` if not.
pub fn validate_transition(from: HandleStatus, to: HandleStatus) -> Result<(), HandleError> {
    match from {
        HandleStatus::Pending => match to {
            HandleStatus::Completed | HandleStatus::Failed | HandleStatus::Cancelled => Ok(()),
            HandleStatus::Pending => Err(HandleError::InvalidTransition {
                current: from,
                requested: to,
            }),
        },
        HandleStatus::Completed | HandleStatus::Failed | HandleStatus::Cancelled => {
            Err(HandleError::AlreadyTerminal(from))
        }
    }
}

/// Returns `true` if the status is a terminal state (no further transitions allowed).
pub fn is_terminal(status: HandleStatus) -> bool {
    matches!(
        status,
        HandleStatus::Completed | HandleStatus::Failed | HandleStatus::Cancelled
    )
}
