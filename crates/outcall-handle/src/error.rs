//! Error types carried by failed completion handles.

use std::sync::Arc;
use std::time::Duration;

use crate::state_machine::HandleStatus;

/// Boxed error returned by invoked calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared form of [`BoxError`], so a failure can be observed by every clone of a handle.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Error delivered through a handle, or returned by handle operations.
///
/// `Clone` because every reader of a failed handle receives the same failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HandleError {
    #[error("Invocation failed: {0}")]
    Invocation(SharedError),

    #[error("Substituted handle did not complete: {0}")]
    Propagation(Box<HandleError>),

    #[error("Handle was cancelled")]
    Cancelled,

    #[error("Timed out after {0:?} waiting for completion")]
    Timeout(Duration),

    #[error("Handle is in terminal state: {0:?}")]
    AlreadyTerminal(HandleStatus),

    #[error("Invalid state transition: {current:?} -> {requested:?}")]
    InvalidTransition {
        current: HandleStatus,
        requested: HandleStatus,
    },

    #[error("{0}")]
    Failed(String),
}

impl HandleError {
    /// Wrap an arbitrary error raised by an invoked call.
    pub fn invocation<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        HandleError::Invocation(Arc::from(err.into()))
    }

    /// Unwrap any number of `Propagation` layers.
    pub fn root_cause(&self) -> &HandleError {
        match self {
            HandleError::Propagation(inner) => inner.root_cause(),
            other => other,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HandleError::Cancelled)
    }
}

impl From<BoxError> for HandleError {
    fn from(err: BoxError) -> Self {
        HandleError::Invocation(Arc::from(err))
    }
}
