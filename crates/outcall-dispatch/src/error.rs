//! Error types raised before a completion handle reaches the caller.
//!
//! Anything that goes wrong after `dispatch` has returned a handle is delivered
//! through that handle as an [`outcall_handle::HandleError`], never through
//! these types.

use std::path::PathBuf;

/// Failure of the `dispatch`/`intercept` call itself. No handle exists.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Executor '{name}' not found as requested by asynchronous method {method}")]
    ExecutorNotFound { name: String, method: String },

    #[error("Binding '{name}' must be a managed executor, found {found}")]
    WrongBindingType { name: String, found: String },

    #[error("Lookup of executor '{name}' failed: {source}")]
    Directory {
        name: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Executor '{executor}' rejected asynchronous method {method}: {source}")]
    Rejected {
        executor: String,
        method: String,
        #[source]
        source: SubmitError,
    },
}

impl DispatchError {
    /// `true` for failures to turn an executor name into an executor.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            DispatchError::ExecutorNotFound { .. }
                | DispatchError::WrongBindingType { .. }
                | DispatchError::Directory { .. }
        )
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, DispatchError::Rejected { .. })
    }
}

/// An executor refused a task at submission time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Executor '{executor}' is saturated ({in_flight} tasks in flight)")]
    Saturated { executor: String, in_flight: usize },

    #[error("Executor '{0}' has been shut down")]
    Shutdown(String),

    #[error("Executor '{executor}' is unavailable: {reason}")]
    Unavailable { executor: String, reason: String },
}

/// Failure of the directory backend itself, as opposed to a missing name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("Invalid executor name: {0:?}")]
    InvalidName(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Default executor '{0}' is not declared in [[executors]]")]
    UnknownDefaultExecutor(String),
}

/// The call tried to use its context after the dispatcher released it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Asynchronous context of {method} has been released")]
pub struct ContextReleased {
    pub method: String,
}
