//! Managed executors: where dispatched calls run.
//!
//! The dispatcher only needs something that accepts a [`Task`] synchronously
//! and runs it later. Default: [`crate::tokio_executor::TokioExecutor`].

use std::sync::Arc;

use crate::error::SubmitError;
use crate::task::Task;

/// A service that runs submitted tasks asynchronously.
pub trait ManagedExecutor: Send + Sync {
    /// Name the executor is known by, used in logs and errors.
    fn name(&self) -> &str;

    /// Accept a task for asynchronous execution.
    ///
    /// Must not run the task on the calling thread and must not block.
    /// Rejection hands the task back to nobody: it is dropped unrun.
    fn submit(&self, task: Task) -> Result<(), SubmitError>;

    /// Stop accepting new tasks. Tasks already accepted still run.
    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;
}

/// Shared reference to a resolved executor.
pub type ExecutorRef = Arc<dyn ManagedExecutor>;

impl std::fmt::Debug for dyn ManagedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedExecutor")
            .field("name", &self.name())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
