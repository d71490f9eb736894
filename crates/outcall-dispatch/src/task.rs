//! The executor-facing unit of work.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::cancellation::InterruptToken;

/// A type-erased task body. Executors only ever see this, never the call's value type.
pub type TaskBody = BoxFuture<'static, ()>;

/// One dispatched call, ready to run on an executor.
pub struct Task {
    id: Uuid,
    label: String,
    interrupt: InterruptToken,
    body: TaskBody,
}

impl Task {
    pub fn new<F>(label: impl Into<String>, interrupt: InterruptToken, body: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: Uuid::now_v7(),
            label: label.into(),
            interrupt,
            body: Box::pin(body),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable identity of the call, used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// `true` if the task was interrupted. Executors should not start such tasks.
    pub fn is_cancelled(&self) -> bool {
        self.interrupt.is_interrupted()
    }

    pub fn interrupt_token(&self) -> &InterruptToken {
        &self.interrupt
    }

    /// Drive the body to completion.
    pub async fn run(self) {
        self.body.await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
