//! Interrupt token: cooperative interruption of a dispatched call.
//!
//! A completion handle created by the dispatcher is bound to one of these, so
//! `handle.cancel(true)` reaches the task body and the executor.

use tokio::sync::watch;

use outcall_handle::Interrupt;

/// Clone-friendly interruption flag shared by a task, its executor and its handle.
#[derive(Clone)]
pub struct InterruptToken {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl InterruptToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Fire the token. Idempotent.
    pub fn interrupt(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_interrupted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the token has fired. Returns immediately if it already has.
    pub async fn interrupted(&self) {
        let mut rx = self.rx.clone();
        // Both ends live in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for InterruptToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt for InterruptToken {
    fn interrupt(&self) {
        InterruptToken::interrupt(self);
    }
}

impl std::fmt::Debug for InterruptToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptToken")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}
