//! The completion handle shared by a dispatcher (writer) and its caller (reader).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;
use uuid::Uuid;

use crate::error::HandleError;
use crate::state_machine::{HandleStatus, is_terminal, validate_transition};

/// Identity of a handle. Clones of a handle share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Generate a new id using UUID v7 (temporal ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal state of a handle, including its value or failure.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Completed(T),
    Failed(HandleError),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn status(&self) -> HandleStatus {
        match self {
            Outcome::Completed(_) => HandleStatus::Completed,
            Outcome::Failed(_) => HandleStatus::Failed,
            Outcome::Cancelled => HandleStatus::Cancelled,
        }
    }

    /// Cancellation maps to `HandleError::Cancelled`.
    pub fn into_result(self) -> Result<T, HandleError> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Failed(err) => Err(err),
            Outcome::Cancelled => Err(HandleError::Cancelled),
        }
    }
}

/// Whatever runs the work behind a handle, seen from the handle's side.
///
/// `cancel(true)` on a bound handle calls [`Interrupt::interrupt`] so the
/// executing side can stop the call. Interruption is cooperative.
pub trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

type Continuation<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

struct Slot<T> {
    outcome: Option<Outcome<T>>,
    continuations: Vec<Continuation<T>>,
}

struct Shared<T> {
    id: HandleId,
    slot: Mutex<Slot<T>>,
    /// Mirrors the slot status; only used to wake waiters.
    status_tx: watch::Sender<HandleStatus>,
    interrupt: Option<Arc<dyn Interrupt>>,
}

/// A future-like handle for the eventual result of an asynchronous call.
///
/// Transitions are monotonic: the first of `complete`, `fail` or `cancel`
/// wins, every later attempt is a no-op returning `false`.
pub struct CompletionHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for CompletionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> CompletionHandle<T>
where
    T: Clone + Send + 'static,
{
    /// Create a new pending handle that is not bound to any executor.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a new pending handle whose `cancel(true)` interrupts `interrupt`.
    pub fn bound_to(interrupt: Arc<dyn Interrupt>) -> Self {
        Self::build(Some(interrupt))
    }

    /// Create a handle that is already completed with `value`.
    pub fn completed(value: T) -> Self {
        let handle = Self::new();
        handle.complete(value);
        handle
    }

    /// Create a handle that has already failed with `err`.
    pub fn failed(err: HandleError) -> Self {
        let handle = Self::new();
        handle.fail(err);
        handle
    }

    fn build(interrupt: Option<Arc<dyn Interrupt>>) -> Self {
        let (status_tx, _) = watch::channel(HandleStatus::Pending);
        Self {
            shared: Arc::new(Shared {
                id: HandleId::new(),
                slot: Mutex::new(Slot {
                    outcome: None,
                    continuations: Vec::new(),
                }),
                status_tx,
                interrupt,
            }),
        }
    }

    pub fn id(&self) -> HandleId {
        self.shared.id
    }

    /// `true` if both values refer to the same handle (not merely equal outcomes).
    pub fn same_handle(&self, other: &CompletionHandle<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn status(&self) -> HandleStatus {
        *self.shared.status_tx.borrow()
    }

    /// Returns `true` once the handle has reached any terminal state.
    pub fn is_done(&self) -> bool {
        is_terminal(self.status())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status() == HandleStatus::Cancelled
    }

    /// Complete with `value`. Returns `false` if the handle was already terminal.
    pub fn complete(&self, value: T) -> bool {
        self.transition(Outcome::Completed(value))
    }

    /// Fail with `err`. Returns `false` if the handle was already terminal.
    pub fn fail(&self, err: HandleError) -> bool {
        self.transition(Outcome::Failed(err))
    }

    /// Cancel the handle.
    ///
    /// With `may_interrupt`, a bound handle also interrupts the work behind it.
    /// Interruption only happens when this call performed the transition.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        let cancelled = self.transition(Outcome::Cancelled);
        if cancelled && may_interrupt {
            if let Some(interrupt) = &self.shared.interrupt {
                interrupt.interrupt();
            }
        }
        cancelled
    }

    /// The terminal outcome, or `None` while pending.
    pub fn try_outcome(&self) -> Option<Outcome<T>> {
        self.shared.slot.lock().outcome.clone()
    }

    /// Register a continuation that runs exactly once with the terminal outcome.
    ///
    /// Runs on the thread that completes the handle, or immediately on the
    /// calling thread if the handle is already terminal.
    pub fn on_complete<F>(&self, continuation: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let ready = {
            let mut slot = self.shared.slot.lock();
            match &slot.outcome {
                Some(outcome) => Some(outcome.clone()),
                None => {
                    slot.continuations.push(Box::new(continuation));
                    return;
                }
            }
        };
        if let Some(outcome) = ready {
            continuation(&outcome);
        }
    }

    /// Wait for the terminal outcome.
    pub async fn wait(&self) -> Result<T, HandleError> {
        let mut rx = self.shared.status_tx.subscribe();
        // The sender lives in `shared`, which `self` keeps alive.
        let closed = rx.wait_for(|status| is_terminal(*status)).await.is_err();
        if closed {
            return Err(HandleError::Failed("completion channel closed".to_string()));
        }
        match self.try_outcome() {
            Some(outcome) => outcome.into_result(),
            None => Err(HandleError::Failed(
                "handle reported terminal status without an outcome".to_string(),
            )),
        }
    }

    /// Wait for the terminal outcome for at most `timeout`.
    ///
    /// Timing out leaves the handle untouched.
    pub async fn wait_timeout(&self, timeout: Duration) -> Result<T, HandleError> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(HandleError::Timeout(timeout)),
        }
    }

    /// Block the current thread until the handle is terminal.
    ///
    /// For synchronous callers only; do not call from inside an async task.
    pub fn wait_blocking(&self) -> Result<T, HandleError> {
        futures::executor::block_on(self.wait())
    }

    fn transition(&self, outcome: Outcome<T>) -> bool {
        let requested = outcome.status();
        let (continuations, outcome) = {
            let mut slot = self.shared.slot.lock();
            let current = slot
                .outcome
                .as_ref()
                .map_or(HandleStatus::Pending, Outcome::status);
            if let Err(err) = validate_transition(current, requested) {
                trace!(handle = %self.shared.id, %requested, error = %err, "Ignoring transition");
                return false;
            }
            slot.outcome = Some(outcome.clone());
            self.shared.status_tx.send_replace(requested);
            (std::mem::take(&mut slot.continuations), outcome)
        };
        for continuation in continuations {
            continuation(&outcome);
        }
        true
    }
}

impl<T> Default for CompletionHandle<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CompletionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("id", &self.shared.id)
            .field("status", &*self.shared.status_tx.borrow())
            .field("bound", &self.shared.interrupt.is_some())
            .finish()
    }
}
