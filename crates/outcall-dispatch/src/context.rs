//! Per-call context handed to the invoked method.
//!
//! Holds the "current result handle" for one dispatched call. The method may
//! complete it, fail it, or swap in a handle it manages itself. The dispatcher
//! releases the context when the task body ends, after which it is inert.

use std::sync::Arc;

use parking_lot::Mutex;

use outcall_handle::{CompletionHandle, HandleError};

use crate::error::ContextReleased;
use crate::invocation::MethodId;

struct Slot<T> {
    current: Option<CompletionHandle<T>>,
    released: bool,
}

/// The current-handle slot of one dispatched call.
pub struct AsyncContext<T> {
    method: Arc<MethodId>,
    slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for AsyncContext<T> {
    fn clone(&self) -> Self {
        Self {
            method: Arc::clone(&self.method),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> AsyncContext<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn bind(method: MethodId, handle: CompletionHandle<T>) -> Self {
        Self {
            method: Arc::new(method),
            slot: Arc::new(Mutex::new(Slot {
                current: Some(handle),
                released: false,
            })),
        }
    }

    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// The current handle, or `None` once the context has been released.
    pub fn handle(&self) -> Option<CompletionHandle<T>> {
        self.slot.lock().current.clone()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.lock().current.is_some()
    }

    /// Replace the current handle. Returns the previous one.
    pub fn set_handle(
        &self,
        handle: CompletionHandle<T>,
    ) -> Result<Option<CompletionHandle<T>>, ContextReleased> {
        let mut slot = self.slot.lock();
        if slot.released {
            return Err(self.released());
        }
        Ok(slot.current.replace(handle))
    }

    /// Complete the current handle with `value` and return it.
    ///
    /// A handle that is already terminal keeps its outcome.
    pub fn complete(&self, value: T) -> Result<CompletionHandle<T>, ContextReleased> {
        let handle = self.handle().ok_or_else(|| self.released())?;
        handle.complete(value);
        Ok(handle)
    }

    /// Fail the current handle with `err` and return it.
    pub fn fail(&self, err: HandleError) -> Result<CompletionHandle<T>, ContextReleased> {
        let handle = self.handle().ok_or_else(|| self.released())?;
        handle.fail(err);
        Ok(handle)
    }

    pub(crate) fn release(&self) {
        let mut slot = self.slot.lock();
        slot.current = None;
        slot.released = true;
    }

    fn released(&self) -> ContextReleased {
        ContextReleased {
            method: self.method.to_string(),
        }
    }
}

impl<T> std::fmt::Debug for AsyncContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("AsyncContext")
            .field("method", &self.method)
            .field("current", &slot.current)
            .field("released", &slot.released)
            .finish()
    }
}
