//! Async Dispatcher: turns an intercepted call into a task plus a completion handle.
//!
//! `dispatch` creates the caller's handle, submits the task and returns the
//! handle without waiting. The task body then:
//!
//! 1. publishes the handle through an [`AsyncContext`],
//! 2. invokes the call, raced against the handle's interrupt token,
//! 3. fails the handle if the call returned an error,
//! 4. cancels the handle if the call returned a handle that is still pending,
//! 5. copies the outcome of a substituted handle into the caller's handle,
//! 6. releases the context.
//!
//! Every write targets a monotonic handle, so whichever write lands first
//! wins and the rest are no-ops.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{Instrument, debug, debug_span, error};

use outcall_handle::{BoxError, CompletionHandle, HandleError};

use crate::cancellation::InterruptToken;
use crate::context::AsyncContext;
use crate::error::DispatchError;
use crate::executor::ManagedExecutor;
use crate::invocation::{Invocation, MethodId, ProceedResult};
use crate::stats::{DispatchStats, DispatchStatsSnapshot};
use crate::task::Task;

/// Dispatches intercepted calls onto executors.
///
/// Cheap to clone; clones share statistics.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    stats: Arc<DispatchStats>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Submit `invocation` to `executor` and return the caller's handle.
    ///
    /// Fails only if the executor rejects the task, in which case no handle
    /// is created for the caller. Every later failure is delivered through
    /// the returned handle.
    pub fn dispatch<T, F, Fut>(
        &self,
        invocation: Invocation<F>,
        executor: &dyn ManagedExecutor,
    ) -> Result<CompletionHandle<T>, DispatchError>
    where
        T: Clone + Send + 'static,
        F: FnOnce(AsyncContext<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ProceedResult<T>> + Send + 'static,
    {
        let (method, proceed) = invocation.into_parts();
        debug!(executor = executor.name(), method = %method, "Dispatching asynchronous method");

        let interrupt = InterruptToken::new();
        let result_handle = CompletionHandle::bound_to(Arc::new(interrupt.clone()));

        let span = debug_span!("async_call", method = %method, executor = executor.name());
        let body = run_call(
            method.clone(),
            result_handle.clone(),
            interrupt.clone(),
            proceed,
            Arc::clone(&self.stats),
        )
        .instrument(span);
        let task = Task::new(method.to_string(), interrupt, body);

        if let Err(source) = executor.submit(task) {
            self.stats.record_rejected();
            return Err(DispatchError::Rejected {
                executor: executor.name().to_string(),
                method: method.to_string(),
                source,
            });
        }

        self.stats.record_dispatched();
        Ok(result_handle)
    }
}

async fn run_call<T, F, Fut>(
    method: MethodId,
    result_handle: CompletionHandle<T>,
    interrupt: InterruptToken,
    proceed: F,
    stats: Arc<DispatchStats>,
) where
    T: Clone + Send + 'static,
    F: FnOnce(AsyncContext<T>) -> Fut + Send + 'static,
    Fut: Future<Output = ProceedResult<T>> + Send + 'static,
{
    // Cancelled between submission and start: the call never runs.
    if result_handle.is_done() {
        debug!(status = %result_handle.status(), "Handle already terminal, skipping invocation");
        return;
    }

    let ctx = AsyncContext::bind(method.clone(), result_handle.clone());

    // A panicking call fails the handle like an error; cleanup below still runs.
    let call_ctx = ctx.clone();
    let call = AssertUnwindSafe(async move { proceed(call_ctx).await }).catch_unwind();
    let invoked = tokio::select! {
        biased;
        result = call => Some(result.unwrap_or_else(|payload| Err(panic_error(payload)))),
        _ = interrupt.interrupted() => None,
    };

    // Defaults to the caller's handle unless the call returned another one.
    let mut returned_handle = result_handle.clone();
    match invoked {
        Some(Ok(handle)) => returned_handle = handle,
        Some(Err(cause)) => {
            stats.record_invocation_failure();
            debug!(error = %cause, "Asynchronous method failed");
            result_handle.fail(HandleError::from(cause));
        }
        None => debug!("Asynchronous method interrupted"),
    }

    if !returned_handle.is_done() {
        stats.record_contract_violation();
        error!(
            method = %method,
            handle = %returned_handle.id(),
            "Asynchronous method returned without completing its handle; cancelling"
        );
        result_handle.cancel(true);
    }

    // A substituted handle is terminal by now, so this wait does not block.
    if !returned_handle.same_handle(&result_handle) && !result_handle.is_done() {
        match returned_handle.wait().await {
            Ok(value) => {
                if result_handle.complete(value) {
                    stats.record_propagated();
                }
            }
            Err(err) => {
                result_handle.fail(HandleError::Propagation(Box::new(err)));
            }
        }
    }

    ctx.release();
    debug!(status = %result_handle.status(), "Asynchronous method finished");
}

fn panic_error(payload: Box<dyn Any + Send>) -> BoxError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("Asynchronous method panicked: {message}").into()
}
