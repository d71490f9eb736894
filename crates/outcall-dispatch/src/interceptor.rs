//! Interceptor for methods marked asynchronous.
//!
//! Picks the executor the method asked for (or the default), resolves it
//! through an [`ExecutorDirectory`] and hands the call to the [`Dispatcher`].

use std::future::Future;
use std::sync::Arc;

use tracing::trace;

use outcall_handle::CompletionHandle;

use crate::config::OutcallConfig;
use crate::context::AsyncContext;
use crate::directory::{
    DEFAULT_EXECUTOR_NAME, ExecutorDirectory, InMemoryDirectory, resolve_executor,
};
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigError, DispatchError};
use crate::invocation::{Invocation, ProceedResult};

/// Handle type for calls whose result is only known dynamically.
pub type ObjectHandle = CompletionHandle<serde_json::Value>;

/// Turns intercepted invocations into dispatched tasks.
pub struct AsynchronousInterceptor {
    directory: Arc<dyn ExecutorDirectory>,
    dispatcher: Dispatcher,
    default_executor: String,
}

impl AsynchronousInterceptor {
    pub fn new(directory: Arc<dyn ExecutorDirectory>) -> Self {
        Self {
            directory,
            dispatcher: Dispatcher::new(),
            default_executor: DEFAULT_EXECUTOR_NAME.to_string(),
        }
    }

    /// Build an interceptor over an in-memory directory populated from `config`.
    pub fn from_config(config: &OutcallConfig) -> Result<Self, ConfigError> {
        let directory = InMemoryDirectory::from_config(config)?;
        Ok(Self::new(Arc::new(directory)).with_default_executor(config.default_executor.clone()))
    }

    pub fn with_default_executor(mut self, name: impl Into<String>) -> Self {
        self.default_executor = name.into();
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn default_executor(&self) -> &str {
        &self.default_executor
    }

    /// The executor name `invocation` will be dispatched to.
    pub fn executor_name_for<'a, F>(&'a self, invocation: &'a Invocation<F>) -> &'a str {
        invocation.executor().unwrap_or(&self.default_executor)
    }

    /// Resolve the executor and dispatch the invocation.
    ///
    /// Resolution and submission failures are returned here; everything
    /// after is reported through the returned handle.
    pub async fn intercept<T, F, Fut>(
        &self,
        invocation: Invocation<F>,
    ) -> Result<CompletionHandle<T>, DispatchError>
    where
        T: Clone + Send + 'static,
        F: FnOnce(AsyncContext<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ProceedResult<T>> + Send + 'static,
    {
        let name = self.executor_name_for(&invocation).to_string();
        trace!(method = %invocation.method(), executor = %name, "Intercepting asynchronous method");

        let executor = resolve_executor(self.directory.as_ref(), &name, invocation.method()).await?;
        self.dispatcher.dispatch(invocation, executor.as_ref())
    }
}
