//! # Asynchronous Method Dispatch
//!
//! Turns an intercepted method call into a task on a managed executor and
//! hands the caller a [`CompletionHandle`] straight away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use outcall_dispatch::prelude::*;
//!
//! async fn place_order(ctx: AsyncContext<u64>) -> ProceedResult<u64> {
//!     // ... the original method body ...
//!     Ok(ctx.complete(1001)?)
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let interceptor = AsynchronousInterceptor::from_config(&OutcallConfig::default())?;
//! let handle = interceptor
//!     .intercept(Invocation::new(MethodId::new("Orders", "place_order"), place_order))
//!     .await?;
//!
//! assert_eq!(handle.wait().await?, 1001);
//! # Ok(())
//! # }
//! ```
//!
//! ## Completion contract
//!
//! The invoked call receives an [`AsyncContext`] holding the caller's handle.
//! It must leave the handle it returns in a terminal state:
//!
//! - returning an error fails the caller's handle with that error
//! - returning a pending handle is a contract violation: it is logged and the
//!   caller's handle is cancelled (best effort; a call that ignores
//!   interruption keeps running)
//! - returning a different, terminal handle copies its outcome into the
//!   caller's handle
//!
//! ## Architecture
//!
//! - **`Dispatcher`**: the dispatch/completion protocol
//! - **`ManagedExecutor`**: where tasks run; `TokioExecutor` by default
//! - **`ExecutorDirectory`**: name → executor resolution; `InMemoryDirectory` by default
//! - **`AsynchronousInterceptor`**: resolution + dispatch for one invocation

pub mod cancellation;
pub mod config;
pub mod context;
pub mod directory;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod interceptor;
pub mod invocation;
pub mod prelude;
pub mod stats;
pub mod task;
pub mod tokio_executor;

pub use outcall_handle::{
    BoxError, CompletionHandle, HandleError, HandleId, HandleStatus, Outcome,
};

pub use cancellation::InterruptToken;
pub use config::{ExecutorConfig, OutcallConfig};
pub use context::AsyncContext;
pub use directory::{
    Binding, DEFAULT_EXECUTOR_NAME, ExecutorDirectory, InMemoryDirectory, resolve_executor,
};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, ContextReleased, DirectoryError, DispatchError, SubmitError};
pub use executor::{ExecutorRef, ManagedExecutor};
pub use interceptor::{AsynchronousInterceptor, ObjectHandle};
pub use invocation::{Invocation, MethodId, ProceedResult};
pub use stats::{DispatchStats, DispatchStatsSnapshot};
pub use task::Task;
pub use tokio_executor::TokioExecutor;
