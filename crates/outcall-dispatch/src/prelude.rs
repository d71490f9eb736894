//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use outcall_dispatch::prelude::*;
//! ```

pub use outcall_handle::prelude::*;

pub use crate::config::{ExecutorConfig, OutcallConfig};
pub use crate::context::AsyncContext;
pub use crate::directory::{DEFAULT_EXECUTOR_NAME, ExecutorDirectory, InMemoryDirectory};
pub use crate::dispatcher::Dispatcher;
pub use crate::error::{DispatchError, SubmitError};
pub use crate::executor::{ExecutorRef, ManagedExecutor};
pub use crate::interceptor::{AsynchronousInterceptor, ObjectHandle};
pub use crate::invocation::{Invocation, MethodId, ProceedResult};
pub use crate::task::Task;
pub use crate::tokio_executor::TokioExecutor;
