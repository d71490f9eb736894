//! Description of an intercepted call.

use std::fmt;

use serde::{Deserialize, Serialize};

use outcall_handle::{BoxError, CompletionHandle};

/// Identity of the intercepted method, e.g. `OrderService::place_order`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodId {
    pub owner: String,
    pub name: String,
}

impl MethodId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// What an invoked call returns: the handle it considers its result.
///
/// Usually the handle from its context (`ctx.complete(v)`), or a handle the
/// call manages itself.
pub type ProceedResult<T> = Result<CompletionHandle<T>, BoxError>;

/// An intercepted call: which method, which executor it asked for, and how
/// to run the original body.
pub struct Invocation<F> {
    method: MethodId,
    executor: Option<String>,
    proceed: F,
}

impl<F> Invocation<F> {
    pub fn new(method: MethodId, proceed: F) -> Self {
        Self {
            method,
            executor: None,
            proceed,
        }
    }

    /// Request a specific executor by directory name.
    pub fn with_executor(mut self, name: impl Into<String>) -> Self {
        self.executor = Some(name.into());
        self
    }

    pub fn method(&self) -> &MethodId {
        &self.method
    }

    /// The executor name the method asked for. Blank names count as unspecified.
    pub fn executor(&self) -> Option<&str> {
        self.executor
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    pub(crate) fn into_parts(self) -> (MethodId, F) {
        (self.method, self.proceed)
    }
}

impl<F> fmt::Debug for Invocation<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.method)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}
