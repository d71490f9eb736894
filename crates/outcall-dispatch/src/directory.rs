//! Executor directory: resolution of executor names to executors.
//!
//! The directory itself is an external collaborator; this module defines the
//! seam ([`ExecutorDirectory`]) and an in-memory backend for development,
//! tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::OutcallConfig;
use crate::error::{ConfigError, DirectoryError, DispatchError};
use crate::executor::{ExecutorRef, ManagedExecutor};
use crate::invocation::MethodId;
use crate::tokio_executor::TokioExecutor;

/// Name used when an invocation does not ask for a specific executor.
pub const DEFAULT_EXECUTOR_NAME: &str = "java:comp/DefaultManagedExecutorService";

/// What a directory name is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    Executor(ExecutorRef),
    /// Some other kind of resource, which cannot run tasks.
    Resource { kind: String },
}

impl Binding {
    pub fn kind(&self) -> &str {
        match self {
            Binding::Executor(_) => "ManagedExecutor",
            Binding::Resource { kind } => kind,
        }
    }
}

/// Core trait for executor directory backends.
#[async_trait]
pub trait ExecutorDirectory: Send + Sync {
    /// Human-readable name of the backend (e.g., "in-memory")
    fn backend_name(&self) -> &'static str;

    /// Look up a name. `Ok(None)` means nothing is bound under it.
    async fn lookup(&self, name: &str) -> Result<Option<Binding>, DirectoryError>;
}

/// Resolve `name` to an executor on behalf of `method`.
pub async fn resolve_executor(
    directory: &dyn ExecutorDirectory,
    name: &str,
    method: &MethodId,
) -> Result<ExecutorRef, DispatchError> {
    let binding = directory
        .lookup(name)
        .await
        .map_err(|source| DispatchError::Directory {
            name: name.to_string(),
            source,
        })?;

    match binding {
        Some(Binding::Executor(executor)) => Ok(executor),
        Some(other) => Err(DispatchError::WrongBindingType {
            name: name.to_string(),
            found: other.kind().to_string(),
        }),
        None => Err(DispatchError::ExecutorNotFound {
            name: name.to_string(),
            method: method.to_string(),
        }),
    }
}

/// In-memory directory backed by a `HashMap` behind an `RwLock`.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    bindings: Arc<RwLock<HashMap<String, Binding>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory holding one [`TokioExecutor`] per configured executor.
    pub fn from_config(config: &OutcallConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bindings = config
            .executors
            .iter()
            .map(|executor| {
                let executor: ExecutorRef = Arc::new(TokioExecutor::new(executor.clone()));
                (executor.name().to_string(), Binding::Executor(executor))
            })
            .collect();
        Ok(Self {
            bindings: Arc::new(RwLock::new(bindings)),
        })
    }

    /// Bind `executor` under its own name. Returns the previous binding.
    pub async fn bind_executor(&self, executor: ExecutorRef) -> Option<Binding> {
        let name = executor.name().to_string();
        self.bind(name, Binding::Executor(executor)).await
    }

    /// Bind `executor` under an alias.
    pub async fn bind_executor_as(
        &self,
        name: impl Into<String>,
        executor: ExecutorRef,
    ) -> Option<Binding> {
        self.bind(name.into(), Binding::Executor(executor)).await
    }

    /// Bind a non-executor resource, e.g. a data source.
    pub async fn bind_resource(
        &self,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Option<Binding> {
        self.bind(name.into(), Binding::Resource { kind: kind.into() })
            .await
    }

    /// Returns `true` if something was bound under `name`.
    pub async fn unbind(&self, name: &str) -> bool {
        self.bindings.write().await.remove(name).is_some()
    }

    /// All bound names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Stop every bound executor from accepting new tasks.
    pub async fn shutdown_executors(&self) {
        for binding in self.bindings.read().await.values() {
            if let Binding::Executor(executor) = binding {
                executor.shutdown();
            }
        }
    }

    async fn bind(&self, name: String, binding: Binding) -> Option<Binding> {
        debug!(name = %name, kind = binding.kind(), "Binding directory entry");
        self.bindings.write().await.insert(name, binding)
    }
}

#[async_trait]
impl ExecutorDirectory for InMemoryDirectory {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn lookup(&self, name: &str) -> Result<Option<Binding>, DirectoryError> {
        if name.trim().is_empty() {
            return Err(DirectoryError::InvalidName(name.to_string()));
        }
        Ok(self.bindings.read().await.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutorConfig;

    fn method() -> MethodId {
        MethodId::new("Reports", "render")
    }

    fn executor(name: &str) -> ExecutorRef {
        Arc::new(TokioExecutor::new(ExecutorConfig::named(name)))
    }

    #[tokio::test]
    async fn test_resolve_bound_executor() {
        let directory = InMemoryDirectory::new();
        directory.bind_executor(executor("reports")).await;

        let resolved = resolve_executor(&directory, "reports", &method())
            .await
            .unwrap();
        assert_eq!(resolved.name(), "reports");
    }

    #[tokio::test]
    async fn test_resolve_alias() {
        let directory = InMemoryDirectory::new();
        directory
            .bind_executor_as("java:app/Reports", executor("reports"))
            .await;

        let resolved = resolve_executor(&directory, "java:app/Reports", &method())
            .await
            .unwrap();
        assert_eq!(resolved.name(), "reports");
    }

    #[tokio::test]
    async fn test_missing_executor_names_method() {
        let directory = InMemoryDirectory::new();
        let err = resolve_executor(&directory, "missing", &method())
            .await
            .unwrap_err();

        assert!(err.is_resolution_error());
        assert_eq!(
            err.to_string(),
            "Executor 'missing' not found as requested by asynchronous method Reports::render"
        );
    }

    #[tokio::test]
    async fn test_wrong_binding_type() {
        let directory = InMemoryDirectory::new();
        directory.bind_resource("jdbc/orders", "DataSource").await;

        let err = resolve_executor(&directory, "jdbc/orders", &method())
            .await
            .unwrap_err();
        match err {
            DispatchError::WrongBindingType { name, found } => {
                assert_eq!(name, "jdbc/orders");
                assert_eq!(found, "DataSource");
            }
            other => panic!("Expected WrongBindingType, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_name_is_directory_error() {
        let directory = InMemoryDirectory::new();
        let err = resolve_executor(&directory, " ", &method())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Directory { .. }));
    }

    #[tokio::test]
    async fn test_unbind_and_names() {
        let directory = InMemoryDirectory::new();
        directory.bind_executor(executor("b")).await;
        directory.bind_executor(executor("a")).await;
        assert_eq!(directory.names().await, vec!["a", "b"]);

        assert!(directory.unbind("a").await);
        assert!(!directory.unbind("a").await);
        assert_eq!(directory.names().await, vec!["b"]);
    }

    #[tokio::test]
    async fn test_from_config_binds_every_executor() {
        let config = OutcallConfig {
            default_executor: "mail".to_string(),
            executors: vec![ExecutorConfig::named("mail"), ExecutorConfig::named("batch")],
        };
        let directory = InMemoryDirectory::from_config(&config).unwrap();
        assert_eq!(directory.names().await, vec!["batch", "mail"]);

        directory.shutdown_executors().await;
        match directory.lookup("mail").await.unwrap() {
            Some(Binding::Executor(executor)) => assert!(executor.is_shutdown()),
            other => panic!("Expected executor binding, got: {:?}", other),
        }
    }
}
