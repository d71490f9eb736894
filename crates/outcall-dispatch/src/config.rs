//! Executor configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! default_executor = "java:comp/DefaultManagedExecutorService"
//!
//! [[executors]]
//! name = "java:comp/DefaultManagedExecutorService"
//! max_concurrency = 16
//! queue_capacity = 1024
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::directory::DEFAULT_EXECUTOR_NAME;
use crate::error::ConfigError;

/// Configuration for one [`crate::tokio_executor::TokioExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Directory name of the executor
    pub name: String,
    /// Maximum number of tasks running at once
    pub max_concurrency: usize,
    /// Maximum number of accepted-but-unfinished tasks (0 = unlimited)
    pub queue_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_EXECUTOR_NAME.to_string(),
            max_concurrency: 16,
            queue_capacity: 1024,
        }
    }
}

impl ExecutorConfig {
    /// Default limits under a different name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("executor name must not be empty".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid(format!(
                "executor '{}' must allow at least one concurrent task",
                self.name
            )));
        }
        Ok(())
    }
}

/// Top-level configuration: the executors to create and which one is the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcallConfig {
    /// Executor used by invocations that do not name one
    pub default_executor: String,
    pub executors: Vec<ExecutorConfig>,
}

impl Default for OutcallConfig {
    fn default() -> Self {
        Self {
            default_executor: DEFAULT_EXECUTOR_NAME.to_string(),
            executors: vec![ExecutorConfig::default()],
        }
    }
}

impl OutcallConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: OutcallConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for executor in &self.executors {
            executor.validate()?;
            if !seen.insert(executor.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "executor '{}' is declared more than once",
                    executor.name
                )));
            }
        }
        if !seen.contains(self.default_executor.as_str()) {
            return Err(ConfigError::UnknownDefaultExecutor(
                self.default_executor.clone(),
            ));
        }
        Ok(())
    }
}
