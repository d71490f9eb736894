//! Tokio-based managed executor, the default in-process way to run tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, trace, warn};

use crate::config::ExecutorConfig;
use crate::error::SubmitError;
use crate::executor::ManagedExecutor;
use crate::task::Task;

/// In-process executor bounded by a concurrency limit and an in-flight capacity.
pub struct TokioExecutor {
    config: ExecutorConfig,
    runtime: Option<Handle>,
    permits: Arc<Semaphore>,
    in_flight: Arc<watch::Sender<usize>>,
    shutdown: AtomicBool,
}

impl TokioExecutor {
    /// Spawn onto whichever Tokio runtime is current at submission time.
    pub fn new(config: ExecutorConfig) -> Self {
        Self::build(config, None)
    }

    /// Spawn onto `runtime`, so tasks can be submitted from threads outside it.
    pub fn with_runtime(config: ExecutorConfig, runtime: Handle) -> Self {
        Self::build(config, Some(runtime))
    }

    fn build(config: ExecutorConfig, runtime: Option<Handle>) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            config,
            runtime,
            in_flight: Arc::new(in_flight),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Tasks accepted but not yet finished (queued or running).
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every accepted task has finished.
    pub async fn await_idle(&self) {
        let mut rx = self.in_flight.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    fn reserve_slot(&self) -> Result<(), SubmitError> {
        let capacity = self.config.queue_capacity;
        let mut observed = 0;
        let accepted = self.in_flight.send_if_modified(|count| {
            observed = *count;
            if capacity > 0 && *count >= capacity {
                return false;
            }
            *count += 1;
            true
        });
        if accepted {
            Ok(())
        } else {
            Err(SubmitError::Saturated {
                executor: self.config.name.clone(),
                in_flight: observed,
            })
        }
    }
}

/// Releases an in-flight slot when the spawned task ends, however it ends.
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl ManagedExecutor for TokioExecutor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn submit(&self, task: Task) -> Result<(), SubmitError> {
        if self.is_shutdown() {
            return Err(SubmitError::Shutdown(self.config.name.clone()));
        }
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|err| SubmitError::Unavailable {
                executor: self.config.name.clone(),
                reason: err.to_string(),
            })?,
        };
        if let Err(err) = self.reserve_slot() {
            warn!(
                executor = %self.config.name,
                task = %task.label(),
                error = %err,
                "Rejecting task"
            );
            return Err(err);
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let permits = Arc::clone(&self.permits);
        let executor = self.config.name.clone();

        runtime.spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            if task.is_cancelled() {
                debug!(
                    executor = %executor,
                    task_id = %task.id(),
                    task = %task.label(),
                    "Skipping task cancelled before start"
                );
                return;
            }
            let task_id = task.id();
            task.run().await;
            trace!(executor = %executor, task_id = %task_id, "Task execution completed");
        });

        Ok(())
    }

    fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!(
                executor = %self.config.name,
                in_flight = self.in_flight(),
                "Executor shut down"
            );
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::oneshot;

    use crate::cancellation::InterruptToken;

    fn task(body: impl std::future::Future<Output = ()> + Send + 'static) -> Task {
        Task::new("Tests::body", InterruptToken::new(), body)
    }

    #[tokio::test]
    async fn test_submit_runs_task() {
        let executor = TokioExecutor::new(ExecutorConfig::named("test"));
        let (tx, rx) = oneshot::channel();

        executor
            .submit(task(async move {
                let _ = tx.send(42);
            }))
            .unwrap();

        let value = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("task should run")
            .unwrap();
        assert_eq!(value, 42);
        executor.await_idle().await;
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_submit_rejected_after_shutdown() {
        let executor = TokioExecutor::new(ExecutorConfig::named("test"));
        executor.shutdown();
        assert!(executor.is_shutdown());

        let result = executor.submit(task(async {}));
        assert_eq!(result, Err(SubmitError::Shutdown("test".to_string())));
    }

    #[tokio::test]
    async fn test_saturated_executor_rejects() {
        let executor = TokioExecutor::new(
            ExecutorConfig::named("tiny")
                .with_max_concurrency(1)
                .with_queue_capacity(1),
        );
        let (release_tx, release_rx) = oneshot::channel::<()>();

        executor
            .submit(task(async move {
                let _ = release_rx.await;
            }))
            .unwrap();

        let result = executor.submit(task(async {}));
        assert!(matches!(
            result,
            Err(SubmitError::Saturated { in_flight: 1, .. })
        ));

        release_tx.send(()).unwrap();
        executor.await_idle().await;
        assert!(executor.submit(task(async {})).is_ok());
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let executor = Arc::new(TokioExecutor::new(
            ExecutorConfig::named("pool").with_max_concurrency(2),
        ));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            executor
                .submit(task(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }))
                .unwrap();
        }

        tokio::time::timeout(Duration::from_secs(5), executor.await_idle())
            .await
            .expect("all tasks should finish");
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_task_cancelled_before_start_is_skipped() {
        let executor = TokioExecutor::new(ExecutorConfig::named("test"));
        let token = InterruptToken::new();
        token.interrupt();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        executor
            .submit(Task::new("Tests::skipped", token, async move {
                ran_clone.store(true, Ordering::SeqCst);
            }))
            .unwrap();

        executor.await_idle().await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_submit_outside_runtime_is_unavailable() {
        let executor = TokioExecutor::new(ExecutorConfig::named("orphan"));
        let result = executor.submit(task(async {}));
        assert!(matches!(result, Err(SubmitError::Unavailable { .. })));
        assert_eq!(executor.in_flight(), 0);
    }

    #[test]
    fn test_with_runtime_accepts_from_foreign_thread() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let executor =
            TokioExecutor::with_runtime(ExecutorConfig::named("bg"), runtime.handle().clone());
        let (tx, rx) = std::sync::mpsc::channel();

        executor
            .submit(task(async move {
                let _ = tx.send("ran");
            }))
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "ran");
    }
}
