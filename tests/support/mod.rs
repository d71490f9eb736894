//! Executor stubs and log capture shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

use outcall_dispatch::{ManagedExecutor, SubmitError, Task};

/// Holds submitted tasks until the test calls `run_all`.
pub struct QueuedExecutor {
    name: String,
    queue: Mutex<Vec<Task>>,
    submitted: AtomicUsize,
}

impl QueuedExecutor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(Vec::new()),
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run every queued task in submission order, skipping interrupted ones.
    pub async fn run_all(&self) {
        let tasks: Vec<Task> = std::mem::take(&mut *self.queue.lock());
        for task in tasks {
            if !task.is_cancelled() {
                task.run().await;
            }
        }
    }
}

impl ManagedExecutor for QueuedExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, task: Task) -> Result<(), SubmitError> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().push(task);
        Ok(())
    }

    fn shutdown(&self) {}

    fn is_shutdown(&self) -> bool {
        false
    }
}

/// Runs tasks on a dedicated worker thread that stays blocked until `release`.
pub struct BlockedThreadExecutor {
    tasks: Mutex<Option<mpsc::Sender<Task>>>,
    release: Mutex<Option<mpsc::Sender<()>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl BlockedThreadExecutor {
    pub fn new() -> Self {
        let (task_tx, task_rx) = mpsc::channel::<Task>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let worker = thread::spawn(move || {
            if release_rx.recv().is_err() {
                return;
            }
            for task in task_rx {
                if !task.is_cancelled() {
                    futures::executor::block_on(task.run());
                }
            }
        });
        Self {
            tasks: Mutex::new(Some(task_tx)),
            release: Mutex::new(Some(release_tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    pub fn release(&self) {
        if let Some(release) = self.release.lock().take() {
            let _ = release.send(());
        }
    }

    /// Stop accepting tasks, let the worker drain and wait for it.
    pub fn join(&self) {
        self.tasks.lock().take();
        self.release();
        if let Some(worker) = self.worker.lock().take() {
            worker.join().expect("worker thread panicked");
        }
    }
}

impl ManagedExecutor for BlockedThreadExecutor {
    fn name(&self) -> &str {
        "blocked-thread"
    }

    fn submit(&self, task: Task) -> Result<(), SubmitError> {
        match self.tasks.lock().as_ref() {
            Some(tasks) => tasks
                .send(task)
                .map_err(|_| SubmitError::Shutdown(self.name().to_string())),
            None => Err(SubmitError::Shutdown(self.name().to_string())),
        }
    }

    fn shutdown(&self) {
        self.tasks.lock().take();
    }

    fn is_shutdown(&self) -> bool {
        self.tasks.lock().is_none()
    }
}

/// Refuses every task with a fixed error.
pub struct RejectingExecutor {
    name: String,
    error: SubmitError,
}

impl RejectingExecutor {
    pub fn saturated(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            error: SubmitError::Saturated {
                executor: name.clone(),
                in_flight: 128,
            },
            name,
        }
    }
}

impl ManagedExecutor for RejectingExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&self, _task: Task) -> Result<(), SubmitError> {
        Err(self.error.clone())
    }

    fn shutdown(&self) {}

    fn is_shutdown(&self) -> bool {
        false
    }
}

/// In-memory log sink for a `tracing` fmt subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A subscriber writing DEBUG and above into this sink, without colours.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

pub struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter(Arc::clone(&self.0))
    }
}
