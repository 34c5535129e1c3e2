//! Unit of work backed by a dedicated OS thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::warn;

use crate::core::{CancelToken, HandleKey, SchedulerError, StartOutcome, WorkHandle};

type Body = Box<dyn FnOnce(CancelToken) + Send + 'static>;

/// Marks the task finished when the thread exits, panicking or not.
struct FinishGuard(Arc<AtomicBool>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// A one-shot closure run on its own thread once the scheduler promotes it.
///
/// The closure receives the task's [`CancelToken`]; honouring it is up to
/// the closure. The handle stays alive until the closure returns or panics.
pub struct ThreadTask {
    key: HandleKey,
    thread_name: Option<String>,
    body: Mutex<Option<Body>>,
    started: AtomicBool,
    finished: Arc<AtomicBool>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadTask {
    /// Wrap `body` with a fresh handle key.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(CancelToken) + Send + 'static,
    {
        Self {
            key: HandleKey::new(),
            thread_name: None,
            body: Mutex::new(Some(Box::new(body))),
            started: AtomicBool::new(false),
            finished: Arc::new(AtomicBool::new(false)),
            join: Mutex::new(None),
        }
    }

    /// Name the OS thread the body runs on.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Whether `start` has launched the body.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Whether the body has returned (or panicked).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Block until the body's thread exits. Returns `false` if it panicked
    /// or was never started.
    pub fn join(&self) -> bool {
        let handle = self.join.lock().take();
        handle.is_some_and(|h| h.join().is_ok())
    }
}

impl WorkHandle for ThreadTask {
    fn key(&self) -> HandleKey {
        self.key
    }

    fn start(&self, cancel: CancelToken) -> Result<StartOutcome, SchedulerError> {
        let Some(body) = self.body.lock().take() else {
            return Ok(StartOutcome::AlreadyStarted);
        };

        let finished = Arc::clone(&self.finished);
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.thread_name {
            builder = builder.name(name.clone());
        }

        match builder.spawn(move || {
            let _guard = FinishGuard(finished);
            body(cancel);
        }) {
            Ok(handle) => {
                self.started.store(true, Ordering::Release);
                *self.join.lock() = Some(handle);
                Ok(StartOutcome::Started)
            }
            Err(e) => {
                // The body went down with the failed spawn; it can never run.
                self.finished.store(true, Ordering::Release);
                warn!(key = %self.key, error = %e, "failed to spawn task thread");
                Err(SchedulerError::Spawn(e.to_string()))
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.is_started() && !self.is_finished()
    }
}
