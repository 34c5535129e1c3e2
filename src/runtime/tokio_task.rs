//! Unit of work backed by a task on a tokio runtime.

use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::core::{CancelToken, HandleKey, SchedulerError, StartOutcome, WorkHandle};

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
type Factory = Box<dyn FnOnce(CancelToken) -> BoxFuture + Send + 'static>;

/// A future spawned on a tokio runtime once the scheduler promotes it.
///
/// The scheduler's loops run on plain OS threads, so the task keeps the
/// runtime [`Handle`] it should be spawned onto.
pub struct TokioTask {
    key: HandleKey,
    runtime: Handle,
    factory: Mutex<Option<Factory>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl TokioTask {
    /// Build a task whose future is produced by `factory` on the given runtime.
    pub fn new<F, Fut>(runtime: Handle, factory: F) -> Self
    where
        F: FnOnce(CancelToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            key: HandleKey::new(),
            runtime,
            factory: Mutex::new(Some(Box::new(move |cancel| -> BoxFuture {
                Box::pin(factory(cancel))
            }))),
            join: Mutex::new(None),
        }
    }

    /// Build a task on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Spawn`] if called outside a tokio runtime.
    pub fn current<F, Fut>(factory: F) -> Result<Self, SchedulerError>
    where
        F: FnOnce(CancelToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| SchedulerError::Spawn(e.to_string()))?;
        Ok(Self::new(runtime, factory))
    }
}

impl WorkHandle for TokioTask {
    fn key(&self) -> HandleKey {
        self.key
    }

    fn start(&self, cancel: CancelToken) -> Result<StartOutcome, SchedulerError> {
        let Some(factory) = self.factory.lock().take() else {
            return Ok(StartOutcome::AlreadyStarted);
        };
        let handle = self.runtime.spawn(factory(cancel));
        *self.join.lock() = Some(handle);
        Ok(StartOutcome::Started)
    }

    fn is_alive(&self) -> bool {
        self.join
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn request_interrupt(&self) {
        if let Some(handle) = self.join.lock().as_ref() {
            handle.abort();
        }
    }
}
