//! The scheduler: priority admission in front of a bounded set of running
//! tasks.
//!
//! Two OS threads do the work. The dispatcher waits for a free gate unit,
//! promotes the highest-ranked pending task and starts its handle. The
//! completion watcher polls running handles on a fixed interval and returns
//! the units of finished tasks to the gate.
//!
//! # Locking
//!
//! - The registry mutex guards both collections. Nobody blocks while holding
//!   it; it is only ever taken for short, non-nested critical sections (the
//!   gate's own mutex is a leaf and may be taken inside it). Event sinks are
//!   called inside it so a task's events arrive in transition order.
//! - The gate and the lifecycle controller each have their own mutex and
//!   condvar. The dispatcher waits on them with the registry lock released.
//!
//! # Example
//!
//! ```rust,ignore
//! use priority_gate::builders::SchedulerBuilder;
//! use priority_gate::runtime::ThreadTask;
//!
//! let scheduler = SchedulerBuilder::new().max_concurrency(2).build()?;
//! let job = ThreadTask::new(|cancel| {
//!     while !cancel.wait_timeout(Duration::from_millis(100)) {
//!         // do a slice of work
//!     }
//! });
//! let id = scheduler.admit(Arc::new(job), 10, "reindex", "nightly reindex")?;
//! scheduler.change_rank(id, 20)?;
//! scheduler.shutdown();
//! ```

mod dispatcher;
mod watcher;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::audit::{build_task_event, EventSink, TaskAction, TaskEvent};
use super::error::SchedulerError;
use super::gate::ConcurrencyGate;
use super::handle::WorkHandle;
use super::lifecycle::Lifecycle;
use super::registry::{Registry, Removed};
use super::task::{Rank, SnapshotScope, TaskId, TaskSnapshot, DEFAULT_RANK};
use crate::config::SchedulerConfig;
use crate::util::clock::now_ms;

/// Name and description used by [`Scheduler::submit`].
const UNNAMED: &str = "None";

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Tasks waiting for capacity.
    pub pending: usize,
    /// Tasks holding a unit of capacity.
    pub running: usize,
    /// Free gate units.
    pub available_slots: usize,
    /// Configured concurrency cap.
    pub max_concurrency: usize,
    /// Whether promotions are suspended.
    pub paused: bool,
}

/// State shared by the public handle and both background loops.
pub(crate) struct Shared {
    registry: Mutex<Registry>,
    gate: ConcurrencyGate,
    lifecycle: Lifecycle,
    events: Option<Arc<dyn EventSink>>,
    poll_interval: Duration,
    idle_backoff: Duration,
}

impl Shared {
    /// Report a transition. Callers hold the registry lock, so each task's
    /// events reach the sink in the order the transitions happened.
    fn emit(&self, event: TaskEvent) {
        if let Some(sink) = &self.events {
            sink.record(event);
        }
    }
}

/// Priority scheduler with a hard concurrency cap.
///
/// Dropping the scheduler signals both loops to stop without waiting for
/// them; call [`Scheduler::shutdown`] to wait.
pub struct Scheduler {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Validate `config` and start the background loops.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidConfig`] for a zero cap or interval,
    /// [`SchedulerError::Spawn`] if a loop thread cannot be started.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        Self::with_event_sink(config, None)
    }

    /// Like [`Scheduler::new`], reporting every task transition to `events`.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::new`].
    pub fn with_event_sink(
        config: SchedulerConfig,
        events: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let shared = Arc::new(Shared {
            registry: Mutex::new(Registry::new()),
            gate: ConcurrencyGate::new(config.max_concurrency),
            lifecycle: Lifecycle::new(config.start_paused),
            events,
            poll_interval: config.poll_interval(),
            idle_backoff: config.idle_backoff(),
        });

        let dispatcher = spawn_loop("priority-gate-dispatcher", &shared, dispatcher::run)?;
        let watcher = match spawn_loop("priority-gate-watcher", &shared, watcher::run) {
            Ok(handle) => handle,
            Err(e) => {
                shared.lifecycle.shutdown();
                shared.gate.close();
                join_loop("dispatcher", dispatcher);
                return Err(e);
            }
        };

        info!(
            max_concurrency = config.max_concurrency,
            poll_interval_ms = config.poll_interval_ms,
            idle_backoff_ms = config.idle_backoff_ms,
            start_paused = config.start_paused,
            "scheduler started"
        );

        Ok(Self {
            shared,
            dispatcher: Mutex::new(Some(dispatcher)),
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// Admit a unit of work as a pending task.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::DuplicateHandle`] if the handle is already tracked
    /// - [`SchedulerError::ShuttingDown`] after [`Scheduler::shutdown`]
    pub fn admit(
        &self,
        handle: Arc<dyn WorkHandle>,
        rank: Rank,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<TaskId, SchedulerError> {
        if self.shared.lifecycle.is_shutdown() {
            return Err(SchedulerError::ShuttingDown);
        }

        let id = {
            let mut registry = self.shared.registry.lock();
            let id = registry
                .admit(handle, rank, name.into(), description.into(), now_ms())
                .inspect_err(|e| info!(error = %e, "admission rejected"))?;
            if let Some(snapshot) = registry.get(id) {
                self.shared.emit(build_task_event(&snapshot, TaskAction::Admitted));
            }
            id
        };

        debug!(task_id = %id, rank, "task admitted");
        self.shared.lifecycle.nudge();
        Ok(id)
    }

    /// Admit with [`DEFAULT_RANK`] and placeholder name and description.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::admit`].
    pub fn submit(&self, handle: Arc<dyn WorkHandle>) -> Result<TaskId, SchedulerError> {
        self.admit(handle, DEFAULT_RANK, UNNAMED, UNNAMED)
    }

    /// Change the rank of a pending task.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::NotPending`] if the task is already running
    /// - [`SchedulerError::UnknownTask`] if the id is not tracked
    pub fn change_rank(&self, id: TaskId, new_rank: Rank) -> Result<(), SchedulerError> {
        let outcome = {
            let mut registry = self.shared.registry.lock();
            let outcome = registry.change_rank(id, new_rank);
            if let (Ok(_), Some(snapshot)) = (&outcome, registry.get(id)) {
                self.shared.emit(build_task_event(&snapshot, TaskAction::Reranked));
            }
            outcome
        };

        match outcome {
            Ok(old_rank) => {
                debug!(task_id = %id, old_rank, new_rank, "task re-ranked");
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "cannot change rank");
                Err(e)
            }
        }
    }

    /// Remove a task.
    ///
    /// A pending task is simply dropped. A running task has its cancel token
    /// tripped and its handle asked to stop, and its unit of capacity is
    /// returned immediately; the handle itself may keep running if it
    /// ignores the request.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::UnknownTask`] if the id is not tracked.
    pub fn remove(&self, id: TaskId) -> Result<(), SchedulerError> {
        let removed = {
            let mut registry = self.shared.registry.lock();
            let removed = registry.remove(id);
            match &removed {
                Ok(Removed::Pending(snapshot)) => {
                    self.shared.emit(build_task_event(snapshot, TaskAction::Removed));
                }
                Ok(Removed::Running(snapshot)) => {
                    self.shared.gate.release(1);
                    self.shared.emit(build_task_event(snapshot, TaskAction::Removed));
                }
                Err(_) => {}
            }
            removed
        };

        match removed {
            Ok(Removed::Pending(_)) => {
                debug!(task_id = %id, "pending task removed");
                Ok(())
            }
            Ok(Removed::Running(_)) => {
                debug!(task_id = %id, "running task interrupted and removed");
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %id, error = %e, "cannot remove task");
                Err(e)
            }
        }
    }

    /// Detached copies of the requested collections.
    #[must_use]
    pub fn snapshot(&self, scope: SnapshotScope) -> Vec<TaskSnapshot> {
        self.shared.registry.lock().snapshot(scope)
    }

    /// Pending tasks in dispatch order.
    #[must_use]
    pub fn list_pending(&self) -> Vec<TaskSnapshot> {
        self.snapshot(SnapshotScope::Pending)
    }

    /// Running tasks in promotion order.
    #[must_use]
    pub fn list_running(&self) -> Vec<TaskSnapshot> {
        self.snapshot(SnapshotScope::Running)
    }

    /// Pending tasks followed by running tasks, read in one critical section.
    #[must_use]
    pub fn list_all(&self) -> Vec<TaskSnapshot> {
        self.snapshot(SnapshotScope::All)
    }

    /// Snapshot of a single task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.shared.registry.lock().get(id)
    }

    /// Stop promoting pending tasks. Running tasks and the completion watcher
    /// are unaffected. Idempotent.
    pub fn pause(&self) {
        self.shared.lifecycle.pause();
        info!("dispatcher paused");
    }

    /// Resume promotions. Idempotent.
    pub fn resume(&self) {
        self.shared.lifecycle.resume();
        info!("dispatcher resumed");
    }

    /// Whether promotions are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.lifecycle.is_paused()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        let (pending, running) = {
            let registry = self.shared.registry.lock();
            (registry.pending_len(), registry.running_len())
        };
        SchedulerStats {
            pending,
            running,
            available_slots: self.shared.gate.available(),
            max_concurrency: self.shared.gate.capacity(),
            paused: self.shared.lifecycle.is_paused(),
        }
    }

    /// Stop both loops and wait for them to exit. Idempotent.
    ///
    /// Pending tasks stay pending and running handles are left to finish on
    /// their own; no further promotions or evictions happen.
    pub fn shutdown(&self) {
        self.signal_shutdown();

        for (name, slot) in [("dispatcher", &self.dispatcher), ("watcher", &self.watcher)] {
            let handle = slot.lock().take();
            if let Some(handle) = handle {
                join_loop(name, handle);
            }
        }
    }

    fn signal_shutdown(&self) {
        if !self.shared.lifecycle.is_shutdown() {
            info!("scheduler shutting down");
        }
        self.shared.lifecycle.shutdown();
        self.shared.gate.close();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // Signal only; shutdown() is the one that joins.
        self.signal_shutdown();
    }
}

fn spawn_loop(
    name: &str,
    shared: &Arc<Shared>,
    body: fn(&Shared),
) -> Result<JoinHandle<()>, SchedulerError> {
    let shared = Arc::clone(shared);
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(&shared))
        .map_err(|e| SchedulerError::Spawn(format!("{name}: {e}")))
}

/// Wait for a loop thread. Returns `false` (and logs) if it panicked.
fn join_loop(name: &str, handle: JoinHandle<()>) -> bool {
    let clean = handle.join().is_ok();
    if !clean {
        warn!(loop_name = name, "scheduler loop panicked");
    }
    clean
}
