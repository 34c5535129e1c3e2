//! Task lifecycle events and the sinks that receive them.
//!
//! Every transition the scheduler makes is reported as a [`TaskEvent`]. The
//! completion watcher's records are the [`TaskAction::Completed`] events.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::task::{Rank, TaskId, TaskSnapshot};
use crate::util::clock::now_ms;

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// Admitted into the pending queue.
    Admitted,
    /// Rank changed while pending.
    Reranked,
    /// Promoted to running.
    Promoted,
    /// Handle reported it finished; capacity reclaimed.
    Completed,
    /// Removed on request.
    Removed,
    /// Handle could not be started; task dropped.
    StartFailed,
}

/// Lifecycle event for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Related task.
    pub task_id: TaskId,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Rank at the time of the event.
    pub rank: Rank,
    /// Transition taken.
    pub action: TaskAction,
    /// Admission time (ms since epoch).
    pub created_at_ms: u128,
    /// Promotion time (ms since epoch), if the task ever ran.
    pub started_at_ms: Option<u128>,
    /// When the event was recorded (ms since epoch). For `Completed` this is
    /// the observed finish time.
    pub recorded_at_ms: u128,
}

impl TaskEvent {
    /// Milliseconds between promotion and this event, if the task ran.
    #[must_use]
    pub fn run_time_ms(&self) -> Option<u128> {
        self.started_at_ms
            .map(|started| self.recorded_at_ms.saturating_sub(started))
    }
}

/// Build an event for `task` stamped with the current time.
#[must_use]
pub fn build_task_event(task: &TaskSnapshot, action: TaskAction) -> TaskEvent {
    TaskEvent {
        task_id: task.id,
        name: task.name.clone(),
        description: task.description.clone(),
        rank: task.rank,
        action,
        created_at_ms: task.created_at_ms,
        started_at_ms: task.started_at_ms,
        recorded_at_ms: now_ms(),
    }
}

/// Receiver of task events.
///
/// Called while the scheduler holds its registry lock: keep `record` cheap
/// and never call back into the scheduler from it.
pub trait EventSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: TaskEvent);
}

/// Bounded in-memory sink for testing and dev. Clones share the buffer.
#[derive(Clone)]
pub struct InMemoryEventSink {
    events: Arc<Mutex<VecDeque<TaskEvent>>>,
    max_events: usize,
}

impl InMemoryEventSink {
    /// Create a sink keeping at most `max_events`; the oldest are dropped.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Snapshot of stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored events with the given action.
    #[must_use]
    pub fn events_with(&self, action: TaskAction) -> Vec<TaskEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, event: TaskEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink forwarding every event into a channel, for consumers that want to be
/// told about completions instead of polling snapshots.
#[derive(Clone)]
pub struct ChannelEventSink {
    tx: Sender<TaskEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<TaskEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn record(&self, event: TaskEvent) {
        // Receiver dropped: nobody is listening any more.
        let _ = self.tx.send(event);
    }
}
