//! Task registry: the pending queue and the running set.
//!
//! The registry is a plain data structure. [`crate::core::Scheduler`] keeps it
//! behind a single mutex so that a task is always observed in exactly one
//! collection.
//!
//! Pending is a `Vec` kept in dispatch order: descending rank, admission order
//! among equal ranks. Insertion scans from the tail for the last task whose
//! rank is at least the new rank and places the new task right after it, so
//! equal ranks stay FIFO without a sequence counter.

use std::collections::HashSet;
use std::sync::Arc;

use super::cancel::CancelToken;
use super::error::SchedulerError;
use super::handle::WorkHandle;
use super::task::{HandleKey, Rank, SnapshotScope, TaskId, TaskRecord, TaskSnapshot, TaskStatus};

/// Outcome of [`Registry::remove`], telling the caller what else to undo.
#[derive(Debug)]
pub enum Removed {
    /// The task was still waiting; nothing else to release.
    Pending(TaskSnapshot),
    /// The task was running; its token is cancelled and its handle asked to
    /// stop. The caller owes the gate one unit.
    Running(TaskSnapshot),
}

/// Pending and running task bookkeeping.
#[derive(Default)]
pub struct Registry {
    pending: Vec<TaskRecord>,
    running: Vec<TaskRecord>,
    tracked: HashSet<HandleKey>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a handle as a pending task.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::DuplicateHandle`] if a task with the same handle key
    /// is still pending or running.
    pub fn admit(
        &mut self,
        handle: Arc<dyn WorkHandle>,
        rank: Rank,
        name: String,
        description: String,
        now_ms: u128,
    ) -> Result<TaskId, SchedulerError> {
        let key = handle.key();
        if !self.tracked.insert(key) {
            return Err(SchedulerError::DuplicateHandle(key));
        }

        let record = TaskRecord {
            id: TaskId::generate(),
            key,
            name,
            description,
            rank,
            status: TaskStatus::Pending,
            created_at_ms: now_ms,
            started_at_ms: None,
            handle,
            cancel: CancelToken::new(),
        };
        let id = record.id;
        self.insert_pending(record);
        Ok(id)
    }

    fn insert_pending(&mut self, record: TaskRecord) {
        let index = self
            .pending
            .iter()
            .rposition(|r| r.rank >= record.rank)
            .map_or(0, |i| i + 1);
        self.pending.insert(index, record);
    }

    /// Re-rank a pending task and move it to its new place in the queue.
    ///
    /// The task lands behind every task already holding `new_rank`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotPending`] if the task is running,
    /// [`SchedulerError::UnknownTask`] if it is not tracked at all.
    pub fn change_rank(&mut self, id: TaskId, new_rank: Rank) -> Result<Rank, SchedulerError> {
        let Some(index) = self.pending.iter().position(|r| r.id == id) else {
            if self.running.iter().any(|r| r.id == id) {
                return Err(SchedulerError::NotPending(id));
            }
            return Err(SchedulerError::UnknownTask(id));
        };
        let mut record = self.pending.remove(index);
        let old_rank = record.rank;
        record.rank = new_rank;
        self.insert_pending(record);
        Ok(old_rank)
    }

    /// Remove a task from whichever collection holds it.
    ///
    /// Running tasks get their cancel token tripped and an interrupt request
    /// before the record is dropped.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::UnknownTask`] if the id is in neither collection.
    pub fn remove(&mut self, id: TaskId) -> Result<Removed, SchedulerError> {
        if let Some(index) = self.pending.iter().position(|r| r.id == id) {
            let record = self.pending.remove(index);
            self.tracked.remove(&record.key);
            return Ok(Removed::Pending(record.snapshot()));
        }
        if let Some(index) = self.running.iter().position(|r| r.id == id) {
            let record = self.running.swap_remove(index);
            record.cancel.cancel();
            record.handle.request_interrupt();
            self.tracked.remove(&record.key);
            return Ok(Removed::Running(record.snapshot()));
        }
        Err(SchedulerError::UnknownTask(id))
    }

    /// Take the head of the pending queue. The handle stays tracked until the
    /// record is pushed to running and later evicted, or [`Self::discard`]ed.
    pub(crate) fn pop_next(&mut self) -> Option<TaskRecord> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub(crate) fn push_running(&mut self, mut record: TaskRecord, now_ms: u128) -> TaskSnapshot {
        record.status = TaskStatus::Running;
        record.started_at_ms = Some(now_ms);
        let snapshot = record.snapshot();
        self.running.push(record);
        snapshot
    }

    /// Forget a record that was popped but never made it to running.
    pub(crate) fn discard(&mut self, record: &TaskRecord) {
        self.tracked.remove(&record.key);
    }

    /// Evict every running task whose handle reports it is no longer alive.
    pub(crate) fn take_finished(&mut self) -> Vec<TaskRecord> {
        if self.running.iter().all(|r| r.handle.is_alive()) {
            return Vec::new();
        }
        let (finished, alive): (Vec<_>, Vec<_>) = self
            .running
            .drain(..)
            .partition(|r| !r.handle.is_alive());
        self.running = alive;
        for record in &finished {
            self.tracked.remove(&record.key);
        }
        finished
    }

    /// Detached copies of the requested collections.
    #[must_use]
    pub fn snapshot(&self, scope: SnapshotScope) -> Vec<TaskSnapshot> {
        match scope {
            SnapshotScope::Pending => self.pending.iter().map(TaskRecord::snapshot).collect(),
            SnapshotScope::Running => self.running.iter().map(TaskRecord::snapshot).collect(),
            SnapshotScope::All => self
                .pending
                .iter()
                .chain(self.running.iter())
                .map(TaskRecord::snapshot)
                .collect(),
        }
    }

    /// Snapshot of one task, pending or running.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        self.pending
            .iter()
            .chain(self.running.iter())
            .find(|r| r.id == id)
            .map(TaskRecord::snapshot)
    }

    /// Whether a handle with this key is pending or running.
    #[must_use]
    pub fn is_tracked(&self, key: &HandleKey) -> bool {
        self.tracked.contains(key)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of running tasks.
    #[must_use]
    pub fn running_len(&self) -> usize {
        self.running.len()
    }
}
