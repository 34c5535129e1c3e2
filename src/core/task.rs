//! Task identity, records and the snapshots handed out to callers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cancel::CancelToken;
use super::handle::WorkHandle;

/// Integer priority. Higher values dispatch sooner.
pub type Rank = i32;

/// Rank used by [`crate::core::Scheduler::submit`].
pub const DEFAULT_RANK: Rank = 5;

/// Scheduler-assigned task identifier, unique for the scheduler's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identity of a unit of work, used to reject duplicate admissions.
///
/// Handles mint one key when they are created and report it unchanged for
/// their whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleKey(Uuid);

impl HandleKey {
    /// Mint a fresh random key.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, e.g. one owned by the caller's own job model.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for HandleKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Admitted, waiting for capacity.
    Pending,
    /// Promoted and holding one unit of capacity.
    Running,
}

/// Which collections a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    /// Pending tasks in dispatch order.
    Pending,
    /// Running tasks in promotion order.
    Running,
    /// Pending tasks followed by running tasks.
    All,
}

/// Internal bookkeeping for one admitted unit of work.
pub(crate) struct TaskRecord {
    pub id: TaskId,
    pub key: HandleKey,
    pub name: String,
    pub description: String,
    pub rank: Rank,
    pub status: TaskStatus,
    pub created_at_ms: u128,
    pub started_at_ms: Option<u128>,
    pub handle: Arc<dyn WorkHandle>,
    pub cancel: CancelToken,
}

impl TaskRecord {
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            rank: self.rank,
            status: self.status,
            created_at_ms: self.created_at_ms,
            started_at_ms: self.started_at_ms,
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("name", &self.name)
            .field("rank", &self.rank)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Detached copy of a task's metadata. Carries no reference to the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier.
    pub id: TaskId,
    /// Caller-supplied name.
    pub name: String,
    /// Caller-supplied description.
    pub description: String,
    /// Current rank.
    pub rank: Rank,
    /// Pending or running.
    pub status: TaskStatus,
    /// Admission time (ms since epoch).
    pub created_at_ms: u128,
    /// Promotion time (ms since epoch), once running.
    pub started_at_ms: Option<u128>,
}
