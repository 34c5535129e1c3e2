//! Error types for scheduler operations.

use thiserror::Error;

use super::task::{HandleKey, TaskId};

/// Errors produced by scheduler components.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The handle is already tracked by the scheduler (pending or running).
    #[error("handle already admitted: {0}")]
    DuplicateHandle(HandleKey),
    /// No pending or running task has this identifier.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    /// The task exists but is no longer pending.
    #[error("task is not pending: {0}")]
    NotPending(TaskId),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The scheduler has been shut down.
    #[error("scheduler is shutting down")]
    ShuttingDown,
    /// An OS thread or runtime task could not be spawned.
    #[error("spawn failed: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
