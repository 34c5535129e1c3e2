//! Core scheduling: task registry, concurrency gate, lifecycle control and the
//! two background loops that connect them.

pub mod audit;
pub mod cancel;
pub mod error;
pub mod gate;
pub mod handle;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;
pub mod task;

pub use audit::{
    build_task_event, ChannelEventSink, EventSink, InMemoryEventSink, TaskAction, TaskEvent,
};
pub use cancel::CancelToken;
pub use error::{AppResult, SchedulerError};
pub use gate::ConcurrencyGate;
pub use handle::{StartOutcome, WorkHandle};
pub use lifecycle::Lifecycle;
pub use registry::{Registry, Removed};
pub use scheduler::{Scheduler, SchedulerStats};
pub use task::{HandleKey, Rank, SnapshotScope, TaskId, TaskSnapshot, TaskStatus, DEFAULT_RANK};
