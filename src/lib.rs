//! # Priority Gate
//!
//! A priority-ordered admission scheduler with a hard cap on concurrent execution.
//!
//! Callers hand the scheduler opaque units of work ([`core::WorkHandle`]) with an
//! integer rank. Work waits in a pending queue ordered by descending rank (first in,
//! first out among equal ranks) and is promoted to running only while a unit of
//! concurrency capacity is free. Finished work is detected by polling and its capacity
//! is handed to the next pending task.
//!
//! ## Components
//!
//! - **Registry**: pending queue and running set behind one lock
//! - **Concurrency gate**: counting semaphore sized to `max_concurrency`
//! - **Dispatcher loop**: waits for capacity, promotes the head of the queue
//! - **Completion watcher loop**: polls running handles, reclaims capacity
//! - **Lifecycle controller**: pause/resume for the dispatcher, shutdown for both loops
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use priority_gate::builders::SchedulerBuilder;
//! use priority_gate::core::InMemoryEventSink;
//! use priority_gate::runtime::ThreadTask;
//!
//! let events = InMemoryEventSink::new(1024);
//! let scheduler = SchedulerBuilder::new()
//!     .max_concurrency(4)
//!     .poll_interval_ms(100)
//!     .event_sink(events.clone())
//!     .build()?;
//!
//! let job = Arc::new(ThreadTask::new(|cancel| {
//!     while !cancel.wait_timeout(Duration::from_millis(50)) {
//!         // one slice of work
//!     }
//! }));
//! let id = scheduler.admit(job, 10, "export", "nightly export")?;
//!
//! scheduler.pause();
//! scheduler.change_rank(id, 20).ok();
//! scheduler.resume();
//!
//! for task in scheduler.list_all() {
//!     println!("{} {:?} rank={}", task.name, task.status, task.rank);
//! }
//! scheduler.shutdown();
//! ```
//!
//! For complete scenarios, see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: registry, gate, lifecycle and the scheduler itself.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Work handle adapters for OS threads and tokio tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::builders::SchedulerBuilder;
pub use crate::config::SchedulerConfig;
pub use crate::core::{
    CancelToken, HandleKey, Rank, Scheduler, SchedulerError, SchedulerStats, StartOutcome,
    TaskId, TaskSnapshot, TaskStatus, WorkHandle,
};
