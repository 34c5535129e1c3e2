//! Ready-made [`crate::core::WorkHandle`] implementations.

pub mod thread_task;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_task;

pub use thread_task::ThreadTask;
#[cfg(feature = "tokio-runtime")]
pub use tokio_task::TokioTask;
