//! The collaborator contract every unit of work implements.

use super::cancel::CancelToken;
use super::error::SchedulerError;
use super::task::HandleKey;

/// Result of asking a handle to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Execution began with this call.
    Started,
    /// The handle was already running or done; nothing was started.
    AlreadyStarted,
}

/// An externally owned unit of work the scheduler starts, observes and may
/// advise to stop.
///
/// The scheduler never drives the work itself. It calls [`WorkHandle::start`]
/// once the task is promoted, polls [`WorkHandle::is_alive`] from the
/// completion watcher, and on removal cancels the token and calls
/// [`WorkHandle::request_interrupt`].
///
/// # Example
///
/// ```rust,ignore
/// use priority_gate::core::{CancelToken, HandleKey, SchedulerError, StartOutcome, WorkHandle};
///
/// struct Probe {
///     key: HandleKey,
///     alive: AtomicBool,
/// }
///
/// impl WorkHandle for Probe {
///     fn key(&self) -> HandleKey {
///         self.key
///     }
///
///     fn start(&self, _cancel: CancelToken) -> Result<StartOutcome, SchedulerError> {
///         if self.alive.swap(true, Ordering::AcqRel) {
///             return Ok(StartOutcome::AlreadyStarted);
///         }
///         Ok(StartOutcome::Started)
///     }
///
///     fn is_alive(&self) -> bool {
///         self.alive.load(Ordering::Acquire)
///     }
/// }
/// ```
pub trait WorkHandle: Send + Sync + 'static {
    /// Stable identity of this handle. Two admissions with the same key are
    /// the same work.
    fn key(&self) -> HandleKey;

    /// Begin execution. Must be idempotent: a handle that has already begun
    /// returns [`StartOutcome::AlreadyStarted`].
    ///
    /// Called while the scheduler holds its registry lock, so it should hand
    /// the work off (spawn) rather than run it inline.
    ///
    /// # Errors
    ///
    /// Returns an error if the work could not be launched at all; the
    /// scheduler then drops the task and reclaims its capacity.
    fn start(&self, cancel: CancelToken) -> Result<StartOutcome, SchedulerError>;

    /// Whether the work is still executing.
    fn is_alive(&self) -> bool;

    /// Advisory stop request. The token passed to `start` is cancelled before
    /// this is called; override to add handle-specific signalling.
    fn request_interrupt(&self) {}
}
