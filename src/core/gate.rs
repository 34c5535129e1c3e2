//! Counting gate that bounds how many tasks run at once.

use parking_lot::{Condvar, Mutex};

use super::error::SchedulerError;

struct GateState {
    available: usize,
    closed: bool,
}

/// Counting semaphore sized to the scheduler's concurrency cap.
///
/// Units are taken by the dispatcher before a promotion and handed back by
/// the completion watcher, by `remove` on a running task, or by the
/// dispatcher itself when it found nothing to promote. The internal mutex is
/// a leaf lock: it is never held while another lock is acquired.
pub struct ConcurrencyGate {
    capacity: usize,
    state: Mutex<GateState>,
    condvar: Condvar,
}

impl ConcurrencyGate {
    /// Create a gate with `capacity` free units.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(GateState {
                available: capacity,
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Block until a unit is free and take it.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ShuttingDown`] once the gate has been closed, including
    /// for callers that were already waiting.
    pub fn acquire(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        while state.available == 0 && !state.closed {
            self.condvar.wait(&mut state);
        }
        if state.closed {
            return Err(SchedulerError::ShuttingDown);
        }
        state.available -= 1;
        Ok(())
    }

    /// Take a unit if one is free right now.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.available == 0 {
            return false;
        }
        state.available -= 1;
        true
    }

    /// Return `n` units.
    ///
    /// Returning more units than were taken would break the concurrency cap,
    /// so the count is clamped at capacity and the surplus is logged.
    pub fn release(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut state = self.state.lock();
        let target = state.available + n;
        if target > self.capacity {
            tracing::error!(
                released = n,
                available = state.available,
                capacity = self.capacity,
                "gate over-release; clamping to capacity"
            );
        }
        state.available = target.min(self.capacity);
        drop(state);
        if n == 1 {
            self.condvar.notify_one();
        } else {
            self.condvar.notify_all();
        }
    }

    /// Units currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state.lock().available
    }

    /// Total units.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Close the gate and wake every waiter. Irreversible.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.condvar.notify_all();
    }

    /// Whether [`Self::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
