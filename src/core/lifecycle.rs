//! Pause/resume control for the dispatcher, plus the shutdown signal both
//! background loops wait on.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct LifecycleState {
    suspended: bool,
    shutdown: bool,
    /// Set when new work is admitted so an idling dispatcher looks again.
    nudged: bool,
}

/// Dispatcher state machine: Active or Suspended, until shut down.
///
/// Has its own lock so that pausing never waits on registry traffic.
pub struct Lifecycle {
    state: Mutex<LifecycleState>,
    condvar: Condvar,
}

impl Lifecycle {
    /// Create a controller, optionally starting suspended.
    #[must_use]
    pub fn new(start_paused: bool) -> Self {
        Self {
            state: Mutex::new(LifecycleState {
                suspended: start_paused,
                shutdown: false,
                nudged: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Stop promoting new work. Idempotent.
    pub fn pause(&self) {
        self.state.lock().suspended = true;
    }

    /// Resume promotions and wake the dispatcher. Idempotent.
    pub fn resume(&self) {
        self.state.lock().suspended = false;
        self.condvar.notify_all();
    }

    /// Whether promotions are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state.lock().suspended
    }

    /// Signal both loops to exit.
    pub fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.condvar.notify_all();
    }

    /// Whether [`Self::shutdown`] has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    /// Tell an idling dispatcher that new work is waiting.
    pub fn nudge(&self) {
        self.state.lock().nudged = true;
        self.condvar.notify_all();
    }

    /// Block while suspended. Returns `false` if shut down.
    pub fn wait_until_active(&self) -> bool {
        let mut state = self.state.lock();
        while state.suspended && !state.shutdown {
            self.condvar.wait(&mut state);
        }
        !state.shutdown
    }

    /// Dispatcher backoff after finding the queue empty. Ends early on a
    /// nudge or shutdown. Returns `false` if shut down.
    pub fn idle(&self, backoff: Duration) -> bool {
        let deadline = Instant::now() + backoff;
        let mut state = self.state.lock();
        while !state.nudged && !state.shutdown {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.nudged = false;
        !state.shutdown
    }

    /// Watcher sleep between polls. Ends early only on shutdown. Returns
    /// `false` if shut down.
    pub fn sleep(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        let mut state = self.state.lock();
        while !state.shutdown {
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        !state.shutdown
    }
}
