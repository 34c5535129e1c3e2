//! Fluent construction of a [`Scheduler`].

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{EventSink, Scheduler, SchedulerError};

/// Builder for [`Scheduler`], starting from [`SchedulerConfig::default`].
#[derive(Clone, Default)]
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    events: Option<Arc<dyn EventSink>>,
}

impl SchedulerBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    #[must_use]
    pub fn from_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    /// Set the concurrency cap.
    #[must_use]
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the completion watcher interval in milliseconds.
    #[must_use]
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.config.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the dispatcher idle backoff in milliseconds.
    #[must_use]
    pub fn idle_backoff_ms(mut self, idle_backoff_ms: u64) -> Self {
        self.config.idle_backoff_ms = idle_backoff_ms;
        self
    }

    /// Start with promotions suspended.
    #[must_use]
    pub fn start_paused(mut self, start_paused: bool) -> Self {
        self.config.start_paused = start_paused;
        self
    }

    /// Report task transitions to `sink`.
    #[must_use]
    pub fn event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Some(Arc::new(sink));
        self
    }

    /// The configuration built so far.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Validate and start the scheduler.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::new`].
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        Scheduler::with_event_sink(self.config, self.events)
    }
}
