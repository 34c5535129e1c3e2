//! Tests for builder modules

use priority_gate::builders::SchedulerBuilder;
use priority_gate::config::SchedulerConfig;
use priority_gate::core::{InMemoryEventSink, SchedulerError, TaskAction};
use priority_gate::runtime::ThreadTask;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_scheduler_builder_defaults() {
    let builder = SchedulerBuilder::new();
    assert_eq!(builder.config(), &SchedulerConfig::default());
    assert_eq!(builder.config().max_concurrency, 5);
}

#[test]
fn test_scheduler_builder_setters() {
    let builder = SchedulerBuilder::new()
        .max_concurrency(8)
        .poll_interval_ms(50)
        .idle_backoff_ms(200)
        .start_paused(true);

    let config = builder.config();
    assert_eq!(config.max_concurrency, 8);
    assert_eq!(config.poll_interval_ms, 50);
    assert_eq!(config.idle_backoff_ms, 200);
    assert!(config.start_paused);
}

#[test]
fn test_scheduler_builder_from_config() {
    let config = SchedulerConfig {
        max_concurrency: 2,
        poll_interval_ms: 10,
        idle_backoff_ms: 10,
        start_paused: true,
    };
    let scheduler = SchedulerBuilder::from_config(config)
        .build()
        .expect("valid config");

    let stats = scheduler.stats();
    assert_eq!(stats.max_concurrency, 2);
    assert_eq!(stats.available_slots, 2);
    assert!(stats.paused);
    scheduler.shutdown();
}

#[test]
fn test_scheduler_builder_rejects_invalid_config() {
    let result = SchedulerBuilder::new().max_concurrency(0).build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_scheduler_builder_event_sink() {
    let events = InMemoryEventSink::new(16);
    let scheduler = SchedulerBuilder::new()
        .poll_interval_ms(10)
        .idle_backoff_ms(10)
        .event_sink(events.clone())
        .build()
        .expect("valid config");

    scheduler
        .admit(Arc::new(ThreadTask::new(|_| {})), 1, "quick", "returns at once")
        .expect("admitted");

    let deadline = Instant::now() + Duration::from_secs(5);
    while events.events_with(TaskAction::Completed).is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    scheduler.shutdown();

    let actions: Vec<_> = events.events().into_iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![TaskAction::Admitted, TaskAction::Promoted, TaskAction::Completed]
    );
}
