//! Tests for task event sinks

use std::sync::Arc;

use priority_gate::core::{
    build_task_event, ChannelEventSink, EventSink, InMemoryEventSink, Registry, TaskAction,
    TaskSnapshot,
};
use priority_gate::runtime::ThreadTask;

fn snapshot(name: &str, rank: i32) -> TaskSnapshot {
    let mut registry = Registry::new();
    let id = registry
        .admit(
            Arc::new(ThreadTask::new(|_| {})),
            rank,
            name.to_string(),
            format!("{name} description"),
            1_000,
        )
        .expect("fresh handle");
    registry.get(id).expect("admitted task")
}

#[test]
fn test_in_memory_event_sink() {
    let sink = InMemoryEventSink::new(10);
    let task = snapshot("export", 3);

    sink.record(build_task_event(&task, TaskAction::Admitted));
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].task_id, task.id);
    assert_eq!(events[0].name, "export");
    assert_eq!(events[0].action, TaskAction::Admitted);
}

#[test]
fn test_event_sink_overflow() {
    let sink = InMemoryEventSink::new(2);

    let first = snapshot("first", 1);
    let second = snapshot("second", 1);
    let third = snapshot("third", 1);
    sink.record(build_task_event(&first, TaskAction::Admitted));
    sink.record(build_task_event(&second, TaskAction::Admitted));
    sink.record(build_task_event(&third, TaskAction::Admitted));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].task_id, second.id); // First one popped
    assert_eq!(events[1].task_id, third.id);
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let sink = InMemoryEventSink::new(0);
    sink.record(build_task_event(&snapshot("dropped", 0), TaskAction::Admitted));
    assert!(sink.events().is_empty());
}

#[test]
fn test_clones_share_the_buffer() {
    let sink = InMemoryEventSink::new(10);
    let reader = sink.clone();
    let task = snapshot("shared", 0);

    sink.record(build_task_event(&task, TaskAction::Admitted));
    sink.record(build_task_event(&task, TaskAction::Removed));

    assert_eq!(reader.events().len(), 2);
    assert_eq!(reader.events_with(TaskAction::Removed).len(), 1);
    assert!(reader.events_with(TaskAction::Completed).is_empty());
}

#[test]
fn test_build_task_event() {
    let task = snapshot("reindex", 7);
    let event = build_task_event(&task, TaskAction::Reranked);

    assert_eq!(event.task_id, task.id);
    assert_eq!(event.name, "reindex");
    assert_eq!(event.description, "reindex description");
    assert_eq!(event.rank, 7);
    assert_eq!(event.action, TaskAction::Reranked);
    assert_eq!(event.created_at_ms, 1_000);
    assert_eq!(event.started_at_ms, None);
    assert_eq!(event.run_time_ms(), None);
    assert!(event.recorded_at_ms > 0);
}

#[test]
fn test_run_time_from_promotion() {
    let task = snapshot("batch", 0);
    let mut event = build_task_event(&task, TaskAction::Completed);
    event.started_at_ms = Some(event.recorded_at_ms - 250);
    assert_eq!(event.run_time_ms(), Some(250));
}

#[test]
fn test_channel_event_sink() {
    let (sink, rx) = ChannelEventSink::new();
    let task = snapshot("notify", 2);

    sink.record(build_task_event(&task, TaskAction::Promoted));
    sink.record(build_task_event(&task, TaskAction::Completed));

    let actions: Vec<_> = rx.try_iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![TaskAction::Promoted, TaskAction::Completed]);
}

#[test]
fn test_channel_sink_survives_dropped_receiver() {
    let (sink, rx) = ChannelEventSink::new();
    drop(rx);
    sink.record(build_task_event(&snapshot("orphan", 0), TaskAction::Admitted));
}

#[test]
fn test_event_serializes_action_in_snake_case() {
    let event = build_task_event(&snapshot("json", 0), TaskAction::StartFailed);
    let json = serde_json::to_value(&event).expect("serialize event");
    assert_eq!(json["action"], "start_failed");
    assert_eq!(json["name"], "json");
}
