//! Completion watcher loop: evict finished tasks and reclaim their capacity.

use tracing::{debug, info};

use super::Shared;
use crate::core::audit::{build_task_event, TaskAction, TaskEvent};

pub(super) fn run(shared: &Shared) {
    info!(
        poll_interval_ms = u64::try_from(shared.poll_interval.as_millis()).unwrap_or(u64::MAX),
        "completion watcher started"
    );
    loop {
        reap_finished(shared);
        if !shared.lifecycle.sleep(shared.poll_interval) {
            break;
        }
    }
    info!("completion watcher stopped");
}

/// One polling cycle.
fn reap_finished(shared: &Shared) {
    let completed: Vec<TaskEvent> = {
        let mut registry = shared.registry.lock();
        let finished = registry.take_finished();
        // Same critical section as the eviction, so running + free never
        // exceeds the cap.
        shared.gate.release(finished.len());
        finished
            .iter()
            .map(|record| {
                let event = build_task_event(&record.snapshot(), TaskAction::Completed);
                shared.emit(event.clone());
                event
            })
            .collect()
    };

    for event in &completed {
        debug!(
            task_id = %event.task_id,
            name = %event.name,
            rank = event.rank,
            created_at_ms = %event.created_at_ms,
            started_at_ms = ?event.started_at_ms,
            finished_at_ms = %event.recorded_at_ms,
            description = %event.description,
            "task completed"
        );
    }
}
