//! Dispatcher loop: promote pending work into free capacity.

use tracing::{debug, error, info};

use super::Shared;
use crate::core::audit::{build_task_event, TaskAction};
use crate::core::handle::StartOutcome;
use crate::util::clock::now_ms;

/// What one promotion attempt did.
enum Promotion {
    /// A task moved to running and holds the acquired unit.
    Promoted,
    /// Nothing was pending; the unit was handed back.
    Empty,
    /// The head task failed to start; it was dropped and the unit handed back.
    Failed,
}

pub(super) fn run(shared: &Shared) {
    info!("dispatcher started");
    loop {
        if !shared.lifecycle.wait_until_active() {
            break;
        }
        if shared.gate.acquire().is_err() {
            break;
        }
        // Paused while waiting for a unit: hand it back and park.
        if shared.lifecycle.is_paused() {
            shared.gate.release(1);
            continue;
        }
        match promote_next(shared) {
            Promotion::Promoted | Promotion::Failed => {}
            Promotion::Empty => {
                if !shared.lifecycle.idle(shared.idle_backoff) {
                    break;
                }
            }
        }
    }
    info!("dispatcher stopped");
}

/// Promote the head of the pending queue using the unit the caller holds.
fn promote_next(shared: &Shared) -> Promotion {
    let mut registry = shared.registry.lock();
    let Some(record) = registry.pop_next() else {
        drop(registry);
        shared.gate.release(1);
        return Promotion::Empty;
    };

    match record.handle.start(record.cancel.clone()) {
        Ok(StartOutcome::Started) => {}
        Ok(StartOutcome::AlreadyStarted) => {
            debug!(task_id = %record.id, "handle already started; recording promotion only");
        }
        Err(e) => {
            registry.discard(&record);
            shared.gate.release(1);
            shared.emit(build_task_event(&record.snapshot(), TaskAction::StartFailed));
            drop(registry);
            error!(task_id = %record.id, error = %e, "failed to start task; dropping it");
            return Promotion::Failed;
        }
    }

    let snapshot = registry.push_running(record, now_ms());
    let running = registry.running_len();
    shared.emit(build_task_event(&snapshot, TaskAction::Promoted));
    drop(registry);

    debug!(task_id = %snapshot.id, rank = snapshot.rank, running, "task promoted");
    Promotion::Promoted
}
