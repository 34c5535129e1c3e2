//! Tests for tokio-backed work handles

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use priority_gate::builders::SchedulerBuilder;
use priority_gate::core::{CancelToken, StartOutcome, WorkHandle};
use priority_gate::runtime::TokioTask;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_task_runs_once() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let task = TokioTask::current(move |_cancel| async move {
        tx.send(123).expect("receiver alive");
    })
    .expect("inside a runtime");

    assert!(!task.is_alive());
    assert_eq!(task.start(CancelToken::new()), Ok(StartOutcome::Started));
    assert_eq!(task.start(CancelToken::new()), Ok(StartOutcome::AlreadyStarted));

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_task_current_outside_runtime() {
    let result = TokioTask::current(|_cancel| async {});
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduler_drives_tokio_tasks() {
    let scheduler = SchedulerBuilder::new()
        .max_concurrency(2)
        .poll_interval_ms(10)
        .idle_backoff_ms(10)
        .build()
        .expect("valid config");

    let done = Arc::new(AtomicUsize::new(0));
    for i in 0..4 {
        let done = Arc::clone(&done);
        let task = TokioTask::current(move |_cancel| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            done.fetch_add(1, Ordering::SeqCst);
        })
        .expect("inside a runtime");
        scheduler
            .admit(Arc::new(task), i, format!("job-{i}"), "async job")
            .expect("admitted");
    }

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        let stats = scheduler.stats();
        if done.load(Ordering::SeqCst) == 4 && stats.running == 0 && stats.pending == 0 {
            break;
        }
        assert!(stats.running <= 2);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(done.load(Ordering::SeqCst), 4);
    let stats = scheduler.stats();
    assert_eq!(stats.running, 0);
    assert_eq!(stats.available_slots, 2);
    tokio::task::spawn_blocking(move || scheduler.shutdown())
        .await
        .expect("shutdown joined");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_removing_tokio_task_aborts_it() {
    let scheduler = SchedulerBuilder::new()
        .max_concurrency(1)
        .poll_interval_ms(10)
        .idle_backoff_ms(10)
        .build()
        .expect("valid config");

    let task = Arc::new(
        TokioTask::current(|_cancel| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        })
        .expect("inside a runtime"),
    );
    let id = scheduler
        .admit(task.clone(), 0, "sleeper", "sleeps for a minute")
        .expect("admitted");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while scheduler.list_running().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    scheduler.remove(id).expect("running task removed");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while task.is_alive() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!task.is_alive());
    assert_eq!(scheduler.stats().available_slots, 1);
    tokio::task::spawn_blocking(move || scheduler.shutdown())
        .await
        .expect("shutdown joined");
}
