//! Tests for utility functions

use std::thread;
use std::time::Duration;

use priority_gate::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_advances() {
    let before = now_ms();
    thread::sleep(Duration::from_millis(5));
    let after = now_ms();
    assert!(after >= before + 5);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialised twice without panicking");
}
