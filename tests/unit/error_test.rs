//! Tests for error types

use priority_gate::core::{HandleKey, SchedulerError};
use uuid::Uuid;

#[test]
fn test_duplicate_handle_error() {
    let key = HandleKey::from_uuid(Uuid::nil());
    let err = SchedulerError::DuplicateHandle(key);
    assert_eq!(
        format!("{}", err),
        "handle already admitted: 00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("max_concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: max_concurrency must be greater than 0"
    );
}

#[test]
fn test_shutting_down_error() {
    let err = SchedulerError::ShuttingDown;
    assert_eq!(format!("{}", err), "scheduler is shutting down");
}

#[test]
fn test_spawn_error() {
    let err = SchedulerError::Spawn("resource temporarily unavailable".to_string());
    assert_eq!(format!("{}", err), "spawn failed: resource temporarily unavailable");
}
