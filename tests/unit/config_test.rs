//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use priority_gate::config::SchedulerConfig;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_scheduler_config_defaults() {
    let config = SchedulerConfig::default();
    assert_eq!(config.max_concurrency, 5);
    assert_eq!(config.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.idle_backoff(), Duration::from_millis(3000));
    assert!(!config.start_paused);
    assert!(config.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_max_concurrency() {
    let invalid = SchedulerConfig {
        max_concurrency: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_poll_interval() {
    let invalid = SchedulerConfig {
        poll_interval_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_idle_backoff() {
    let invalid = SchedulerConfig {
        idle_backoff_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "max_concurrency": 3,
        "poll_interval_ms": 100,
        "start_paused": true
    }"#;

    let config = SchedulerConfig::from_json_str(json).expect("valid json");
    assert_eq!(config.max_concurrency, 3);
    assert_eq!(config.poll_interval_ms, 100);
    assert_eq!(config.idle_backoff_ms, 3000);
    assert!(config.start_paused);
}

#[test]
fn test_scheduler_config_from_json_rejects_zero_cap() {
    let err = SchedulerConfig::from_json_str(r#"{ "max_concurrency": 0 }"#).unwrap_err();
    assert!(err.contains("max_concurrency"));
}

#[test]
fn test_scheduler_config_from_json_malformed() {
    let err = SchedulerConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_scheduler_config_from_lookup() {
    let config = SchedulerConfig::from_lookup(lookup(&[
        ("PRIORITY_GATE_MAX_CONCURRENCY", "12"),
        ("PRIORITY_GATE_POLL_INTERVAL_MS", " 250 "),
        ("PRIORITY_GATE_START_PAUSED", "true"),
    ]))
    .expect("valid variables");

    assert_eq!(config.max_concurrency, 12);
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(config.idle_backoff_ms, 3000);
    assert!(config.start_paused);
}

#[test]
fn test_scheduler_config_from_lookup_empty_uses_defaults() {
    let config = SchedulerConfig::from_lookup(|_| None).expect("defaults are valid");
    assert_eq!(config, SchedulerConfig::default());
}

#[test]
fn test_scheduler_config_from_lookup_bad_number() {
    let err = SchedulerConfig::from_lookup(lookup(&[("PRIORITY_GATE_MAX_CONCURRENCY", "many")]))
        .unwrap_err();
    assert!(format!("{err:#}").contains("PRIORITY_GATE_MAX_CONCURRENCY"));
}

#[test]
fn test_scheduler_config_from_lookup_zero_is_invalid() {
    let err = SchedulerConfig::from_lookup(lookup(&[("PRIORITY_GATE_POLL_INTERVAL_MS", "0")]))
        .unwrap_err();
    assert!(format!("{err:#}").contains("poll_interval_ms"));
}
