//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for the scheduler. Applications can install their own
/// subscriber; this helper installs a default env-filtered fmt subscriber only
/// if none is set yet (`RUST_LOG=priority_gate=debug` shows every transition).
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}
