//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for a queue service process. Hosts embedding the crate
/// may install their own subscriber; this only installs the env-filtered fmt
/// subscriber when nothing is set yet.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .try_init();
    tracing::debug!("island queue tracing initialized");
}
