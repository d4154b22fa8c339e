use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for a ledgersync binary.
///
/// Filter precedence: `RUST_LOG`, then `LOG_LEVEL`, then `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}
