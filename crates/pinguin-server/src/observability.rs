use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber. `RUST_LOG` takes precedence
/// over `level` when set.
pub fn init_tracing(level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry().with(filter).with(fmt::layer()).try_init();
}

pub fn shutdown_tracing() {
    // No-op: nothing to flush, kept symmetrical with init_tracing for callers.
}
