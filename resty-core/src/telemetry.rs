use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,resty=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialise the global `tracing` subscriber with a standard `fmt` layer.
///
/// Respects the `RUST_LOG` environment variable. Falls back to
/// `info,resty=debug` when `RUST_LOG` is not set.
///
/// Call this once, at the very start of `main`. Panics if a global subscriber
/// is already installed; use [`try_init_tracing`] where that can happen.
pub fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Like [`init_tracing`], but returns an error instead of panicking when a
/// global subscriber is already installed (e.g. across tests).
pub fn try_init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
}
