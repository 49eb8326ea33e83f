//! `tracing` subscriber setup.
//!
//! Library code only emits events through the `tracing` macros. Binaries and
//! test harnesses that want to see them call [`init_tracing`] once.

/// Default filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "error,arkui_core=info,arkui_components=info";

/// Installs a global formatting subscriber.
///
/// The filter comes from `RUST_LOG` when it parses, otherwise
/// [`DEFAULT_FILTER`]. Calling this more than once is harmless; later calls
/// leave the first subscriber in place.
pub fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
