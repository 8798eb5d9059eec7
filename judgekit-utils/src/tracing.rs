use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: pretty events, `RUST_LOG` filtering, span traces for errors.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn setup_tracing() {
    if let Err(err) = try_setup_tracing() {
        panic!("failed to install tracing subscriber: {}", err);
    }
}

/// Same as [`setup_tracing`], but reports an already installed subscriber instead of panicking.
/// Tests call this once per process.
pub fn try_setup_tracing() -> Result<(), TryInitError> {
    tracing_subscriber::fmt()
        .event_format(fmt::format::Format::default().pretty())
        .with_env_filter(EnvFilter::from_default_env())
        .with_timer(fmt::time::ChronoLocal::rfc3339())
        .finish()
        .with(ErrorLayer::default())
        .try_init()
}
