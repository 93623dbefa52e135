use std::io;
use std::sync::Once;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Default directive applied when `RUST_LOG` is not set.
const DEFAULT_DIRECTIVE: &str = "info";

/// Initializes the global tracing subscriber for a binary.
///
/// Log events are written to stdout through a non-blocking writer. The returned
/// [`WorkerGuard`] flushes buffered events on drop, so hold on to it for the lifetime of
/// the process.
pub fn init_tracing(service_name: &str) -> Result<WorkerGuard, TryInitError> {
    let (writer, guard) = tracing_appender::non_blocking(io::stdout());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(writer))
        .try_init()?;

    info!(service = service_name, "telemetry initialized");

    Ok(guard)
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for tests.
///
/// Safe to call from every test; the subscriber is installed only once and writes through
/// the libtest capture buffer.
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .init();
    });
}
