//! Logging initialization utilities.

use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging, filtered by `RUST_LOG` or `default_directive` when unset.
///
/// Logs are written to stderr so stdout only carries program output.
/// Calling this more than once is a no-op.
pub fn init_logging(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}
