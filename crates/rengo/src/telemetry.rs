//! Logging setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a `tracing` subscriber that writes human-readable lines to
/// stderr.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once (or after another subscriber was installed) does nothing.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
