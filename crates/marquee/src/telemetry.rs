//! Logging bootstrap.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `verbose` forces `debug`; otherwise `RUST_LOG` is honored, falling back to
/// `info`. Returns `false` if a subscriber was already installed.
pub fn init(verbose: bool) -> bool {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
