//! Logging initialization for the apidoc binary.
//!
//! Diagnostics go to STDERR so STDOUT stays clean for command output.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` is honoured unless `verbose` forces debug output. Calling
/// this twice is harmless; the second subscriber is ignored.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
