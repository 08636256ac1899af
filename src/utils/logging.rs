//! Process-wide tracing setup
//!
//! Call [`init_logging`] once at process start, before any pipeline work.
//! Library code only emits `tracing` events; without an installed
//! subscriber (e.g. in tests) those events are discarded.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. `quiet` lowers the default to
/// warnings. Calling this twice leaves the first subscriber in place.
pub fn init_logging(level: &str, quiet: bool) {
    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    // Logs go to stderr so progress output and tables on stdout stay clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
