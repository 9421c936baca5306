//! Logging configuration for pgscript.
//!
//! Logs always go to stderr so they never interleave with result tables on
//! stdout.

use tracing_subscriber::EnvFilter;

/// Returns the filter used when `RUST_LOG` is not set.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity given on the command line.
pub fn init_stderr_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
