//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `[logging].filter`. Output goes to
/// stderr so CLI command output on stdout stays clean.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // No subscriber of ours is installed on failure, so report directly.
    if let Err(e) = result {
        eprintln!("tracing init failed: {}", e);
    }
}
