//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber once per process
//! - Resolve the filter from the command line or `FUNCTIONS_LOG`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV_VAR: &str = "FUNCTIONS_LOG";

const DEFAULT_FILTER: &str = "info";

/// Build the filter from `directive`, falling back to `info` when it does not parse.
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter '{}': {}, using '{}'", directive, e, DEFAULT_FILTER);
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init(directive: &str) {
    let installed = tracing_subscriber::registry()
        .with(filter(directive))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
