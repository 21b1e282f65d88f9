//! Logging initialization.
//!
//! Diagnostics meant for the user are printed directly to stderr; this module
//! only sets up `tracing` for developer logs. They go to stderr as well, are
//! off below `warn` by default and are controlled by the `PGSH_LOG` variable:
//! - `PGSH_LOG=debug` - process group and terminal hand-offs
//! - `PGSH_LOG=warn` - tolerated failures only (default)

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "PGSH_LOG";

/// Initialize the global subscriber. Call once, before the session starts.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
