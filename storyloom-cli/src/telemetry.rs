//! Logging setup.
//!
//! Logs go to stderr so stdout carries only the rendered report.

use crate::error::CliError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter. `RUST_LOG` is the fallback.
pub const LOG_ENV: &str = "STORYLOOM_LOG";

/// Filter used when neither variable is set.
pub const DEFAULT_FILTER: &str = "warn";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
pub fn init(json: bool) -> Result<(), CliError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| CliError::Telemetry(e.to_string()))
}
