//! Error types for the CLI.

use std::path::PathBuf;
use storyloom_core::StoryloomError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read epic from stdin: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("Failed to parse config TOML {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse RICE inputs {}: {source}", .path.display())]
    RiceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("--capacity is required with --sprint (or set default_capacity in config)")]
    MissingCapacity,
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Engine(#[from] StoryloomError),
}
