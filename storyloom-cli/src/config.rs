//! Configuration loading for the CLI.
//!
//! Precedence, lowest first: defaults, TOML file (`--config` or
//! `STORYLOOM_CONFIG`), `STORYLOOM_*` environment variables, command-line
//! flags. The merged configuration is validated before use.

use crate::args::Cli;
use crate::error::CliError;
use std::path::{Path, PathBuf};
use storyloom_core::PlannerConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "STORYLOOM_CONFIG";

/// Read a planner configuration from a TOML file.
pub fn from_path(path: &Path) -> Result<PlannerConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the effective configuration for a CLI invocation.
pub fn load(cli: &Cli) -> Result<PlannerConfig, CliError> {
    let path = cli.config.clone().or_else(config_path_from_env);
    let base = match &path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config file");
            from_path(path)?
        }
        None => PlannerConfig::default(),
    };

    let config = apply_flags(base.with_env_overrides(), cli);
    config.validate()?;
    Ok(config)
}

/// Apply command-line overrides.
pub fn apply_flags(mut config: PlannerConfig, cli: &Cli) -> PlannerConfig {
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
    }
    if let Some(ratio) = cli.stretch_ratio {
        config.stretch_ratio_percent = ratio;
    }
    config
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV).ok().map(PathBuf::from)
}
