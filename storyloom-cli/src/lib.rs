//! STORYLOOM CLI - Command-line front end for the backlog planner
//!
//! Reads an epic document, plans the backlog, optionally reorders it by RICE
//! score and allocates a sprint, then renders the report.

pub mod args;
pub mod config;
pub mod error;
pub mod render;
pub mod telemetry;

pub use args::{Cli, OutputFormat, StrategyArg};
pub use error::CliError;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use storyloom_backlog::{reorder_backlog, BacklogPlanner, RiceInput};
use storyloom_core::{BacklogReport, Epic};
use storyloom_sprint::SprintAllocator;

/// Execute one invocation and return the rendered output.
pub fn run(cli: &Cli, stdin: &mut dyn Read) -> Result<String, CliError> {
    let config = config::load(cli)?;
    let input = read_epic(cli.file.as_deref(), stdin)?;
    let epic = Epic::from_json(&input)?;

    let mut backlog = BacklogPlanner::new(&config)?.plan(&epic)?;
    if let Some(path) = &cli.rice {
        let inputs = read_rice(path)?;
        backlog = reorder_backlog(&backlog, &inputs)?;
    }

    let plan = if cli.sprint {
        let capacity = cli
            .capacity
            .or(config.default_capacity.map(i64::from))
            .ok_or(CliError::MissingCapacity)?;
        Some(SprintAllocator::new(&config)?.allocate(&backlog, capacity)?)
    } else {
        None
    };

    let report = BacklogReport::new(&backlog, plan.as_ref());
    render::render(&report, cli.output)
}

fn read_epic(path: Option<&Path>, stdin: &mut dyn Read) -> Result<String, CliError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).map_err(CliError::Stdin)?;
            Ok(buf)
        }
    }
}

fn read_rice(path: &Path) -> Result<BTreeMap<String, RiceInput>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::RiceParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloom_core::{StoryloomError, ValidationError};

    const DASHBOARD: &str =
        r#"{"name":"User Dashboard","personas":["end_user"],"scope":["View metrics","Export data"]}"#;

    fn run_with(cli: Cli, input: &str) -> Result<String, CliError> {
        run(&cli, &mut input.as_bytes())
    }

    #[test]
    fn test_reads_epic_from_stdin() {
        let out = run_with(
            Cli {
                output: OutputFormat::Json,
                ..Cli::default()
            },
            DASHBOARD,
        )
        .unwrap();
        let report: BacklogReport = serde_json::from_str(&out).unwrap();
        assert_eq!(report.metadata.total_stories, 2);
        assert!(report.sprint.is_none());
    }

    #[test]
    fn test_sprint_requires_capacity() {
        let cli = Cli {
            sprint: true,
            ..Cli::default()
        };
        assert!(matches!(run_with(cli, DASHBOARD), Err(CliError::MissingCapacity)));
    }

    #[test]
    fn test_non_positive_capacity_is_engine_error() {
        let cli = Cli {
            sprint: true,
            capacity: Some(0),
            ..Cli::default()
        };
        assert!(matches!(
            run_with(cli, DASHBOARD),
            Err(CliError::Engine(StoryloomError::Validation(
                ValidationError::InvalidValue { .. }
            )))
        ));
    }

    #[test]
    fn test_malformed_epic_is_engine_error() {
        assert!(matches!(
            run_with(Cli::default(), "{not json"),
            Err(CliError::Engine(StoryloomError::Validation(
                ValidationError::MalformedEpic { .. }
            )))
        ));
    }

    #[test]
    fn test_missing_epic_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            file: Some(dir.path().join("missing.json")),
            ..Cli::default()
        };
        assert!(matches!(run_with(cli, ""), Err(CliError::Read { .. })));
    }

    #[test]
    fn test_invalid_stretch_flag_is_config_error() {
        let cli = Cli {
            stretch_ratio: Some(90),
            ..Cli::default()
        };
        assert!(matches!(
            run_with(cli, DASHBOARD),
            Err(CliError::Engine(StoryloomError::Config(_)))
        ));
    }
}
