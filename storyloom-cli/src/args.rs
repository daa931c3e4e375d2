//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;
use storyloom_core::AllocationStrategy;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Backlog report document
    Json,
    /// One row per story
    Csv,
}

/// Sprint allocation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    /// Single pass in priority order (default)
    Greedy,
    /// Knapsack packing that maximizes committed points
    Optimal,
}

impl From<StrategyArg> for AllocationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => AllocationStrategy::Greedy,
            StrategyArg::Optimal => AllocationStrategy::Optimal,
        }
    }
}

/// Decompose an epic into a prioritized backlog and optionally plan a sprint.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "storyloom", version)]
pub struct Cli {
    /// Epic JSON document. Read from stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Allocate a sprint from the generated backlog.
    #[arg(long, default_value_t = false)]
    pub sprint: bool,

    /// Sprint capacity in story points.
    #[arg(long, value_name = "POINTS", allow_negative_numbers = true)]
    pub capacity: Option<i64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Sprint allocation mode.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Ceiling for committed + stretch points, as a percentage of capacity.
    #[arg(long = "stretch-ratio", value_name = "PERCENT")]
    pub stretch_ratio: Option<u32>,

    /// JSON map of story id to RICE inputs, applied before allocation.
    #[arg(long, value_name = "FILE")]
    pub rice: Option<PathBuf>,

    /// Planner configuration TOML. Falls back to STORYLOOM_CONFIG.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long = "log-json", default_value_t = false)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["storyloom"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.sprint);
        assert!(cli.file.is_none());
        assert!(cli.strategy.is_none());
    }

    #[test]
    fn test_full_flag_set() {
        let cli = Cli::try_parse_from([
            "storyloom",
            "--file",
            "epic.json",
            "--sprint",
            "--capacity",
            "13",
            "--output",
            "csv",
            "--strategy",
            "optimal",
            "--stretch-ratio",
            "150",
            "--rice",
            "rice.json",
            "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.capacity, Some(13));
        assert_eq!(cli.output, OutputFormat::Csv);
        assert_eq!(cli.strategy.map(AllocationStrategy::from), Some(AllocationStrategy::Optimal));
        assert_eq!(cli.stretch_ratio, Some(150));
        assert!(cli.log_json);
    }

    #[test]
    fn test_negative_capacity_parses() {
        let cli = Cli::try_parse_from(["storyloom", "--sprint", "--capacity", "-3"]).unwrap();
        assert_eq!(cli.capacity, Some(-3));
    }

    #[test]
    fn test_unknown_output_is_rejected() {
        assert!(Cli::try_parse_from(["storyloom", "--output", "yaml"]).is_err());
    }
}
