//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bike Sync - time-shift synchronization of two bicycle sensor streams
#[derive(Parser, Debug)]
#[command(
    name = "bike-sync",
    author,
    version,
    about = "Bicycle two-stream time-shift synchronization",
    long_about = "Estimates the time shift between the data-acquisition unit (NI) and the\n\
                  inertial unit (VN) of an instrumented bicycle from a calibration bump,\n\
                  and truncates both streams onto a common time base."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BIKE_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BIKE_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "BIKE_SYNC_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize recorded runs
    Sync(SyncArgs),

    /// Write a synthetic bump run
    Simulate(SimulateArgs),

    /// Print the storage schema of a run
    Schema(SchemaArgs),

    /// Validate a sync configuration file
    Validate(ValidateArgs),
}

/// Arguments for the `sync` command
#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    /// Directory holding run files (`*.json`)
    #[arg(short, long, env = "BIKE_SYNC_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Sync configuration (TOML or JSON); defaults are used without one
    #[arg(short, long, env = "BIKE_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override one config field, `SECTION.FIELD=VALUE` (repeatable)
    #[arg(long = "set", value_name = "SECTION.FIELD=VALUE")]
    pub overrides: Vec<String>,

    /// Only synchronize these run ids (repeatable)
    #[arg(short, long = "run")]
    pub runs: Vec<String>,

    /// Directory for `run_<id>.json` reports
    #[arg(short, long, default_value = "synced", env = "BIKE_SYNC_OUTPUT")]
    pub output: PathBuf,

    /// Print per-run results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command
#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Run file to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Run id stored in the file (defaults to the file stem)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Lead of the VN stream over the NI stream (s)
    #[arg(long, default_value = "0.25")]
    pub tau: f64,

    /// Forward speed (m/s)
    #[arg(long, default_value = "3.0")]
    pub speed: f64,

    /// Samples per channel
    #[arg(long, default_value = "6000")]
    pub samples: usize,

    /// Sample rate (Hz)
    #[arg(long, default_value = "200.0")]
    pub rate: f64,

    /// Time of the bump in the NI stream (s)
    #[arg(long, default_value = "5.0")]
    pub bump_at: f64,

    /// Noise amplitude relative to the bump peak
    #[arg(long, default_value = "0.005")]
    pub noise: f64,

    /// Missing VN samples as `START:LEN` (repeatable)
    #[arg(long = "gap", value_parser = parse_gap)]
    pub gaps: Vec<(usize, usize)>,

    /// Random seed
    #[arg(long, default_value = "7")]
    pub seed: u64,
}

/// Arguments for the `schema` command
#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Run file to describe
    #[arg(short, long)]
    pub run: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sync.toml", env = "BIKE_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Override one config field, `SECTION.FIELD=VALUE` (repeatable)
    #[arg(long = "set", value_name = "SECTION.FIELD=VALUE")]
    pub overrides: Vec<String>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// `START:LEN`
fn parse_gap(raw: &str) -> Result<(usize, usize), String> {
    let (start, len) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:LEN, got '{raw}'"))?;
    let start = start
        .trim()
        .parse()
        .map_err(|e| format!("bad gap start '{start}': {e}"))?;
    let len = len
        .trim()
        .parse()
        .map_err(|e| format!("bad gap length '{len}': {e}"))?;
    Ok((start, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gap() {
        assert_eq!(parse_gap("3000:3").unwrap(), (3000, 3));
        assert!(parse_gap("3000").is_err());
        assert!(parse_gap("a:3").is_err());
    }

    #[test]
    fn test_sync_args() {
        let cli = Cli::try_parse_from([
            "bike-sync", "-v", "sync", "--data-dir", "runs", "--run", "00105", "--run", "00106",
            "--set", "search.tau_max_s=0.4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.runs, vec!["00105", "00106"]);
                assert_eq!(args.output, PathBuf::from("synced"));
                assert!(args.config.is_none());
                assert_eq!(args.overrides, vec!["search.tau_max_s=0.4"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_simulate_gaps() {
        let cli = Cli::try_parse_from([
            "bike-sync", "simulate", "-o", "run.json", "--gap", "3000:3", "--gap", "5000:1",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.gaps, vec![(3000, 3), (5000, 1)]);
                assert_eq!(args.tau, 0.25);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["bike-sync", "-q", "-v", "validate"]).is_err());
    }
}
