use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Open-loop HTTP load tester that samples the resource usage of a Docker container under test."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to debug unless overridden by LOADSHIP_LOG/RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run one load test against a URL
    Run(RunArgs),
    /// Compare a baseline result file against one or more test result files
    Compare(CompareArgs),
    /// Run every load test of a suite file in sequence
    Suite(SuiteArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Target URL (http or https)
    #[arg(value_name = "TARGET_URL")]
    pub url: String,

    /// Duration of the load test (supports ms/s/m/h)
    #[arg(long, short, default_value = "30s", value_parser = parse_duration_arg)]
    pub duration: Duration,

    /// Number of concurrent connections
    #[arg(long, short, default_value = "10", value_parser = parse_positive_usize)]
    pub connections: PositiveUsize,

    /// Docker container name or id to monitor
    #[arg(long)]
    pub container: Option<String>,

    /// Write the full results to this JSON file
    #[arg(long, short = 'j', value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Baseline result file (.json)
    pub baseline: PathBuf,

    /// Result files to compare against the baseline (.json)
    #[arg(required = true)]
    pub tests: Vec<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SuiteArgs {
    /// Suite file (.toml or .json)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}
