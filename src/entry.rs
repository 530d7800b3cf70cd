use clap::Parser;

use crate::app::{run_compare, run_single, run_suite};
use crate::args::{Cli, Command};
use crate::error::AppResult;
use crate::logger::init_logging;

/// Parses the command line, installs logging, and drives the selected
/// command on a multi-threaded runtime.
///
/// # Errors
///
/// Returns the command's error, or an error when the runtime cannot be built.
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&cli))
}

async fn run_async(cli: &Cli) -> AppResult<()> {
    match &cli.command {
        Command::Run(args) => run_single(args, cli.no_color).await,
        Command::Compare(args) => run_compare(args).await,
        Command::Suite(args) => run_suite(args, cli.no_color).await,
    }
}
