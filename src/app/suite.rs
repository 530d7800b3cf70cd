use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::args::SuiteArgs;
use crate::config::{SuitePlan, load_suite_config};
use crate::domain::TestWindow;
use crate::error::AppResult;
use crate::orchestrator::RunOptions;

use super::run::{execute_window, persist_output};
use super::summary::print_summary;

/// How a suite ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SuiteOutcome {
    pub(super) directory: PathBuf,
    pub(super) saved: Vec<PathBuf>,
    pub(super) failed: usize,
    pub(super) interrupted: bool,
}

pub(crate) async fn run_suite(args: &SuiteArgs, no_color: bool) -> AppResult<()> {
    let plan = load_suite_config(&args.config)?.validate()?;
    let options = RunOptions {
        progress: true,
        no_color,
        handle_signals: true,
    };

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handle = Arc::clone(&stop);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop_handle.store(true, Ordering::SeqCst);
        }
    });

    let outcome = execute_suite(&plan, Path::new("."), Utc::now(), options, &stop).await;
    interrupt.abort();
    let outcome = outcome?;

    println!(
        "Suite '{}' finished: {} saved, {} failed. Results in {}",
        plan.name,
        outcome.saved.len(),
        outcome.failed,
        outcome.directory.display()
    );
    Ok(())
}

/// Runs every planned window in order under `base`.
///
/// A failing run is logged and skipped. Setting `stop` ends the suite after
/// the current run.
pub(super) async fn execute_suite(
    plan: &SuitePlan,
    base: &Path,
    started_at: DateTime<Utc>,
    options: RunOptions,
    stop: &AtomicBool,
) -> AppResult<SuiteOutcome> {
    let windows = plan
        .runs
        .iter()
        .map(|run| {
            TestWindow::new(
                &plan.url,
                plan.container.clone(),
                run.connections,
                run.duration,
            )
        })
        .collect::<AppResult<Vec<_>>>()?;

    let directory = base.join(suite_directory_name(&plan.name, started_at));
    tokio::fs::create_dir_all(&directory).await?;
    info!(
        "Running suite '{}' with {} runs into {}",
        plan.name,
        windows.len(),
        directory.display()
    );

    let mut outcome = SuiteOutcome {
        directory,
        saved: Vec::new(),
        failed: 0,
        interrupted: false,
    };
    let total = windows.len();
    for (offset, (window, run)) in windows.into_iter().zip(&plan.runs).enumerate() {
        let number = offset.saturating_add(1);
        if stop.load(Ordering::SeqCst) {
            warn!("Suite interrupted before run {}.", number);
            outcome.interrupted = true;
            break;
        }
        println!(
            "Run {}/{}: {} connections for {:?}",
            number,
            total,
            run.connections,
            run.duration
        );

        match execute_window(window, options).await {
            Ok(output) => {
                print_summary(&output.metadata, &output.summary);
                let path = outcome.directory.join(run.file_name(number));
                match persist_output(&output, &path).await {
                    Ok(saved) => outcome.saved.push(saved),
                    Err(err) => {
                        error!("Failed to save run {}: {}", number, err);
                        outcome.failed = outcome.failed.saturating_add(1);
                    }
                }
            }
            Err(err) => {
                error!("Run {} failed: {}", number, err);
                outcome.failed = outcome.failed.saturating_add(1);
            }
        }

        if stop.load(Ordering::SeqCst) {
            warn!("Suite interrupted after run {}.", number);
            outcome.interrupted = true;
            break;
        }
        if number < total && !plan.cooldown.is_zero() {
            info!("Cooling down for {:?}.", plan.cooldown);
            tokio::time::sleep(plan.cooldown).await;
        }
    }
    Ok(outcome)
}

/// `suite_<name>_<YYYYMMDD_HHMMSS>`, with path-hostile characters replaced.
pub(super) fn suite_directory_name(name: &str, started_at: DateTime<Utc>) -> String {
    let safe: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    format!("suite_{}_{}", safe, started_at.format("%Y%m%d_%H%M%S"))
}
