use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::args::RunArgs;
use crate::domain::TestWindow;
use crate::error::AppResult;
use crate::metrics::calculate;
use crate::orchestrator::{Orchestrator, RunOptions};
use crate::output::{RunMetadata, RunOutput};

use super::summary::print_summary;

pub(crate) async fn run_single(args: &RunArgs, no_color: bool) -> AppResult<()> {
    let window = TestWindow::new(
        &args.url,
        args.container.clone(),
        args.connections.as_non_zero(),
        args.duration,
    )?;
    let options = RunOptions {
        progress: !args.no_progress,
        no_color,
        handle_signals: true,
    };

    let output = execute_window(window, options).await?;
    print_summary(&output.metadata, &output.summary);

    if let Some(path) = args.json.as_deref() {
        let saved = persist_output(&output, path).await?;
        println!("Results saved to {}", saved.display());
    }
    Ok(())
}

/// Runs one window end to end and bundles everything worth persisting.
pub(super) async fn execute_window(window: TestWindow, options: RunOptions) -> AppResult<RunOutput> {
    let timestamp = Utc::now();
    let mut orchestrator = Orchestrator::new(window).with_options(options);
    let records = orchestrator.run().await?;

    let window = orchestrator.window();
    let summary = calculate(&records.requests, &records.samples, window.duration())?;
    Ok(RunOutput {
        metadata: RunMetadata::from_window(window, timestamp),
        http_stats: records.requests,
        docker_stats: records.samples,
        summary,
    })
}

/// Writes the run unit and returns its absolute path.
pub(super) async fn persist_output(output: &RunOutput, path: &Path) -> AppResult<PathBuf> {
    output.save_to_file(path).await?;
    let saved = tokio::fs::canonicalize(path).await?;
    info!("Wrote run results to {}", saved.display());
    Ok(saved)
}
