//! Runs one test window: preflight, the shared deadline, the concurrent
//! producers, and the join.
mod progress;


use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::container::{ContainerRuntime, DockerClient, ResourceSampler};
use crate::domain::TestWindow;
use crate::error::{ContainerError, RunError};
use crate::http::{LoadGenerator, build_preflight_client};
use crate::metrics::{RequestRecord, ResourceSample};
use crate::shutdown::{arm_deadline, setup_signal_shutdown_handler, shutdown_channel};

use progress::setup_progress_indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Preflight,
    Running,
    Joined,
    Done,
    Failed,
}

impl RunPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Preflight => "preflight",
            RunPhase::Running => "running",
            RunPhase::Joined => "joined",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw output of one run, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RunRecords {
    pub requests: Vec<RequestRecord>,
    pub samples: Vec<ResourceSample>,
}

/// Cosmetic and interactive extras layered on a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub progress: bool,
    pub no_color: bool,
    /// Forward Ctrl+C / SIGTERM onto the run's cancellation signal.
    pub handle_signals: bool,
}

pub struct Orchestrator {
    window: TestWindow,
    runtime: Option<Arc<dyn ContainerRuntime>>,
    options: RunOptions,
    phase: RunPhase,
}

impl Orchestrator {
    /// Without an explicit runtime, a Docker client is built from the
    /// environment when the window names a container.
    #[must_use]
    pub const fn new(window: TestWindow) -> Self {
        Self {
            window,
            runtime: None,
            options: RunOptions {
                progress: false,
                no_color: false,
                handle_signals: false,
            },
            phase: RunPhase::Idle,
        }
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: Arc<dyn ContainerRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub const fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    #[must_use]
    pub const fn window(&self) -> &TestWindow {
        &self.window
    }

    /// Drives the run to completion.
    ///
    /// # Errors
    ///
    /// Returns an error only when the run cannot start: the target is
    /// unreachable, the container is missing or stopped, or the probe client
    /// cannot be built. No requests are issued in that case.
    pub async fn run(&mut self) -> Result<RunRecords, RunError> {
        match self.execute().await {
            Ok(records) => {
                self.transition(RunPhase::Done);
                Ok(records)
            }
            Err(err) => {
                self.transition(RunPhase::Failed);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: RunPhase) {
        debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    async fn execute(&mut self) -> Result<RunRecords, RunError> {
        self.transition(RunPhase::Preflight);
        let sampler = self.preflight().await?;
        let generator =
            LoadGenerator::from_window(&self.window).map_err(|err| RunError::Setup { source: err })?;

        self.transition(RunPhase::Running);
        let duration = self.window.duration();
        let (shutdown_tx, _) = shutdown_channel();
        let run_start = Instant::now();

        // Every producer subscribes before the deadline is armed.
        let load_handle = generator.spawn(&shutdown_tx);
        let sampler_handle =
            sampler.map(|sampler| tokio::spawn(sampler.run(shutdown_tx.subscribe())));
        let mut extras: Vec<JoinHandle<()>> = Vec::new();
        let mut progress_done = None;
        if self.options.progress {
            let (done_tx, done_rx) = oneshot::channel();
            progress_done = Some(done_tx);
            extras.push(setup_progress_indicator(
                duration,
                run_start,
                done_rx,
                self.options.no_color,
            ));
        }
        if self.options.handle_signals {
            extras.push(setup_signal_shutdown_handler(&shutdown_tx));
        }
        let deadline = arm_deadline(&shutdown_tx, duration);
        info!(
            "Running {} connections against {} for {:?}.",
            self.window.connections(),
            self.window.url(),
            duration
        );

        let requests = load_handle.await.map_err(|err| RunError::TaskJoin {
            task: "load generator",
            source: err,
        })?;
        let samples = join_sampler(sampler_handle).await;

        deadline.abort();
        // Releases the extras when the producers finished on an interrupt.
        drop(shutdown_tx.send(()));
        if let Some(done_tx) = progress_done {
            drop(done_tx.send(()));
        }
        for handle in extras {
            if let Err(err) = handle.await {
                debug!("Auxiliary run task ended abnormally: {}", err);
            }
        }
        self.transition(RunPhase::Joined);
        info!(
            "Run finished after {:.2?} with {} requests and {} resource samples.",
            run_start.elapsed(),
            requests.len(),
            samples.len()
        );

        Ok(RunRecords { requests, samples })
    }

    async fn preflight(&self) -> Result<Option<ResourceSampler>, RunError> {
        let client = build_preflight_client().map_err(|err| RunError::Setup { source: err })?;
        let response = client
            .get(self.window.url().clone())
            .send()
            .await
            .map_err(|err| RunError::TargetUnreachable {
                url: self.window.url().to_string(),
                source: err,
            })?;
        debug!("Preflight reached target with HTTP {}.", response.status());

        let Some(container) = self.window.container() else {
            return Ok(None);
        };
        let runtime = self
            .resolve_runtime()
            .map_err(|err| RunError::ContainerCheck { source: err })?;
        let running = runtime
            .is_running(container)
            .await
            .map_err(|err| RunError::ContainerCheck { source: err })?;
        if !running {
            return Err(RunError::ContainerNotRunning {
                id: container.to_owned(),
            });
        }
        Ok(Some(ResourceSampler::new(runtime, container.to_owned())))
    }

    fn resolve_runtime(&self) -> Result<Arc<dyn ContainerRuntime>, ContainerError> {
        self.runtime.as_ref().map_or_else(
            || DockerClient::from_env().map(|client| Arc::new(client) as Arc<dyn ContainerRuntime>),
            |runtime| Ok(Arc::clone(runtime)),
        )
    }
}

/// Resource sampling never fails a run; problems degrade it to no samples.
async fn join_sampler(
    handle: Option<JoinHandle<Result<Vec<ResourceSample>, ContainerError>>>,
) -> Vec<ResourceSample> {
    let Some(handle) = handle else {
        return Vec::new();
    };
    match handle.await {
        Ok(Ok(samples)) => samples,
        Ok(Err(err)) => {
            warn!("Resource sampling unavailable: {}", err);
            Vec::new()
        }
        Err(err) => {
            warn!("Resource sampler task failed: {}", err);
            Vec::new()
        }
    }
}
