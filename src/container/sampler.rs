use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use tracing::debug;

use crate::error::ContainerError;
use crate::metrics::ResourceSample;
use crate::shutdown::{ShutdownReceiver, is_cancelled};

use super::{ContainerRuntime, StatsFrame};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Cumulative CPU counters of the previous frame.
#[derive(Debug, Clone, Copy)]
struct CpuBaseline {
    total_usage: u64,
    system_usage: u64,
}

/// Converts raw frames into [`ResourceSample`]s, carrying the previous
/// frame's CPU counters as the rate baseline.
#[derive(Debug, Default)]
pub struct SampleConverter {
    previous: Option<CpuBaseline>,
}

impl SampleConverter {
    pub fn convert(&mut self, frame: &StatsFrame, sampled_at: DateTime<Utc>) -> ResourceSample {
        let working_set = frame
            .memory_stats
            .usage
            .saturating_sub(frame.inactive_file_bytes());

        let current = CpuBaseline {
            total_usage: frame.cpu_stats.cpu_usage.total_usage,
            system_usage: frame.cpu_stats.system_cpu_usage,
        };
        let cpu_percent = self
            .previous
            .replace(current)
            .map_or(0.0, |previous| cpu_percent(previous, current, frame.online_cpus()));

        ResourceSample {
            sampled_at,
            memory_working_set_mb: bytes_to_mb(working_set),
            cpu_percent,
            cumulative_disk_read_mb: bytes_to_mb(frame.blkio_bytes("read")),
            cumulative_disk_write_mb: bytes_to_mb(frame.blkio_bytes("write")),
            pid_count: frame.pids_stats.current,
        }
    }
}

fn cpu_percent(previous: CpuBaseline, current: CpuBaseline, online_cpus: u32) -> f64 {
    let cpu_delta = current.total_usage.saturating_sub(previous.total_usage);
    let system_delta = current.system_usage.saturating_sub(previous.system_usage);
    if cpu_delta == 0 || system_delta == 0 {
        return 0.0;
    }
    (cpu_delta as f64 / system_delta as f64) * f64::from(online_cpus) * 100.0
}

fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Samples one container for as long as the run lasts.
pub struct ResourceSampler {
    runtime: Arc<dyn ContainerRuntime>,
    container_id: String,
}

impl ResourceSampler {
    #[must_use]
    pub fn new(runtime: Arc<dyn ContainerRuntime>, container_id: String) -> Self {
        Self {
            runtime,
            container_id,
        }
    }

    /// Collects samples until cancelled or until the feed ends.
    ///
    /// Cancellation is checked before waiting on each frame. A feed that
    /// closes or turns malformed mid-run ends sampling without error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the feed cannot be opened.
    pub async fn run(
        self,
        mut shutdown_rx: ShutdownReceiver,
    ) -> Result<Vec<ResourceSample>, ContainerError> {
        let mut frames = self.runtime.open_stats(&self.container_id).await?;
        let mut converter = SampleConverter::default();
        let mut samples = Vec::new();

        loop {
            if is_cancelled(&mut shutdown_rx) {
                debug!("Sampler cancelled after {} samples.", samples.len());
                break;
            }
            match frames.next().await {
                Some(Ok(frame)) => samples.push(converter.convert(&frame, Utc::now())),
                Some(Err(err)) => {
                    debug!("Stats feed for '{}' ended: {}", self.container_id, err);
                    break;
                }
                None => {
                    debug!("Stats feed for '{}' closed.", self.container_id);
                    break;
                }
            }
        }
        Ok(samples)
    }
}
