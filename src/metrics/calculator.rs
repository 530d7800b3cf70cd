use std::time::Duration;

use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::types::{
    CpuMetrics, DiskIoMetrics, HttpMetrics, LatencyMetrics, MemoryMetrics, PidMetrics,
    RequestMetrics, RequestRecord, ResourceMetrics, ResourceSample, Summary,
};

/// Reduces raw run records into a [`Summary`].
///
/// `duration` is the nominal test duration; `rps` is computed against it, not
/// against the measured wall-clock time of the run.
///
/// # Errors
///
/// Returns an error if the latency histogram cannot be created or updated.
pub fn calculate(
    requests: &[RequestRecord],
    samples: &[ResourceSample],
    duration: Duration,
) -> Result<Summary, MetricsError> {
    let mut tally = RequestTally::new()?;
    for record in requests {
        tally.observe(record)?;
    }

    Ok(Summary {
        http: tally.finish(duration),
        resources: reduce_resources(samples),
    })
}

struct RequestTally {
    total: u64,
    successful: u64,
    latency_sum_ms: f64,
    min: Option<Duration>,
    max: Option<Duration>,
    histogram: LatencyHistogram,
}

impl RequestTally {
    fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            total: 0,
            successful: 0,
            latency_sum_ms: 0.0,
            min: None,
            max: None,
            histogram: LatencyHistogram::new()?,
        })
    }

    fn observe(&mut self, record: &RequestRecord) -> Result<(), MetricsError> {
        self.total = self.total.saturating_add(1);
        if !record.is_success() {
            return Ok(());
        }

        let latency = record.latency.unwrap_or_default();
        self.successful = self.successful.saturating_add(1);
        self.latency_sum_ms += latency.as_secs_f64() * 1000.0;
        self.histogram.record(whole_millis(latency))?;
        self.min = Some(self.min.map_or(latency, |current| current.min(latency)));
        self.max = Some(self.max.map_or(latency, |current| current.max(latency)));
        Ok(())
    }

    fn finish(self, duration: Duration) -> HttpMetrics {
        let nominal_secs = duration.as_secs_f64();
        let rps = if nominal_secs > 0.0 {
            self.total as f64 / nominal_secs
        } else {
            0.0
        };
        let average = if self.successful > 0 {
            self.latency_sum_ms / self.successful as f64
        } else {
            0.0
        };
        let percentiles = self.histogram.percentiles();

        HttpMetrics {
            requests: RequestMetrics {
                total: self.total,
                successful: self.successful,
                failed: self.total.saturating_sub(self.successful),
                rps,
            },
            latency: LatencyMetrics {
                average,
                min: self.min.map_or(0, whole_millis),
                max: self.max.map_or(0, whole_millis),
                p50: percentiles.p50,
                p90: percentiles.p90,
                p95: percentiles.p95,
                p99: percentiles.p99,
            },
        }
    }
}

fn whole_millis(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

fn reduce_resources(samples: &[ResourceSample]) -> Option<ResourceMetrics> {
    let (first, last) = (samples.first()?, samples.last()?);
    let count = samples.len() as f64;

    let mut memory_sum = 0.0;
    let mut memory_min = first.memory_working_set_mb;
    let mut memory_max = first.memory_working_set_mb;
    let mut cpu_sum = 0.0;
    let mut cpu_peak: f64 = 0.0;
    let mut pid_sum: u64 = 0;
    let mut pid_peak: u64 = 0;

    for sample in samples {
        memory_sum += sample.memory_working_set_mb;
        memory_min = memory_min.min(sample.memory_working_set_mb);
        memory_max = memory_max.max(sample.memory_working_set_mb);
        cpu_sum += sample.cpu_percent;
        cpu_peak = cpu_peak.max(sample.cpu_percent);
        pid_sum = pid_sum.saturating_add(sample.pid_count);
        pid_peak = pid_peak.max(sample.pid_count);
    }

    // Counters are cumulative: only the endpoints matter. A reset shows up as
    // a decrease and is clamped.
    let read_mb = (last.cumulative_disk_read_mb - first.cumulative_disk_read_mb).max(0.0);
    let write_mb = (last.cumulative_disk_write_mb - first.cumulative_disk_write_mb).max(0.0);

    Some(ResourceMetrics {
        memory: MemoryMetrics {
            average: memory_sum / count,
            min: memory_min,
            max: memory_max,
        },
        cpu: CpuMetrics {
            average: cpu_sum / count,
            peak: cpu_peak,
        },
        disk_io: DiskIoMetrics { read_mb, write_mb },
        pids: PidMetrics {
            average: pid_sum as f64 / count,
            peak: pid_peak,
        },
    })
}
