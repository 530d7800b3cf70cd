use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport-level failure classes for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    None,
    ConnectionRefused,
    Timeout,
    DnsError,
    ConnectionReset,
    Unknown,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::None => "none",
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::Timeout => "timeout",
            FailureKind::DnsError => "dns_error",
            FailureKind::ConnectionReset => "connection_reset",
            FailureKind::Unknown => "unknown",
        }
    }
}

/// One HTTP probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub issued_at: DateTime<Utc>,
    /// Wall-clock time until the body was drained; absent when no response
    /// was obtained.
    #[serde(rename = "latency_us", with = "optional_micros", default)]
    pub latency: Option<Duration>,
    /// 0 when no response was obtained.
    pub status_code: u16,
    pub failure_kind: FailureKind,
}

impl RequestRecord {
    /// A probe that received and drained a response.
    #[must_use]
    pub const fn completed(issued_at: DateTime<Utc>, latency: Duration, status_code: u16) -> Self {
        Self {
            issued_at,
            latency: Some(latency),
            status_code,
            failure_kind: FailureKind::None,
        }
    }

    /// A probe that failed at the transport level. `status_code` is 0 unless
    /// the failure happened while draining a received response.
    #[must_use]
    pub const fn failed(issued_at: DateTime<Utc>, status_code: u16, kind: FailureKind) -> Self {
        Self {
            issued_at,
            latency: None,
            status_code,
            failure_kind: kind,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.failure_kind, FailureKind::None)
            && self.status_code >= 200
            && self.status_code < 300
    }
}

/// One point-in-time container observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    pub sampled_at: DateTime<Utc>,
    pub memory_working_set_mb: f64,
    /// Always 0 for the first sample of a run.
    pub cpu_percent: f64,
    pub cumulative_disk_read_mb: f64,
    pub cumulative_disk_write_mb: f64,
    pub pid_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "http_metrics")]
    pub http: HttpMetrics,
    /// Present only when at least one resource sample was collected.
    #[serde(
        rename = "resource_metrics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resources: Option<ResourceMetrics>,
}

impl Summary {
    /// Latency statistics are meaningless when this is true; they are all zero.
    #[must_use]
    pub const fn no_successful_requests(&self) -> bool {
        self.http.requests.successful == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpMetrics {
    pub requests: RequestMetrics,
    pub latency: LatencyMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    /// Computed against the nominal duration.
    pub rps: f64,
}

/// Milliseconds. Only successful requests contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub average: f64,
    pub min: u64,
    pub max: u64,
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub memory: MemoryMetrics,
    pub cpu: CpuMetrics,
    pub disk_io: DiskIoMetrics,
    pub pids: PidMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub average: f64,
    pub peak: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskIoMetrics {
    pub read_mb: f64,
    pub write_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidMetrics {
    pub average: f64,
    pub peak: u64,
}

mod optional_micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .map(|latency| u64::try_from(latency.as_micros()).unwrap_or(u64::MAX))
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_micros))
    }
}
