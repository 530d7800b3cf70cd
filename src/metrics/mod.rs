//! Raw run records, the bounded latency histogram, and the reduction from
//! records to a [`Summary`].
mod calculator;
mod histogram;
mod types;

#[cfg(test)]
mod tests;

pub use calculator::calculate;
pub use histogram::{
    LATENCY_CEILING_MS, LATENCY_FLOOR_MS, LATENCY_SIGNIFICANT_DIGITS, LatencyHistogram,
    Percentiles,
};
pub use types::{
    CpuMetrics, DiskIoMetrics, FailureKind, HttpMetrics, LatencyMetrics, MemoryMetrics,
    PidMetrics, RequestMetrics, RequestRecord, ResourceMetrics, ResourceSample, Summary,
};
