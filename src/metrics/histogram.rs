use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Smallest trackable latency in milliseconds.
pub const LATENCY_FLOOR_MS: u64 = 1;
/// Largest trackable latency in milliseconds.
pub const LATENCY_CEILING_MS: u64 = 60_000;
/// Significant decimal digits kept per bucket.
pub const LATENCY_SIGNIFICANT_DIGITS: u8 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Percentiles {
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Fixed-memory latency distribution over `1..=60000` ms.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new bounded latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new_with_bounds(
            LATENCY_FLOOR_MS,
            LATENCY_CEILING_MS,
            LATENCY_SIGNIFICANT_DIGITS,
        )
        .map_err(|err| MetricsError::Histogram {
            context: "create",
            source: Box::new(err),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds, clamped into the supported range.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        let value = latency_ms.clamp(LATENCY_FLOOR_MS, LATENCY_CEILING_MS);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    #[must_use]
    pub fn percentiles(&self) -> Percentiles {
        if self.count() == 0 {
            return Percentiles::default();
        }

        Percentiles {
            p50: self.hist.value_at_quantile(0.5),
            p90: self.hist.value_at_quantile(0.9),
            p95: self.hist.value_at_quantile(0.95),
            p99: self.hist.value_at_quantile(0.99),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
