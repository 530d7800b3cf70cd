//! Metric-by-metric deltas between a baseline summary and a test summary.
use crate::metrics::Summary;


/// Relative changes at or below this magnitude count as noise.
pub const SIGNIFICANCE_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricSection {
    Http,
    Memory,
    Cpu,
    DiskIo,
    Pids,
}

impl MetricSection {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            MetricSection::Http => "HTTP",
            MetricSection::Memory => "Memory",
            MetricSection::Cpu => "CPU",
            MetricSection::DiskIo => "Disk I/O",
            MetricSection::Pids => "PIDs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Better,
    Worse,
    /// Within [`SIGNIFICANCE_PERCENT`].
    Unchanged,
    /// The baseline is zero, so no relative change exists.
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricChange {
    pub section: MetricSection,
    pub name: &'static str,
    pub baseline: f64,
    pub test: f64,
    pub delta: f64,
    /// `None` when the baseline is zero.
    pub percent: Option<f64>,
    pub better: bool,
    /// Decimal places used when rendering values.
    pub precision: usize,
}

impl MetricChange {
    #[must_use]
    pub fn new(
        section: MetricSection,
        name: &'static str,
        baseline: f64,
        test: f64,
        direction: Direction,
        precision: usize,
    ) -> Self {
        let delta = test - baseline;
        let percent = (baseline.abs() > f64::EPSILON).then(|| delta / baseline * 100.0);
        let better = match direction {
            Direction::HigherIsBetter => delta > 0.0,
            Direction::LowerIsBetter => delta < 0.0,
        };
        Self {
            section,
            name,
            baseline,
            test,
            delta,
            percent,
            better,
            precision,
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        match self.percent {
            None => Verdict::NotApplicable,
            Some(percent) if percent.abs() <= SIGNIFICANCE_PERCENT => Verdict::Unchanged,
            Some(_) if self.better => Verdict::Better,
            Some(_) => Verdict::Worse,
        }
    }

    #[must_use]
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    /// `+12.50 (+4.10%)`, with a marker when the change is significant.
    #[must_use]
    pub fn change_string(&self) -> String {
        let sign = if self.delta > 0.0 { "+" } else { "" };
        let percent = self
            .percent
            .map_or_else(|| "n/a".to_owned(), |percent| format!("{:+.2}%", percent));
        let marker = match self.verdict() {
            Verdict::Better => " ✓",
            Verdict::Worse => " ✗",
            Verdict::Unchanged | Verdict::NotApplicable => "",
        };
        format!(
            "{}{} ({}){}",
            sign,
            self.format_value(self.delta),
            percent,
            marker
        )
    }
}

/// Every change between one baseline and one test run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonReport {
    pub changes: Vec<MetricChange>,
}

impl ComparisonReport {
    #[must_use]
    pub fn has_resource_changes(&self) -> bool {
        self.changes
            .iter()
            .any(|change| change.section != MetricSection::Http)
    }

    pub fn section(&self, section: MetricSection) -> impl Iterator<Item = &MetricChange> {
        self.changes
            .iter()
            .filter(move |change| change.section == section)
    }

    #[must_use]
    pub fn find(&self, section: MetricSection, name: &str) -> Option<&MetricChange> {
        self.section(section).find(|change| change.name == name)
    }
}

/// Resource metrics are compared only when both runs carry a resource block.
#[must_use]
pub fn compare(baseline: &Summary, test: &Summary) -> ComparisonReport {
    use Direction::{HigherIsBetter, LowerIsBetter};
    use MetricSection::{Cpu, DiskIo, Http, Memory, Pids};

    let base_http = &baseline.http;
    let test_http = &test.http;
    let mut changes = vec![
        MetricChange::new(
            Http,
            "Total requests",
            base_http.requests.total as f64,
            test_http.requests.total as f64,
            HigherIsBetter,
            0,
        ),
        MetricChange::new(
            Http,
            "Failed requests",
            base_http.requests.failed as f64,
            test_http.requests.failed as f64,
            LowerIsBetter,
            0,
        ),
        MetricChange::new(
            Http,
            "RPS",
            base_http.requests.rps,
            test_http.requests.rps,
            HigherIsBetter,
            2,
        ),
        MetricChange::new(
            Http,
            "Latency avg (ms)",
            base_http.latency.average,
            test_http.latency.average,
            LowerIsBetter,
            2,
        ),
    ];
    let percentiles = [
        ("Latency p50 (ms)", base_http.latency.p50, test_http.latency.p50),
        ("Latency p90 (ms)", base_http.latency.p90, test_http.latency.p90),
        ("Latency p95 (ms)", base_http.latency.p95, test_http.latency.p95),
        ("Latency p99 (ms)", base_http.latency.p99, test_http.latency.p99),
    ];
    changes.extend(percentiles.into_iter().map(|(name, base, probe)| {
        MetricChange::new(Http, name, base as f64, probe as f64, LowerIsBetter, 0)
    }));

    if let (Some(base), Some(probe)) = (&baseline.resources, &test.resources) {
        changes.extend([
            MetricChange::new(Memory, "Average (MB)", base.memory.average, probe.memory.average, LowerIsBetter, 2),
            MetricChange::new(Memory, "Max (MB)", base.memory.max, probe.memory.max, LowerIsBetter, 2),
            MetricChange::new(Cpu, "Average (%)", base.cpu.average, probe.cpu.average, LowerIsBetter, 2),
            MetricChange::new(Cpu, "Peak (%)", base.cpu.peak, probe.cpu.peak, LowerIsBetter, 2),
            MetricChange::new(DiskIo, "Read (MB)", base.disk_io.read_mb, probe.disk_io.read_mb, LowerIsBetter, 2),
            MetricChange::new(DiskIo, "Write (MB)", base.disk_io.write_mb, probe.disk_io.write_mb, LowerIsBetter, 2),
            MetricChange::new(Pids, "Average", base.pids.average, probe.pids.average, LowerIsBetter, 2),
            MetricChange::new(Pids, "Peak", base.pids.peak as f64, probe.pids.peak as f64, LowerIsBetter, 0),
        ]);
    }

    ComparisonReport { changes }
}
