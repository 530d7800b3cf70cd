//! The subset of a Docker Engine `/containers/{id}/stats` frame the sampler
//! reads. Every field is optional on the wire; missing values decode as zero.
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatsFrame {
    #[serde(default)]
    pub memory_stats: MemoryStats,
    #[serde(default)]
    pub cpu_stats: CpuStats,
    #[serde(default)]
    pub blkio_stats: BlkioStats,
    #[serde(default)]
    pub pids_stats: PidsStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub usage: u64,
    #[serde(default)]
    pub stats: MemoryDetail,
}

/// cgroup v1 reports `total_inactive_file`, v2 reports `inactive_file`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemoryDetail {
    #[serde(default)]
    pub total_inactive_file: Option<u64>,
    #[serde(default)]
    pub inactive_file: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu_usage: CpuUsage,
    #[serde(default)]
    pub system_cpu_usage: u64,
    #[serde(default)]
    pub online_cpus: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CpuUsage {
    #[serde(default)]
    pub total_usage: u64,
    #[serde(default)]
    pub percpu_usage: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlkioStats {
    #[serde(default)]
    pub io_service_bytes_recursive: Option<Vec<BlkioEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlkioEntry {
    #[serde(default)]
    pub op: String,
    #[serde(default)]
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PidsStats {
    #[serde(default)]
    pub current: u64,
}

impl StatsFrame {
    #[must_use]
    pub fn inactive_file_bytes(&self) -> u64 {
        let detail = &self.memory_stats.stats;
        detail
            .total_inactive_file
            .or(detail.inactive_file)
            .unwrap_or(0)
    }

    /// Falls back to the per-CPU vector length on engines that omit
    /// `online_cpus`.
    #[must_use]
    pub fn online_cpus(&self) -> u32 {
        self.cpu_stats
            .online_cpus
            .filter(|count| *count > 0)
            .unwrap_or_else(|| {
                self.cpu_stats
                    .cpu_usage
                    .percpu_usage
                    .as_ref()
                    .map_or(0, |per_cpu| u32::try_from(per_cpu.len()).unwrap_or(u32::MAX))
            })
    }

    /// Sums the per-device counters for one block I/O operation.
    #[must_use]
    pub fn blkio_bytes(&self, op: &str) -> u64 {
        self.blkio_stats
            .io_service_bytes_recursive
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|entry| entry.op.eq_ignore_ascii_case(op))
            .fold(0_u64, |total, entry| total.saturating_add(entry.value))
    }
}
