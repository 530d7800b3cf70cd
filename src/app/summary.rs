use crate::metrics::Summary;
use crate::output::RunMetadata;

/// Milliseconds per second.
const MS_PER_SEC: u64 = 1_000;
const PERCENT_SCALE: f64 = 100.0;

pub(super) fn print_summary(metadata: &RunMetadata, summary: &Summary) {
    for line in summary_lines(metadata, summary) {
        println!("{}", line);
    }
}

pub(super) fn summary_lines(metadata: &RunMetadata, summary: &Summary) -> Vec<String> {
    let requests = &summary.http.requests;
    let latency = &summary.http.latency;
    let success_rate = if requests.total > 0 {
        requests.successful as f64 / requests.total as f64 * PERCENT_SCALE
    } else {
        0.0
    };

    let mut lines = vec![
        format!("Target: {}", metadata.url),
        format!(
            "Duration: {}.{:03}s",
            metadata.duration_ms / MS_PER_SEC,
            metadata.duration_ms % MS_PER_SEC
        ),
        format!("Connections: {}", metadata.connections),
        String::new(),
        "HTTP".to_owned(),
        format!("  Total Requests: {}", requests.total),
        format!("  Successful: {} ({:.2}%)", requests.successful, success_rate),
        format!("  Failed: {}", requests.failed),
        format!("  Requests/sec: {:.2}", requests.rps),
    ];

    if summary.no_successful_requests() {
        lines.push(
            "  Warning: no successful requests; latency statistics are not available.".to_owned(),
        );
    } else {
        lines.push(format!(
            "  Latency avg/min/max: {:.2}ms / {}ms / {}ms",
            latency.average, latency.min, latency.max
        ));
        lines.push(format!(
            "  Latency p50/p90/p95/p99: {}ms / {}ms / {}ms / {}ms",
            latency.p50, latency.p90, latency.p95, latency.p99
        ));
    }

    if let Some(resources) = &summary.resources {
        lines.push(String::new());
        lines.push(
            metadata
                .container_name
                .as_deref()
                .map_or_else(|| "Container".to_owned(), |name| format!("Container: {}", name)),
        );
        lines.push(format!(
            "  Memory avg/min/max: {:.2} MB / {:.2} MB / {:.2} MB",
            resources.memory.average, resources.memory.min, resources.memory.max
        ));
        lines.push(format!(
            "  CPU avg/peak: {:.2}% / {:.2}%",
            resources.cpu.average, resources.cpu.peak
        ));
        lines.push(format!(
            "  Disk read/write: {:.2} MB / {:.2} MB",
            resources.disk_io.read_mb, resources.disk_io.write_mb
        ));
        lines.push(format!(
            "  PIDs avg/peak: {:.2} / {}",
            resources.pids.average, resources.pids.peak
        ));
    }

    lines
}
