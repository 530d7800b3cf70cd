use super::*;
use chrono::{TimeZone, Utc};
use std::time::Duration;

const FLOAT_TOLERANCE: f64 = 1e-9;

fn at(offset_ms: i64) -> Result<chrono::DateTime<Utc>, String> {
    Utc.timestamp_millis_opt(1_700_000_000_000_i64.saturating_add(offset_ms))
        .single()
        .ok_or_else(|| "invalid timestamp".to_owned())
}

fn ok_record(latency_ms: u64) -> Result<RequestRecord, String> {
    Ok(RequestRecord::completed(
        at(0)?,
        Duration::from_millis(latency_ms),
        200,
    ))
}

fn sample(
    memory_mb: f64,
    cpu: f64,
    read_mb: f64,
    write_mb: f64,
    pids: u64,
) -> Result<ResourceSample, String> {
    Ok(ResourceSample {
        sampled_at: at(0)?,
        memory_working_set_mb: memory_mb,
        cpu_percent: cpu,
        cumulative_disk_read_mb: read_mb,
        cumulative_disk_write_mb: write_mb,
        pid_count: pids,
    })
}

fn close_to(left: f64, right: f64) -> bool {
    (left - right).abs() < FLOAT_TOLERANCE
}

#[test]
fn counts_partition_into_success_and_failure() -> Result<(), String> {
    let records = vec![
        ok_record(10)?,
        RequestRecord::completed(at(1)?, Duration::from_millis(5), 500),
        RequestRecord::completed(at(2)?, Duration::from_millis(7), 302),
        RequestRecord::failed(at(3)?, 0, FailureKind::ConnectionRefused),
        RequestRecord::failed(at(4)?, 200, FailureKind::ConnectionReset),
        ok_record(30)?,
    ];

    let summary = calculate(&records, &[], Duration::from_secs(2)).map_err(|err| err.to_string())?;
    let requests = &summary.http.requests;

    if requests.total != 6 || requests.successful != 2 || requests.failed != 4 {
        return Err(format!("Unexpected counts: {:?}", requests));
    }
    if requests.successful.saturating_add(requests.failed) != requests.total {
        return Err("successful + failed must equal total".to_owned());
    }
    if !close_to(requests.rps, 3.0) {
        return Err(format!("Expected rps 3.0 against nominal duration, got {}", requests.rps));
    }
    Ok(())
}

#[test]
fn latency_stats_cover_successful_requests_only() -> Result<(), String> {
    let records = vec![
        ok_record(10)?,
        ok_record(20)?,
        RequestRecord::completed(at(1)?, Duration::from_millis(900), 503),
        ok_record(30)?,
    ];

    let summary = calculate(&records, &[], Duration::from_secs(1)).map_err(|err| err.to_string())?;
    let latency = &summary.http.latency;

    if latency.min != 10 || latency.max != 30 {
        return Err(format!("Unexpected min/max: {}/{}", latency.min, latency.max));
    }
    if !close_to(latency.average, 20.0) {
        return Err(format!("Unexpected average: {}", latency.average));
    }
    if latency.p99 != 30 {
        return Err(format!("Unexpected p99: {}", latency.p99));
    }
    if summary.no_successful_requests() {
        return Err("Summary must not be flagged degenerate".to_owned());
    }
    Ok(())
}

#[test]
fn zero_successes_is_flagged_and_zeroed() -> Result<(), String> {
    let records = vec![
        RequestRecord::completed(at(0)?, Duration::from_millis(12), 500),
        RequestRecord::failed(at(1)?, 0, FailureKind::Timeout),
    ];

    let summary = calculate(&records, &[], Duration::from_secs(1)).map_err(|err| err.to_string())?;

    if !summary.no_successful_requests() {
        return Err("Expected degenerate summary".to_owned());
    }
    if summary.http.latency != LatencyMetrics::default() {
        return Err(format!("Expected zeroed latency, got {:?}", summary.http.latency));
    }
    if summary.http.requests.failed != 2 {
        return Err("Expected every record to count as failed".to_owned());
    }
    Ok(())
}

#[test]
fn p50_matches_uniform_median_within_resolution() -> Result<(), String> {
    let records = (10..110_u64).map(ok_record).collect::<Result<Vec<_>, _>>()?;
    let summary = calculate(&records, &[], Duration::from_secs(10)).map_err(|err| err.to_string())?;

    // 100 samples 10..=109, true median 59.5; resolution below 2048ms is 1ms.
    let p50 = summary.http.latency.p50 as f64;
    if (p50 - 59.5).abs() > 1.0 {
        return Err(format!("p50 {} outside resolution of true median", p50));
    }
    let p90 = summary.http.latency.p90;
    if !(98..=100).contains(&p90) {
        return Err(format!("Unexpected p90 {}", p90));
    }
    Ok(())
}

#[test]
fn out_of_range_latencies_are_clamped() -> Result<(), String> {
    let mut histogram = LatencyHistogram::new().map_err(|err| err.to_string())?;
    histogram.record(0).map_err(|err| err.to_string())?;
    histogram.record(120_000).map_err(|err| err.to_string())?;

    let percentiles = histogram.percentiles();
    if percentiles.p50 != LATENCY_FLOOR_MS {
        return Err(format!("Expected floor clamp, got {}", percentiles.p50));
    }
    if percentiles.p99 < LATENCY_CEILING_MS || percentiles.p99 > 60_100 {
        return Err(format!("Expected ceiling clamp, got {}", percentiles.p99));
    }
    if histogram.count() != 2 {
        return Err("Clamped values must still be counted".to_owned());
    }
    Ok(())
}

#[test]
fn resource_block_absent_without_samples() -> Result<(), String> {
    let summary =
        calculate(&[ok_record(5)?], &[], Duration::from_secs(1)).map_err(|err| err.to_string())?;
    if summary.resources.is_some() {
        return Err("Expected no resource block".to_owned());
    }

    let json = serde_json::to_value(&summary).map_err(|err| err.to_string())?;
    if json.get("resource_metrics").is_some() {
        return Err("Absent resource block must not serialize".to_owned());
    }
    Ok(())
}

#[test]
fn resource_block_reduces_samples() -> Result<(), String> {
    let samples = vec![
        sample(100.0, 0.0, 10.0, 1.0, 4)?,
        sample(140.0, 50.0, 12.0, 1.5, 8)?,
        sample(120.0, 25.0, 16.0, 3.0, 6)?,
    ];

    let summary = calculate(&[], &samples, Duration::from_secs(3)).map_err(|err| err.to_string())?;
    let resources = summary
        .resources
        .ok_or_else(|| "Expected a resource block".to_owned())?;

    let checks = [
        (close_to(resources.memory.average, 120.0), "memory average"),
        (close_to(resources.memory.min, 100.0), "memory min"),
        (close_to(resources.memory.max, 140.0), "memory max"),
        (close_to(resources.cpu.average, 25.0), "cpu average"),
        (close_to(resources.cpu.peak, 50.0), "cpu peak"),
        (close_to(resources.disk_io.read_mb, 6.0), "disk read"),
        (close_to(resources.disk_io.write_mb, 2.0), "disk write"),
        (close_to(resources.pids.average, 6.0), "pid average"),
        (resources.pids.peak == 8, "pid peak"),
    ];
    for (ok, label) in checks {
        if !ok {
            return Err(format!("Unexpected {}", label));
        }
    }
    Ok(())
}

#[test]
fn disk_counter_reset_clamps_to_zero() -> Result<(), String> {
    let samples = vec![
        sample(50.0, 0.0, 500.0, 80.0, 1)?,
        sample(50.0, 1.0, 900.0, 90.0, 1)?,
        sample(50.0, 1.0, 2.0, 1.0, 1)?,
    ];

    let summary = calculate(&[], &samples, Duration::from_secs(3)).map_err(|err| err.to_string())?;
    let disk = summary
        .resources
        .map(|resources| resources.disk_io)
        .ok_or_else(|| "Expected a resource block".to_owned())?;

    if !close_to(disk.read_mb, 0.0) || !close_to(disk.write_mb, 0.0) {
        return Err(format!("Expected clamped disk deltas, got {:?}", disk));
    }
    Ok(())
}

#[test]
fn zero_readings_are_distinct_from_absent_block() -> Result<(), String> {
    let summary = calculate(&[], &[sample(0.0, 0.0, 0.0, 0.0, 0)?], Duration::from_secs(1))
        .map_err(|err| err.to_string())?;
    match summary.resources {
        Some(resources) if close_to(resources.memory.max, 0.0) => Ok(()),
        other => Err(format!("Expected a zero-filled block, got {:?}", other)),
    }
}

#[test]
fn request_record_serializes_latency_in_micros() -> Result<(), String> {
    let record = RequestRecord::completed(at(0)?, Duration::from_micros(1_500), 204);
    let json = serde_json::to_value(&record).map_err(|err| err.to_string())?;

    if json.get("latency_us").and_then(serde_json::Value::as_u64) != Some(1_500) {
        return Err(format!("Unexpected latency field: {}", json));
    }
    if json.get("failure_kind").and_then(serde_json::Value::as_str) != Some("none") {
        return Err(format!("Unexpected failure kind field: {}", json));
    }

    let failed = RequestRecord::failed(at(0)?, 0, FailureKind::DnsError);
    let text = serde_json::to_string(&failed).map_err(|err| err.to_string())?;
    let parsed: RequestRecord = serde_json::from_str(&text).map_err(|err| err.to_string())?;
    if parsed != failed {
        return Err(format!("Failed record did not survive persistence: {:?}", parsed));
    }
    Ok(())
}
