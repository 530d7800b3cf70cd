use super::*;
use crate::metrics::{FailureKind, calculate};
use std::num::NonZeroUsize;
use std::time::Duration;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn metadata(url: &str, connections: usize, duration_ms: u64) -> RunMetadata {
    RunMetadata {
        timestamp: Utc::now(),
        url: url.to_owned(),
        duration_ms,
        connections,
        container_name: None,
    }
}

#[test]
fn similarity_ignores_timestamp_and_container() -> Result<(), String> {
    let base = metadata("http://localhost:8080/", 10, 30_000);
    let mut other = metadata("http://localhost:8080/", 10, 30_000);
    other.container_name = Some("api".to_owned());
    if !base.is_similar(&other) {
        return Err("Expected similar metadata".to_owned());
    }

    let changed = [
        metadata("http://localhost:9090/", 10, 30_000),
        metadata("http://localhost:8080/", 20, 30_000),
        metadata("http://localhost:8080/", 10, 10_000),
    ];
    if changed.iter().any(|candidate| base.is_similar(candidate)) {
        return Err("Differences in url, connections or duration must be dissimilar".to_owned());
    }
    Ok(())
}

#[test]
fn metadata_mirrors_the_window() -> Result<(), String> {
    let connections = NonZeroUsize::new(4).ok_or_else(|| "zero".to_owned())?;
    let window = TestWindow::new(
        "http://localhost:8080/health",
        Some("api".to_owned()),
        connections,
        Duration::from_millis(2_500),
    )
    .map_err(|err| err.to_string())?;
    let meta = RunMetadata::from_window(&window, Utc::now());

    if meta.url != "http://localhost:8080/health"
        || meta.duration_ms != 2_500
        || meta.connections != 4
        || meta.container_name.as_deref() != Some("api")
    {
        return Err(format!("Unexpected metadata: {:?}", meta));
    }
    Ok(())
}

#[test]
fn run_output_survives_a_file_round_trip() -> Result<(), String> {
    run_async_test(async {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = dir.path().join("run.json");

        let records = vec![
            RequestRecord::completed(Utc::now(), Duration::from_millis(12), 200),
            RequestRecord::failed(Utc::now(), 0, FailureKind::Timeout),
        ];
        let summary =
            calculate(&records, &[], Duration::from_secs(1)).map_err(|err| err.to_string())?;
        let output = RunOutput {
            metadata: metadata("http://localhost/", 1, 1_000),
            http_stats: records,
            docker_stats: Vec::new(),
            summary,
        };

        output.save_to_file(&path).await.map_err(|err| err.to_string())?;
        let raw = std::fs::read_to_string(&path).map_err(|err| err.to_string())?;
        if raw.contains("docker_stats") || raw.contains("container_name") {
            return Err("Empty optional sections must be omitted".to_owned());
        }

        let restored = RunOutput::read_from_path(&path)
            .await
            .map_err(|err| err.to_string())?;
        if restored != output {
            return Err("Restored output differs from the saved one".to_owned());
        }
        Ok(())
    })
}

#[test]
fn reading_garbage_is_an_error() -> Result<(), String> {
    run_async_test(async {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{\"metadata\": 3}").map_err(|err| err.to_string())?;

        if RunOutput::read_from_path(&path).await.is_ok() {
            return Err("Expected a decode error".to_owned());
        }
        Ok(())
    })
}
