//! In-process HTTP fixtures and a container runtime double for unit tests.
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::container::{ContainerRuntime, StatsStream, decode_frames};
use crate::error::ContainerError;

const HEADER_END: &[u8] = b"\r\n\r\n";
const READ_CHUNK: usize = 4096;

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// What the fixture sends back for one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub status: u16,
    pub delay: Duration,
    pub body: Vec<String>,
    /// Pause between body chunks. Only used by streaming replies.
    pub chunk_gap: Duration,
    /// Close-delimited body instead of `Content-Length` + keep-alive.
    pub streaming: bool,
}

impl Reply {
    pub(crate) fn status(status: u16) -> Self {
        Self {
            status,
            delay: Duration::ZERO,
            body: vec!["ok".to_owned()],
            chunk_gap: Duration::ZERO,
            streaming: false,
        }
    }

    pub(crate) fn json(status: u16, body: &str) -> Self {
        Self {
            body: vec![body.to_owned()],
            ..Self::status(status)
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn stream(chunks: Vec<String>, chunk_gap: Duration) -> Self {
        Self {
            status: 200,
            delay: Duration::ZERO,
            body: chunks,
            chunk_gap,
            streaming: true,
        }
    }
}

pub(crate) struct HttpFixture {
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl HttpFixture {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for HttpFixture {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serves HTTP/1.1 on a loopback port, answering each request with
/// `route(path)`.
pub(crate) async fn spawn_http_fixture<F>(route: F) -> Result<HttpFixture, String>
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind fixture: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read fixture addr: {}", err))?;
    let route = Arc::new(route);

    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let route = Arc::clone(&route);
            tokio::spawn(async move {
                drop(serve_connection(stream, route.as_ref()).await);
            });
        }
    });
    Ok(HttpFixture { addr, task })
}

/// A loopback address with nothing listening on it.
pub(crate) async fn closed_port_addr() -> Result<SocketAddr, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind probe port: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read probe addr: {}", err))?;
    drop(listener);
    Ok(addr)
}

async fn serve_connection<F>(mut stream: TcpStream, route: &F) -> std::io::Result<()>
where
    F: Fn(&str) -> Reply,
{
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        let header_end = loop {
            if let Some(pos) = pending
                .windows(HEADER_END.len())
                .position(|window| window == HEADER_END)
            {
                break pos;
            }
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                return Ok(());
            }
            pending.extend_from_slice(chunk.get(..read).unwrap_or_default());
        };

        let head = String::from_utf8_lossy(pending.get(..header_end).unwrap_or_default())
            .into_owned();
        pending.drain(..header_end.saturating_add(HEADER_END.len()));
        let path = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/")
            .to_owned();

        let reply = route(&path);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        if reply.streaming {
            let head = format!(
                "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
                reply.status
            );
            stream.write_all(head.as_bytes()).await?;
            for part in &reply.body {
                stream.write_all(part.as_bytes()).await?;
                stream.flush().await?;
                if !reply.chunk_gap.is_zero() {
                    tokio::time::sleep(reply.chunk_gap).await;
                }
            }
            stream.shutdown().await?;
            return Ok(());
        }

        let body = reply.body.concat();
        let response = format!(
            "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n{}",
            reply.status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
    }
}

/// A minimal stats frame whose counters all grow with `step`.
pub(crate) fn stats_frame(step: u64) -> String {
    serde_json::json!({
        "memory_stats": { "usage": step.saturating_mul(1024 * 1024), "stats": {} },
        "cpu_stats": {
            "cpu_usage": { "total_usage": step.saturating_mul(100) },
            "system_cpu_usage": step.saturating_mul(1000),
            "online_cpus": 1
        },
        "blkio_stats": { "io_service_bytes_recursive": null },
        "pids_stats": { "current": step }
    })
    .to_string()
}

/// Container runtime double serving a canned or endless stats feed.
#[derive(Debug, Clone)]
pub(crate) struct FakeRuntime {
    pub running: bool,
    pub frames: Vec<String>,
    /// When set, frames keep coming at this interval and the feed never ends.
    pub endless: Option<Duration>,
    pub fail_open: bool,
}

impl FakeRuntime {
    pub(crate) fn closing_after(frames: Vec<String>) -> Self {
        Self {
            running: true,
            frames,
            endless: None,
            fail_open: false,
        }
    }

    pub(crate) fn endless(interval: Duration) -> Self {
        Self {
            endless: Some(interval),
            ..Self::closing_after(Vec::new())
        }
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn is_running(&self, _id: &str) -> Result<bool, ContainerError> {
        Ok(self.running)
    }

    async fn open_stats(&self, id: &str) -> Result<StatsStream, ContainerError> {
        if self.fail_open {
            return Err(ContainerError::NotFound { id: id.to_owned() });
        }
        if let Some(interval) = self.endless {
            let ticks = stream::unfold(1_u64, move |step| async move {
                tokio::time::sleep(interval).await;
                Some((
                    Ok::<String, std::io::Error>(stats_frame(step)),
                    step.saturating_add(1),
                ))
            });
            return Ok(decode_frames(ticks));
        }
        let chunks = self
            .frames
            .clone()
            .into_iter()
            .map(Ok::<String, std::io::Error>);
        Ok(decode_frames(stream::iter(chunks)))
    }
}
