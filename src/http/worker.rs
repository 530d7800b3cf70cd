use chrono::Utc;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use url::Url;

use crate::metrics::RequestRecord;
use crate::shutdown::{ShutdownReceiver, is_cancelled};

use super::classify::classify_error;

/// One open-loop probe loop against a single URL.
///
/// The cancellation signal is only consulted between requests, so the last
/// in-flight probe always runs to completion or to its own timeout.
pub(super) struct RequestWorker {
    client: Client,
    url: Url,
    shutdown_rx: ShutdownReceiver,
}

impl RequestWorker {
    pub(super) const fn new(client: Client, url: Url, shutdown_rx: ShutdownReceiver) -> Self {
        Self {
            client,
            url,
            shutdown_rx,
        }
    }

    /// Runs until cancelled and returns every record, in issue order.
    pub(super) async fn run(mut self) -> Vec<RequestRecord> {
        let mut records = Vec::new();
        loop {
            records.push(probe(&self.client, &self.url).await);
            if is_cancelled(&mut self.shutdown_rx) {
                break;
            }
        }
        records
    }
}

/// Issues one GET and drains the body so the connection returns to the pool.
pub(super) async fn probe(client: &Client, url: &Url) -> RequestRecord {
    let issued_at = Utc::now();
    let started = Instant::now();

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(err) => return RequestRecord::failed(issued_at, 0, classify_error(&err)),
    };
    let status = response.status().as_u16();

    if let Err(err) = drain_response_body(response).await {
        return RequestRecord::failed(issued_at, status, classify_error(&err));
    }
    RequestRecord::completed(issued_at, started.elapsed(), status)
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
