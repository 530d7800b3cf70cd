use std::num::NonZeroUsize;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use url::Url;

use crate::domain::TestWindow;
use crate::error::HttpError;
use crate::metrics::RequestRecord;
use crate::shutdown::ShutdownSender;

use super::client::build_probe_client;
use super::worker::RequestWorker;

/// A pool of symmetric [`RequestWorker`]s sharing one pooled client.
#[derive(Debug, Clone)]
pub struct LoadGenerator {
    client: Client,
    url: Url,
    connections: NonZeroUsize,
}

impl LoadGenerator {
    /// # Errors
    ///
    /// Returns an error when the probe client cannot be built.
    pub fn from_window(window: &TestWindow) -> Result<Self, HttpError> {
        let connections = NonZeroUsize::new(window.connections()).unwrap_or(NonZeroUsize::MIN);
        let client = build_probe_client(connections.get())?;
        Ok(Self::with_client(client, window.url().clone(), connections))
    }

    #[must_use]
    pub const fn with_client(client: Client, url: Url, connections: NonZeroUsize) -> Self {
        Self {
            client,
            url,
            connections,
        }
    }

    /// Starts every worker and returns a handle resolving to the combined
    /// records once all of them have delivered their batch.
    ///
    /// Workers subscribe to `shutdown_tx` before this returns, so a signal
    /// sent afterwards is never missed.
    pub fn spawn(self, shutdown_tx: &ShutdownSender) -> JoinHandle<Vec<RequestRecord>> {
        let connections = self.connections.get();
        let (batch_tx, mut batch_rx) = mpsc::channel::<Vec<RequestRecord>>(connections);
        let mut worker_handles = Vec::with_capacity(connections);

        for worker_id in 0..connections {
            let worker =
                RequestWorker::new(self.client.clone(), self.url.clone(), shutdown_tx.subscribe());
            let batch_tx = batch_tx.clone();
            worker_handles.push(tokio::spawn(async move {
                let batch = worker.run().await;
                debug!("Worker {} finished after {} requests.", worker_id, batch.len());
                if batch_tx.send(batch).await.is_err() {
                    error!("Worker {} could not deliver its batch.", worker_id);
                }
            }));
        }
        drop(batch_tx);

        tokio::spawn(async move {
            let mut records = Vec::new();
            while let Some(batch) = batch_rx.recv().await {
                records.extend(batch);
            }
            for handle in worker_handles {
                if let Err(err) = handle.await {
                    error!("Worker task failed: {}", err);
                }
            }
            records
        })
    }
}
