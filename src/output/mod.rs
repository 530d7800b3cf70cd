//! The persisted unit of one run: window metadata, raw records, and summary.
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::domain::TestWindow;
use crate::error::AppResult;
use crate::metrics::{RequestRecord, ResourceSample, Summary};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub timestamp: DateTime<Utc>,
    pub url: String,
    pub duration_ms: u64,
    pub connections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl RunMetadata {
    #[must_use]
    pub fn from_window(window: &TestWindow, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            url: window.url().to_string(),
            duration_ms: u64::try_from(window.duration().as_millis()).unwrap_or(u64::MAX),
            connections: window.connections(),
            container_name: window.container().map(str::to_owned),
        }
    }

    /// Same target, connection count, and duration. Timestamps and the
    /// container are ignored.
    #[must_use]
    pub fn is_similar(&self, other: &Self) -> bool {
        self.url == other.url
            && self.connections == other.connections
            && self.duration_ms == other.duration_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub metadata: RunMetadata,
    pub http_stats: Vec<RequestRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docker_stats: Vec<ResourceSample>,
    pub summary: Summary,
}

impl RunOutput {
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not a run output.
    pub async fn read_from_path(path: &Path) -> AppResult<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}
