//! Container runtime access and the streaming resource sampler.
mod decode;
mod docker;
mod frame;
mod sampler;


use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::ContainerError;

pub use decode::decode_frames;
pub use docker::{DEFAULT_DOCKER_HOST, DOCKER_HOST_ENV, DockerClient};
pub use frame::{
    BlkioEntry, BlkioStats, CpuStats, CpuUsage, MemoryDetail, MemoryStats, PidsStats, StatsFrame,
};
pub use sampler::{ResourceSampler, SampleConverter};

/// A live, decoded statistics feed for one container.
pub type StatsStream = BoxStream<'static, Result<StatsFrame, ContainerError>>;

/// The two platform capabilities a run needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the container cannot be inspected.
    async fn is_running(&self, id: &str) -> Result<bool, ContainerError>;

    /// Opens the streaming statistics feed. The returned stream is owned
    /// exclusively by its caller; dropping it closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error when the feed cannot be opened.
    async fn open_stats(&self, id: &str) -> Result<StatsStream, ContainerError>;
}
