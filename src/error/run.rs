use thiserror::Error;

use super::{ContainerError, HttpError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Preflight HTTP check against '{url}' failed: {source}")]
    TargetUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Preflight container check failed: {source}")]
    ContainerCheck {
        #[source]
        source: ContainerError,
    },
    #[error("Preflight container check failed: container '{id}' is not running.")]
    ContainerNotRunning { id: String },
    #[error("Failed to prepare load generator: {source}")]
    Setup {
        #[source]
        source: HttpError,
    },
    #[error("{task} task failed: {source}")]
    TaskJoin {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl RunError {
    /// True for failures raised before any load was generated.
    #[must_use]
    pub const fn is_preflight(&self) -> bool {
        matches!(
            self,
            RunError::TargetUnreachable { .. }
                | RunError::ContainerCheck { .. }
                | RunError::ContainerNotRunning { .. }
                | RunError::Setup { .. }
        )
    }
}
