use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid docker host '{host}'. Use unix://, tcp://, http:// or https://.")]
    InvalidHost { host: String },
    #[error("Invalid docker endpoint '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Docker host '{host}' cannot carry a request path.")]
    EndpointNotBase { host: String },
    #[error("Unix socket docker hosts are not supported on this platform.")]
    UnixSocketUnsupported,
    #[error("Failed to build docker client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Docker request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Container '{id}' not found.")]
    NotFound { id: String },
    #[error("Docker {endpoint} returned HTTP {status}.")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },
    #[error("Failed to decode docker {endpoint} payload: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Stats stream failed: {source}")]
    Stream {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Stats stream ended mid-frame ({pending} bytes pending).")]
    TruncatedFrame { pending: usize },
}
