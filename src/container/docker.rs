use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ContainerError;

use super::{ContainerRuntime, StatsStream, decode_frames};

pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";
pub const DEFAULT_DOCKER_HOST: &str = "unix:///var/run/docker.sock";

const INSPECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Host used in request URLs when the transport is a unix socket; the engine
/// ignores it.
const UNIX_SOCKET_BASE: &str = "http://localhost/";

#[derive(Debug, Deserialize)]
struct InspectBody {
    #[serde(rename = "State")]
    state: InspectState,
}

#[derive(Debug, Deserialize)]
struct InspectState {
    #[serde(rename = "Running", default)]
    running: bool,
}

/// Docker Engine API client over a unix socket or plain TCP.
#[derive(Debug, Clone)]
pub struct DockerClient {
    client: Client,
    base: Url,
}

impl DockerClient {
    /// Connects using `DOCKER_HOST`, or the default local socket.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is malformed or the client cannot be
    /// built.
    pub fn from_env() -> Result<Self, ContainerError> {
        let host = std::env::var(DOCKER_HOST_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOCKER_HOST.to_owned());
        Self::connect(&host)
    }

    /// Accepts `unix://PATH`, `tcp://HOST:PORT`, `http://…` and `https://…`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is malformed, uses an unsupported
    /// scheme, or the client cannot be built.
    pub fn connect(host: &str) -> Result<Self, ContainerError> {
        let builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);

        if let Some(path) = host.strip_prefix("unix://") {
            #[cfg(unix)]
            {
                return Self::finish(
                    builder.unix_socket(std::path::PathBuf::from(path)),
                    UNIX_SOCKET_BASE,
                    host,
                );
            }
            #[cfg(not(unix))]
            {
                drop((builder, path));
                return Err(ContainerError::UnixSocketUnsupported);
            }
        }
        if let Some(rest) = host.strip_prefix("tcp://") {
            return Self::finish(builder, &format!("http://{}", rest), host);
        }
        if host.starts_with("http://") || host.starts_with("https://") {
            return Self::finish(builder, host, host);
        }
        Err(ContainerError::InvalidHost {
            host: host.to_owned(),
        })
    }

    fn finish(builder: ClientBuilder, base: &str, host: &str) -> Result<Self, ContainerError> {
        let base = Url::parse(base).map_err(|err| ContainerError::InvalidEndpoint {
            url: base.to_owned(),
            source: err,
        })?;
        if base.cannot_be_a_base() {
            return Err(ContainerError::EndpointNotBase {
                host: host.to_owned(),
            });
        }
        let client = builder
            .build()
            .map_err(|err| ContainerError::BuildClientFailed { source: err })?;
        debug!("Docker API client targets {}", host);
        Ok(Self { client, base })
    }

    fn endpoint(&self, id: &str, leaf: &str) -> Result<Url, ContainerError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ContainerError::EndpointNotBase {
                host: self.base.to_string(),
            })?
            .pop_if_empty()
            .extend(["containers", id, leaf]);
        Ok(url)
    }
}

fn check_status(
    response: Response,
    endpoint: &'static str,
    id: &str,
) -> Result<Response, ContainerError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ContainerError::NotFound { id: id.to_owned() });
    }
    if !status.is_success() {
        return Err(ContainerError::UnexpectedStatus {
            endpoint,
            status: status.as_u16(),
        });
    }
    Ok(response)
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn is_running(&self, id: &str) -> Result<bool, ContainerError> {
        let response = self
            .client
            .get(self.endpoint(id, "json")?)
            .timeout(INSPECT_TIMEOUT)
            .send()
            .await
            .map_err(|err| ContainerError::Request {
                endpoint: "inspect",
                source: err,
            })?;
        let body = check_status(response, "inspect", id)?
            .bytes()
            .await
            .map_err(|err| ContainerError::Request {
                endpoint: "inspect",
                source: err,
            })?;
        let inspect: InspectBody =
            serde_json::from_slice(&body).map_err(|err| ContainerError::Decode {
                endpoint: "inspect",
                source: err,
            })?;
        Ok(inspect.state.running)
    }

    async fn open_stats(&self, id: &str) -> Result<StatsStream, ContainerError> {
        let mut url = self.endpoint(id, "stats")?;
        url.query_pairs_mut().append_pair("stream", "true");

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|err| ContainerError::Request {
                    endpoint: "stats",
                    source: err,
                })?;
        let response = check_status(response, "stats", id)?;
        Ok(decode_frames(response.bytes_stream()))
    }
}
