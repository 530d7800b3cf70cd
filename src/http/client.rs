use std::time::Duration;

use reqwest::Client;

use crate::error::HttpError;

/// Per-request ceiling for probes, independent of the test window.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
/// Ceiling for the single reachability check before a run.
pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the pooled client shared by every worker of one run.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_probe_client(connections: usize) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(PROBE_TIMEOUT)
        .pool_max_idle_per_host(connections)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}

/// Builds the short-lived client used for the preflight reachability check.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_preflight_client() -> Result<Client, HttpError> {
    Client::builder()
        .timeout(PREFLIGHT_TIMEOUT)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}
