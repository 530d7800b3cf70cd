use std::num::NonZeroUsize;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// The configuration governing one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestWindow {
    url: Url,
    container: Option<String>,
    connections: NonZeroUsize,
    duration: Duration,
}

impl TestWindow {
    /// Builds a window, validating the target URL and the nominal duration.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or is not http(s), or when
    /// the duration is zero.
    pub fn new(
        url: &str,
        container: Option<String>,
        connections: NonZeroUsize,
        duration: Duration,
    ) -> AppResult<Self> {
        let parsed = Url::parse(url).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: url.to_owned(),
                source: err,
            })
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::http(HttpError::UnsupportedScheme {
                scheme: parsed.scheme().to_owned(),
            }));
        }
        if duration.is_zero() {
            return Err(AppError::validation(ValidationError::DurationZero));
        }
        let container = container.filter(|name| !name.trim().is_empty());
        Ok(Self {
            url: parsed,
            container,
            connections,
            duration,
        })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    #[must_use]
    pub const fn connections(&self) -> usize {
        self.connections.get()
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connections(value: usize) -> Result<NonZeroUsize, String> {
        NonZeroUsize::new(value).ok_or_else(|| "connections must be > 0".to_owned())
    }

    #[test]
    fn rejects_non_http_scheme() -> Result<(), String> {
        let result = TestWindow::new(
            "ftp://localhost/file",
            None,
            connections(1)?,
            Duration::from_secs(1),
        );
        match result {
            Err(AppError::Http(HttpError::UnsupportedScheme { scheme })) if scheme == "ftp" => {
                Ok(())
            }
            other => Err(format!("Expected unsupported scheme, got {:?}", other)),
        }
    }

    #[test]
    fn rejects_zero_duration() -> Result<(), String> {
        let result = TestWindow::new("http://localhost", None, connections(1)?, Duration::ZERO);
        if matches!(result, Err(AppError::Validation(ValidationError::DurationZero))) {
            Ok(())
        } else {
            Err(format!("Expected zero duration error, got {:?}", result))
        }
    }

    #[test]
    fn blank_container_is_treated_as_absent() -> Result<(), String> {
        let window = TestWindow::new(
            "http://localhost:8080/health",
            Some("  ".to_owned()),
            connections(4)?,
            Duration::from_secs(2),
        )
        .map_err(|err| err.to_string())?;
        if window.container().is_some() {
            return Err("Expected blank container to be dropped".to_owned());
        }
        if window.connections() != 4 {
            return Err(format!("Unexpected connections {}", window.connections()));
        }
        Ok(())
    }
}
