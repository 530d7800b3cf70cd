use std::error::Error as StdError;

use crate::metrics::FailureKind;

/// Maps a transport error message onto a [`FailureKind`]. Matching is
/// case-insensitive except for `EOF`, which must appear upper-case so words
/// such as "geoffrey" do not count. The first rule that matches wins.
#[must_use]
pub fn classify_failure(raw: &str) -> FailureKind {
    let message = raw.to_ascii_lowercase();
    if message.contains("connection refused") {
        FailureKind::ConnectionRefused
    } else if message.contains("timeout") || message.contains("timed out") {
        FailureKind::Timeout
    } else if message.contains("no such host")
        || message.contains("dns error")
        || message.contains("failed to lookup address")
    {
        FailureKind::DnsError
    } else if raw.contains("EOF")
        || message.contains("connection reset")
        || message.contains("connection closed")
        || message.contains("end of file")
    {
        FailureKind::ConnectionReset
    } else {
        FailureKind::Unknown
    }
}

/// Classifies a `reqwest` error by its whole source chain; the top-level
/// message alone rarely names the underlying socket failure.
#[must_use]
pub fn classify_error(err: &reqwest::Error) -> FailureKind {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }

    let kind = classify_failure(&message);
    if kind == FailureKind::Unknown && err.is_timeout() {
        FailureKind::Timeout
    } else {
        kind
    }
}
