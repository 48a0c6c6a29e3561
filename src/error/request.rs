use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Discriminant of a [`RequestError`], used as the key of per-kind tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connect,
    ResponseTimeout,
    Response,
    Receive,
    Length,
    Exception,
}

impl FailureKind {
    pub const ALL: [Self; 6] = [
        Self::Connect,
        Self::ResponseTimeout,
        Self::Response,
        Self::Receive,
        Self::Length,
        Self::Exception,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ResponseTimeout => "response_timeout",
            Self::Response => "response",
            Self::Receive => "receive",
            Self::Length => "length",
            Self::Exception => "exception",
        }
    }

    /// Label used in the text report's failure breakdown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::ResponseTimeout => "Response timeout",
            Self::Response => "Response",
            Self::Receive => "Receive",
            Self::Length => "Length",
            Self::Exception => "Exceptions",
        }
    }
}

/// Classified failure of a single job. Recovered inside the worker and
/// carried on its outcome; never escapes the send pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Connection failed after {attempts} attempts: {message}")]
    Connect { attempts: u32, message: String },
    #[error("No response within {}ms.", timeout.as_millis())]
    ResponseTimeout { timeout: Duration },
    #[error("Unexpected response status {status}.")]
    Response { status: u16 },
    #[error("Failed to read response body: {message}")]
    Receive { message: String },
    #[error("Response body ended after {read} of {expected} bytes.")]
    Length { read: u64, expected: u64 },
    #[error("Request task failed: {message}")]
    Exception { message: String },
}

impl RequestError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Connect { .. } => FailureKind::Connect,
            Self::ResponseTimeout { .. } => FailureKind::ResponseTimeout,
            Self::Response { .. } => FailureKind::Response,
            Self::Receive { .. } => FailureKind::Receive,
            Self::Length { .. } => FailureKind::Length,
            Self::Exception { .. } => FailureKind::Exception,
        }
    }
}

/// Failure of one transport attempt, before any response was produced.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("{message}")]
    Connect { message: String },
    #[error("{message}")]
    Timeout { message: String },
    #[error("{message}")]
    Other { message: String },
}

impl SendError {
    /// Only connection-level failures are retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout { message }
        } else if err.is_builder() {
            Self::Other { message }
        } else {
            Self::Connect { message }
        }
    }
}
