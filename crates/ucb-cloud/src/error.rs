//! Error types for remote build-service calls.

use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

/// Failure talking to the remote build service.
///
/// Every request-level variant records the method and URL of the failing call so
/// the top-level handler can report them.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or the response body could not be read.
    #[error("{method} {url} failed: {source}")]
    Transport {
        /// HTTP method of the failing request.
        method: Method,
        /// Target URL of the failing request.
        url: Url,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{method} {url} returned {status}{}", body_suffix(.body))]
    Status {
        /// HTTP method of the failing request.
        method: Method,
        /// Target URL of the failing request.
        url: Url,
        /// Status returned by the service.
        status: StatusCode,
        /// Trimmed response body, possibly empty.
        body: String,
    },
    /// The response body did not have the expected shape.
    #[error("{method} {url} returned an unexpected payload: {detail}")]
    Decode {
        /// HTTP method of the failing request.
        method: Method,
        /// Target URL of the failing request.
        url: Url,
        /// What was wrong with the payload.
        detail: String,
    },
    /// The configured endpoint cannot carry path segments.
    #[error("invalid API endpoint '{endpoint}'")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// A default header value contained invalid characters.
    #[error("header {header} contains invalid characters")]
    InvalidHeader {
        /// Header name.
        header: &'static str,
    },
}

impl RemoteError {
    /// Method and URL of the request that failed, when the failure is request-level.
    #[must_use]
    pub const fn request(&self) -> Option<(&Method, &Url)> {
        match self {
            Self::Transport { method, url, .. }
            | Self::Status { method, url, .. }
            | Self::Decode { method, url, .. } => Some((method, url)),
            Self::InvalidEndpoint { .. } | Self::Client { .. } | Self::InvalidHeader { .. } => {
                None
            }
        }
    }

    /// Status returned by the service, if the failure was a non-success response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Convenience alias for remote results.
pub type RemoteResult<T> = Result<T, RemoteError>;
