//! Error types for grid queries.

use thiserror::Error;

/// Errors from querying the grid endpoint.
///
/// Extraction never fails, so every variant is a transport or configuration
/// problem. There are no retries; callers surface these directly.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Connection, DNS or TLS failure.
    #[error("network error querying {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request did not complete within the read timeout.
    #[error("timeout querying {url}")]
    Timeout { url: String },

    /// Non-success HTTP status.
    #[error("HTTP {status} querying {url}")]
    HttpStatus { url: String, status: u16 },

    /// Body was not the expected JSON envelope.
    #[error("invalid response body from {url}: {reason}")]
    InvalidBody { url: String, reason: String },

    /// Configured site base URL cannot be used.
    #[error("invalid site base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl QueryError {
    /// Classifies a reqwest error: timeouts get their own variant.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid-body error.
    pub fn invalid_body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBody {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid base URL error.
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }
}
