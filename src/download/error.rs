//! Error types for the download module.
//!
//! Each variant carries the URL or path it failed on so adapters can show
//! a useful message without extra context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a lesson.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response for the lesson page or the media file.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The lesson page has no audio element with a source.
    #[error("Audio not found on lesson page {page_url}")]
    MediaNotFound {
        /// The lesson page that was scanned.
        page_url: String,
    },

    /// A page or media URL could not be built or resolved.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
    },

    /// File system error (create directory, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

impl DownloadError {
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

    /// Creates a media-not-found error.
    pub fn media_not_found(page_url: impl Into<String>) -> Self {
        Self::MediaNotFound {
            page_url: page_url.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the lesson page had no playable audio.
    #[must_use]
    pub fn is_media_not_found(&self) -> bool {
        matches!(self, Self::MediaNotFound { .. })
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs
// the URL or path, which the source errors do not carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_not_found_display_and_predicate() {
        let error = DownloadError::media_not_found("https://meirtv.com/shiurim/1/");
        let msg = error.to_string();
        assert!(msg.contains("Audio not found"), "Expected reason in: {msg}");
        assert!(msg.contains("/shiurim/1/"), "Expected page URL in: {msg}");
        assert!(error.is_media_not_found());
    }

    #[test]
    fn test_http_status_display() {
        let error = DownloadError::http_status("https://cdn/a.mp3", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://cdn/a.mp3"), "Expected URL in: {msg}");
        assert!(!error.is_media_not_found());
    }

    #[test]
    fn test_io_display_includes_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/rav/series/001-a.mp3"), io_error);
        assert!(error.to_string().contains("/tmp/rav/series/001-a.mp3"));
    }

    #[test]
    fn test_invalid_url_display() {
        let msg = DownloadError::invalid_url("::bad").to_string();
        assert!(msg.contains("invalid URL"));
        assert!(msg.contains("::bad"));
    }
}
