//! Shared HTTP client construction for query and download traffic.
//!
//! Both clients share one policy: browser User-Agent, gzip and explicit
//! timeouts. Callers add their own default headers.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::user_agent::BROWSER_USER_AGENT;

/// Connect/read timeouts for one client, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Connection establishment timeout.
    pub connect_secs: u64,
    /// Whole-request timeout, body included.
    pub read_secs: u64,
}

impl HttpTimeouts {
    /// Defaults for grid queries: small JSON/HTML payloads.
    pub const QUERY: Self = Self {
        connect_secs: 10,
        read_secs: 30,
    };

    /// Defaults for downloads: audio files run to tens of megabytes.
    pub const DOWNLOAD: Self = Self {
        connect_secs: 30,
        read_secs: 300,
    };

    /// Builds timeouts from explicit values.
    #[must_use]
    pub fn new(connect_secs: u64, read_secs: u64) -> Self {
        Self {
            connect_secs,
            read_secs,
        }
    }
}

/// Builds a client with the site policy and the given default headers.
///
/// # Errors
///
/// Returns the builder error when reqwest rejects the configuration (e.g.
/// TLS backend initialization failure).
pub fn build_site_client(
    timeouts: HttpTimeouts,
    default_headers: HeaderMap,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.read_secs))
        .gzip(true)
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::{HeaderValue, REFERER};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;

    #[test]
    fn test_default_timeouts() {
        assert_eq!(HttpTimeouts::QUERY, HttpTimeouts::new(10, 30));
        assert_eq!(HttpTimeouts::DOWNLOAD, HttpTimeouts::new(30, 300));
    }

    #[test]
    fn test_build_site_client_succeeds_with_empty_headers() {
        assert!(build_site_client(HttpTimeouts::QUERY, HeaderMap::new()).is_ok());
    }

    #[tokio::test]
    async fn test_site_client_sends_user_agent_and_default_headers() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("user-agent", BROWSER_USER_AGENT))
            .and(header("referer", "https://meirtv.com/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://meirtv.com/"));
        let client = build_site_client(HttpTimeouts::new(5, 5), headers).unwrap();
        let response = client
            .get(format!("{}/ping", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}
