//! HTTP transport for the crawler
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeouts and compression
//! - Sending GET requests with the configured headers
//! - Error classification into [`TransportError`]
//!
//! Status codes are not interpreted here: any response that arrives is
//! returned as a [`FetchResponse`] and the crawler decides what counts as a
//! failure.

use crate::TransportError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// A response received from the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Decoded page body
    pub body: String,
}

/// Abstraction over "perform a GET and return status + body"
///
/// The crawler only talks to the network through this trait, so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResponse, TransportError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use link_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| classify_error(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchResponse { status, body })
    }
}

/// Maps a reqwest error onto the transport error kinds
fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_client_with_short_timeout() {
        let client = build_http_client(Duration::from_millis(50));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_connect_error_classified() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();

        // Port 9 on localhost is almost never listening
        let result = transport
            .fetch("http://127.0.0.1:9/", &HashMap::new())
            .await;

        match result {
            Err(TransportError::Connect { url, .. }) => assert_eq!(url, "http://127.0.0.1:9/"),
            Err(TransportError::Timeout { .. }) => {}
            other => panic!("expected a connection failure, got {:?}", other),
        }
    }
}
