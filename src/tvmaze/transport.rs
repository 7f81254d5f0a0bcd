//! HTTP transport used by the TVMaze client
//!
//! The client only needs a blocking `GET url -> (status, body)`. Putting that
//! behind a trait lets tests answer requests from memory.

use thiserror::Error;

use super::TvMazeError;
use crate::config::ClientConfig;

/// Errors raised when a request does not produce an HTTP response
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),

    /// The connection could not be established (refused, DNS failure, ...)
    #[error("connection failed: {0}")]
    Connect(reqwest::Error),

    /// Any other failure reported by reqwest, including reading the body
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Failure reported by a custom transport
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error)
        } else if error.is_connect() {
            TransportError::Connect(error)
        } else {
            TransportError::Http(error)
        }
    }
}

/// Raw HTTP response: status code and undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A blocking HTTP GET capability.
///
/// Implementations must return every HTTP response, whatever its status, as
/// `Ok`; `Err` is reserved for requests that produced no response at all.
pub trait HttpTransport {
    /// Performs a GET request against a fully assembled URL.
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url)
    }
}

/// Transport backed by `reqwest::blocking::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport using the timeout and user agent of `config`
    ///
    /// # Errors
    ///
    /// Returns `TvMazeError::InvalidConfig` if the underlying HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TvMazeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TvMazeError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_new() {
        let response = HttpResponse::new(200, "{}");
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{}".to_vec());
    }

    #[test]
    fn test_reqwest_transport_builds_from_default_config() {
        assert!(ReqwestTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_other_error_display() {
        let error = TransportError::Other("socket closed".to_string());
        assert_eq!(error.to_string(), "socket closed");
    }
}
