//! TVMaze API access.
//!
//! This module provides the blocking [`TvMazeClient`], the transport seam it
//! issues requests through, and the error type shared by every operation.
mod client;
mod transport;
mod types;

pub use client::TvMazeClient;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use types::{
    Embed, Episode, Network, Season, Show, ShowUpdates, UpdatePeriod, Webchannel,
};

use thiserror::Error;

/// Errors that can occur while talking to the TVMaze API.
///
/// A 404 from the provider is not an error: lookups return `None` and list
/// operations return an empty collection instead.
#[derive(Debug, Error)]
pub enum TvMazeError {
    /// The caller passed a value outside the accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider answered with a status other than 2xx or 404
    #[error("Request to {url} failed with HTTP {status}: {body}")]
    Request {
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced an HTTP response
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        source: TransportError,
    },

    /// The response body was not the JSON we expected
    #[error("Failed to decode response from {url}: {source} (body starts with: {snippet})")]
    Decode {
        url: String,
        snippet: String,
        source: serde_json::Error,
    },

    /// The client could not be configured
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TvMazeError {
    /// HTTP status carried by a `Request` error
    pub fn status(&self) -> Option<u16> {
        match self {
            TvMazeError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the provider rejected the request with HTTP 429
    ///
    /// The client does not throttle; callers seeing this should slow down.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}
