//! Client configuration
//!
//! Settings are fixed when a client is constructed. Defaults target the public
//! TVMaze API and can be overridden through environment variables, which is
//! mostly useful for pointing the client at a mock server.

use std::time::Duration;

use crate::tvmaze::TvMazeError;

/// Default base URL of the TVMaze API
pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "TVMAZE_API_BASE_URL";

/// Environment variable overriding the request timeout, in whole seconds
pub const TIMEOUT_ENV: &str = "TVMAZE_API_TIMEOUT_SECS";

/// Configuration for a [`TvMazeClient`](crate::TvMazeClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the defaults and the process environment
    ///
    /// Recognized variables are `TVMAZE_API_BASE_URL` and
    /// `TVMAZE_API_TIMEOUT_SECS`. Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns `TvMazeError::InvalidConfig` if the timeout is not a positive
    /// integer.
    pub fn from_env() -> Result<Self, TvMazeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, TvMazeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout = parse_timeout_secs(&raw)?;
        }

        Ok(config)
    }

    /// Replaces the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL without trailing slashes, after checking that it
    /// is an absolute http(s) URL
    pub(crate) fn normalized_base_url(&self) -> Result<String, TvMazeError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');

        let parsed = reqwest::Url::parse(trimmed).map_err(|e| {
            TvMazeError::InvalidConfig(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TvMazeError::InvalidConfig(format!(
                "base URL '{}' must use http or https",
                self.base_url
            )));
        }

        Ok(trimmed.to_string())
    }
}

/// Parses a timeout given in whole seconds
fn parse_timeout_secs(raw: &str) -> Result<Duration, TvMazeError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(TvMazeError::InvalidConfig(format!(
            "timeout must be a positive number of seconds, got '{}'",
            raw
        ))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}
