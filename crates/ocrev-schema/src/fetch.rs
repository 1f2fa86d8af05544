//! Extension patch fetching.
//!
//! Extensions are declared by URL and fetched over HTTP with a bounded
//! timeout. The fetcher is a trait seam so the applier can be exercised
//! without a network; the production implementation wraps a blocking
//! `reqwest` client.
//!
//! Failure kinds are deliberately distinct: protocol and status problems are
//! not the same finding as a patch that downloads fine but is not JSON.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Why an extension could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    /// The URL scheme is not fetchable (only http/https are supported).
    #[error("unsupported URL scheme in '{url}'")]
    UnsupportedProtocol {
        /// The offending URL.
        url: String,
    },

    /// The request could not complete: connection failure, DNS, or timeout.
    /// A timeout is treated identically to any other transport failure.
    #[error("request failed: {detail}")]
    Transport {
        /// Transport diagnostic.
        detail: String,
    },

    /// The server answered with a non-2xx status.
    #[error("server responded with HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body is not a JSON object patch.
    #[error("extension patch is not valid JSON: {detail}")]
    Parse {
        /// Parser diagnostic.
        detail: String,
    },
}

/// Fetches one extension patch by URL.
pub trait ExtensionFetcher {
    /// Fetch and parse the patch at `url`.
    fn fetch(&self, url: &str) -> Result<Value, FetchFailure>;
}

/// Production fetcher: blocking HTTP GET with a bounded timeout.
#[derive(Debug)]
pub struct HttpExtensionFetcher {
    client: reqwest::blocking::Client,
}

impl HttpExtensionFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchFailure> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchFailure::Transport {
                detail: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl ExtensionFetcher for HttpExtensionFetcher {
    fn fetch(&self, url: &str) -> Result<Value, FetchFailure> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchFailure::UnsupportedProtocol { url: url.to_owned() });
        }

        let response = self.client.get(url).send().map_err(|e| {
            let detail = if e.is_timeout() {
                "request timed out".to_owned()
            } else {
                e.to_string()
            };
            FetchFailure::Transport { detail }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status { status: status.as_u16() });
        }

        response
            .json::<Value>()
            .map_err(|e| FetchFailure::Parse { detail: e.to_string() })
    }
}

/// In-memory fetcher for tests and offline runs.
///
/// Maps URLs to canned outcomes; unknown URLs report a transport failure.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Result<Value, FetchFailure>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patch served for `url`.
    pub fn with_patch(mut self, url: &str, patch: Value) -> Self {
        self.responses.insert(url.to_owned(), Ok(patch));
        self
    }

    /// Register a canned failure for `url`.
    pub fn with_failure(mut self, url: &str, failure: FetchFailure) -> Self {
        self.responses.insert(url.to_owned(), Err(failure));
        self
    }
}

impl ExtensionFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Value, FetchFailure> {
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchFailure::Transport { detail: format!("no route to {url}") })
        })
    }
}
