//! Default HTTP transport and the transport error/config types.
//!
//! [`HttpTransport`] is the stock [`Transport`] implementation: one bounded
//! GET per call through a shared `reqwest` client, with cancellation raced
//! against every await point so an abort always classifies as
//! [`TransportError::Cancelled`] rather than as a network failure.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::connection::traits::Transport;
use crate::protocol_constants::{PROBE_ACCEPT, PROBE_TIMEOUT_SECS};

/// Errors surfaced by [`Transport`] implementations.
///
/// Variants carry plain data rather than wrapping `reqwest::Error` so
/// scripted transports in tests can construct every one of them;
/// [`HttpTransport`] maps the HTTP stack's errors at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request failed below HTTP: connect, DNS, TLS, or timeout.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Convenient Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Tunables for [`HttpTransport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `Accept` header value sent with every request.
    pub accept: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: PROBE_TIMEOUT_SECS,
            accept: PROBE_ACCEPT.to_string(),
        }
    }
}

impl TransportConfig {
    /// Validates the configuration, returning a description of the first
    /// problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.accept.is_empty() {
            return Err("accept must not be empty".to_string());
        }
        Ok(())
    }
}

/// Stock [`Transport`] backed by a shared `reqwest` client.
pub struct HttpTransport {
    client: Client,
    accept: String,
}

impl HttpTransport {
    /// Creates a transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport from `config`.
    ///
    /// Falls back to the default client (with a logged warning) if the
    /// builder rejects the configuration; probes then run without the
    /// configured timeout rather than not at all.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!(
                    "[Probe] Failed to build HTTP client with custom timeout: {}. Using default.",
                    e
                );
                Client::default()
            });
        Self {
            client,
            accept: config.accept,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url, cancel: &CancellationToken) -> TransportResult<String> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, self.accept.as_str())
            .send();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            result = request => {
                result.map_err(|e| TransportError::Connection(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            result = response.text() => {
                result.map_err(|e| TransportError::Connection(e.to_string()))?
            }
        };

        Ok(body)
    }
}
