//! Trait abstractions for the connection core's collaborators.
//!
//! The prober talks to the network through [`Transport`] and learns about the
//! server it is probing through [`ServerMetadata`]. Both seams exist so tests
//! can script outcomes without sockets and so embedders can substitute their
//! own HTTP machinery;
//! [`HttpTransport`](crate::connection::transport::HttpTransport) is the
//! stock implementation.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::connection::transport::TransportResult;

/// Minimal HTTP GET surface the prober needs.
///
/// Implementations perform exactly one bounded request per call: a fixed
/// timeout, the structured-response `Accept` header, no retries. Failures
/// surface as [`TransportError`](crate::connection::transport::TransportError)
/// values so the prober can classify outcomes without knowing which HTTP
/// stack produced them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`, racing the request against `cancel`.
    async fn get(&self, url: Url, cancel: &CancellationToken) -> TransportResult<String>;
}

/// What the prober needs to know about the logical server behind a candidate.
///
/// One implementation exists per logical server and is shared across
/// concurrent probes of that server's candidates, so implementors take
/// `&self` and synchronize internally.
pub trait ServerMetadata: Send + Sync {
    /// True when at least one usable access token is on file for this server.
    fn has_auth_token(&self) -> bool;

    /// Returns a token usable with this server, or an empty string.
    ///
    /// Consulted only when a candidate carries no token of its own; the
    /// borrowed token authenticates that single probe and is never stored on
    /// the candidate.
    fn any_token(&self) -> String;

    /// Inspects a root-resource response body and reports whether it belongs
    /// to this server.
    ///
    /// Implementations typically parse the body and absorb whatever server
    /// details it carries as a side effect; only the verdict matters here.
    fn collect_from_root(&self, body: &str) -> bool;
}
