//! Reachability probing for connection candidates.
//!
//! A probe is one bounded GET against a candidate's root resource, classified
//! into a [`ConnectionState`]. Nothing here retries or schedules; sweep
//! cadence and retry policy belong to the embedding client.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::connection::candidate::ConnectionCandidate;
use crate::connection::traits::{ServerMetadata, Transport};
use crate::connection::transport::TransportError;
use crate::connection::types::ConnectionState;
use crate::protocol_constants::ACCESS_TOKEN_PARAM;

/// Probes candidates and records the verdicts on them.
///
/// One prober serves any number of candidates and owns no per-candidate
/// state. Cancelling aborts every in-flight probe; aborted probes classify
/// as [`ConnectionState::Unknown`], which is inconclusive rather than a
/// negative verdict.
pub struct ReachabilityProber {
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
}

impl ReachabilityProber {
    /// Creates a prober with its own cancellation token.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_cancellation(transport, CancellationToken::new())
    }

    /// Creates a prober tied to an externally owned cancellation token.
    pub fn with_cancellation(transport: Arc<dyn Transport>, cancel: CancellationToken) -> Self {
        Self { transport, cancel }
    }

    /// Aborts every in-flight probe.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Probes one candidate and stores the verdict on it.
    ///
    /// Sends a single GET to the candidate's root resource, borrowing one of
    /// `server`'s tokens when the candidate has none, and classifies the
    /// outcome:
    ///
    /// - body recognized by `server`: [`ConnectionState::Reachable`]
    /// - body not recognized, HTTP failure, network failure:
    ///   [`ConnectionState::Unreachable`]
    /// - HTTP 401: [`ConnectionState::Unauthorized`]
    /// - cancelled mid-flight: [`ConnectionState::Unknown`]
    pub async fn probe(
        &self,
        candidate: &mut ConnectionCandidate,
        server: &dyn ServerMetadata,
    ) -> ConnectionState {
        let state = self.classify(candidate, server).await;
        candidate.set_state(state);
        state
    }

    /// Probes every candidate concurrently.
    ///
    /// Returns one verdict per candidate in input order; each verdict is also
    /// stored on its candidate, exactly as with [`Self::probe`].
    pub async fn probe_all(
        &self,
        candidates: &mut [ConnectionCandidate],
        server: &dyn ServerMetadata,
    ) -> Vec<ConnectionState> {
        join_all(
            candidates
                .iter_mut()
                .map(|candidate| self.probe(candidate, server)),
        )
        .await
    }

    async fn classify(
        &self,
        candidate: &ConnectionCandidate,
        server: &dyn ServerMetadata,
    ) -> ConnectionState {
        let mut url = match candidate.build_url("/") {
            Ok(url) => url,
            Err(e) => {
                log::warn!("[Probe] Skipping {}: {}", candidate.plain_url(), e);
                return ConnectionState::Unreachable;
            }
        };

        // Candidates fresh from discovery carry no token; borrow one of the
        // server's for this probe only.
        if candidate.token().is_empty() && server.has_auth_token() {
            url.query_pairs_mut()
                .append_pair(ACCESS_TOKEN_PARAM, &server.any_token());
        }

        match self.transport.get(url, &self.cancel).await {
            Ok(body) => {
                if server.collect_from_root(&body) {
                    ConnectionState::Reachable
                } else {
                    log::debug!(
                        "[Probe] {} answered but was not recognized",
                        candidate.plain_url()
                    );
                    ConnectionState::Unreachable
                }
            }
            Err(TransportError::Cancelled) => ConnectionState::Unknown,
            Err(TransportError::Status(401)) => ConnectionState::Unauthorized,
            Err(e) => {
                log::debug!("[Probe] {} unreachable: {}", candidate.plain_url(), e);
                ConnectionState::Unreachable
            }
        }
    }
}
