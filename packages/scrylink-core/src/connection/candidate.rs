//! Connection candidates: endpoint records for one logical media server.
//!
//! A candidate pairs a network endpoint (scheme/host/port) with everything the
//! client has learned about it: where it was found, which access token
//! applies, and whether the last probe could reach it. The same server is
//! routinely reported by several sources at once; [`reconcile_candidates`]
//! folds the duplicates together so each distinct endpoint is tracked and
//! probed exactly once.

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::connection::types::{ConnectionOrigin, ConnectionState, OriginSet};
use crate::protocol_constants::{ACCESS_TOKEN_PARAM, SECURE_GATEWAY_SUFFIX};

/// Error returned when a candidate's endpoint cannot form a URL at all.
#[derive(Debug, Error)]
#[error("endpoint does not form a valid URL: {0}")]
pub struct InvalidEndpoint(#[from] url::ParseError);

/// One way to reach a media server, with everything learned about it so far.
///
/// Candidates are produced by discovery collaborators (local scan, directory
/// lookup, manual entry) with `state = Unknown`, merged with duplicates as
/// they arrive, and probed to establish reachability. The embedding client
/// owns the candidate list; this type defines the per-candidate rules.
///
/// The access token is deliberately excluded from the serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionCandidate {
    /// Which sources produced this candidate.
    origins: OriginSet,
    /// Verdict of the most recent probe.
    state: ConnectionState,
    /// Access token for this endpoint; empty means none supplied.
    #[serde(skip)]
    token: String,
    /// URL scheme, `http` or `https`.
    scheme: String,
    /// Hostname or IP address.
    host: String,
    /// TCP port.
    port: u16,
    /// Whether the candidate was seen or merged during the current refresh cycle.
    refreshed: bool,
}

impl ConnectionCandidate {
    /// Creates a candidate from one discovery source.
    ///
    /// Degenerate endpoints (empty scheme or host, port 0) are accepted with
    /// a logged warning rather than rejected: discovery sweeps have nowhere
    /// useful to surface a constructor error, and such a candidate simply
    /// fails its first probe.
    pub fn new(
        origin: ConnectionOrigin,
        scheme: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        token: impl Into<String>,
    ) -> Self {
        let scheme = scheme.into();
        let host = host.into();
        if scheme.is_empty() || host.is_empty() || port == 0 {
            log::warn!(
                "[Connection] Candidate has a degenerate endpoint: scheme={:?}, host={:?}, port={}",
                scheme,
                host,
                port
            );
        }
        Self {
            origins: OriginSet::from(origin),
            state: ConnectionState::Unknown,
            token: token.into(),
            scheme,
            host,
            port,
            refreshed: true,
        }
    }

    /// Which sources produced this candidate.
    #[must_use]
    pub fn origins(&self) -> &OriginSet {
        &self.origins
    }

    /// Verdict of the most recent probe.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Access token for this endpoint; empty when none was supplied.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// URL scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Hostname or IP address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the candidate was seen or merged during the current refresh cycle.
    #[must_use]
    pub fn refreshed(&self) -> bool {
        self.refreshed
    }

    /// True when scheme, host, and port are all usable.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.scheme.is_empty() && !self.host.is_empty() && self.port != 0
    }

    /// True when the endpoint speaks TLS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// Records a probe verdict. Only the prober writes this.
    pub(crate) fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    /// Clears the refreshed flag ahead of a discovery sweep.
    ///
    /// A registry marks every candidate stale, runs discovery (merging fresh
    /// duplicates back in re-sets the flag), then drops whatever is still
    /// stale afterwards.
    pub fn mark_stale(&mut self) {
        self.refreshed = false;
    }

    /// Builds a request URL for `path` on this endpoint.
    ///
    /// Exactly one leading `/` is stripped from `path` before it is applied,
    /// so `"status"` and `"/status"` address the same resource while an
    /// intentional extra slash survives. The candidate's token is appended as
    /// the `X-Scry-Token` query parameter when present.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEndpoint`] when scheme and host cannot form a URL at
    /// all. A port of 0 still builds and fails on the wire instead, matching
    /// the degrade-gracefully construction.
    pub fn build_url(&self, path: &str) -> Result<Url, InvalidEndpoint> {
        let mut url = Url::parse(&format!("{}://{}:{}/", self.scheme, self.host, self.port))?;
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        url.set_path(&format!("/{}", trimmed));
        if !self.token.is_empty() {
            url.query_pairs_mut()
                .append_pair(ACCESS_TOKEN_PARAM, &self.token);
        }
        Ok(url)
    }

    /// Canonical `scheme://host:port/` rendering used for display and
    /// duplicate detection.
    ///
    /// Endpoints reached through the wildcard-certificate gateway (`https`
    /// hostnames under `.scry.direct`) render as the plain-HTTP URL of the
    /// LAN address their first label encodes, so the same server found
    /// directly and through the gateway compares equal. The stored endpoint
    /// is never modified; this is a derived view. A gateway hostname with an
    /// empty first label falls through to the canonical rendering.
    #[must_use]
    pub fn plain_url(&self) -> String {
        if self.is_secure() && self.host.ends_with(SECURE_GATEWAY_SUFFIX) {
            let first_label = self.host.split('.').next().unwrap_or("");
            if !first_label.is_empty() {
                return format!("http://{}:{}/", first_label.replace('-', "."), self.port);
            }
        }
        format!("{}://{}:{}/", self.scheme, self.host, self.port)
    }

    /// Folds a duplicate candidate into this one.
    ///
    /// `self` is the stable primary; `other` is consumed field by field:
    ///
    /// - endpoint: kept, unless `other` upgrades a plain-HTTP endpoint to TLS
    /// - origins: union of both sets
    /// - token: `other`'s replaces an empty or differing token, never clears one
    /// - state: adopted only when `other` proved the server reachable
    /// - refreshed: always set
    ///
    /// Not commutative. Callers fold candidates in discovery order onto the
    /// first-seen primary; see [`reconcile_candidates`].
    pub fn merge(&mut self, other: &ConnectionCandidate) {
        if !self.is_secure() && other.is_secure() {
            self.scheme = other.scheme.clone();
            self.host = other.host.clone();
            self.port = other.port;
        }

        self.origins.merge(&other.origins);

        if self.token.is_empty() || (!other.token.is_empty() && self.token != other.token) {
            self.token = other.token.clone();
        }

        if self.state != ConnectionState::Reachable && other.state == ConnectionState::Reachable {
            self.state = ConnectionState::Reachable;
        }

        self.refreshed = true;
    }

    /// True when `other` addresses the same server endpoint.
    ///
    /// Two candidates are duplicates when their [`Self::plain_url`]
    /// renderings match and their tokens are compatible: an empty token
    /// matches anything, two non-empty tokens must be identical. Symmetric
    /// but not transitive (an untokened candidate can match two
    /// differently-tokened ones), so this stays a named check rather than a
    /// `PartialEq` impl.
    #[must_use]
    pub fn is_duplicate_of(&self, other: &ConnectionCandidate) -> bool {
        let ours = self.plain_url();
        let theirs = other.plain_url();
        if ours != theirs {
            log::debug!("[Connection] URLs differ: {} vs {}", ours, theirs);
            return false;
        }
        if !self.token.is_empty() && !other.token.is_empty() && self.token != other.token {
            log::debug!("[Connection] Tokens differ for {}", ours);
            return false;
        }
        true
    }
}

impl std::fmt::Display for ConnectionCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.plain_url(), self.origins, self.state)
    }
}

/// Folds duplicate candidates into the first-seen candidate of each group.
///
/// Input order is discovery order: the first occurrence of an endpoint is the
/// stable primary that later duplicates merge into, so origin flags, tokens,
/// and probe verdicts accumulate instead of producing parallel entries.
#[must_use]
pub fn reconcile_candidates(candidates: Vec<ConnectionCandidate>) -> Vec<ConnectionCandidate> {
    let mut reconciled: Vec<ConnectionCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match reconciled
            .iter_mut()
            .find(|existing| existing.is_duplicate_of(&candidate))
        {
            Some(existing) => existing.merge(&candidate),
            None => reconciled.push(candidate),
        }
    }
    reconciled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lan_candidate() -> ConnectionCandidate {
        ConnectionCandidate::new(
            ConnectionOrigin::Discovered,
            "http",
            "192.168.1.20",
            32400,
            "",
        )
    }

    fn gateway_candidate(token: &str) -> ConnectionCandidate {
        ConnectionCandidate::new(
            ConnectionOrigin::RemoteDirectory,
            "https",
            "192-168-1-20.a1f8c2d6.scry.direct",
            32400,
            token,
        )
    }

    #[test]
    fn leading_slash_is_stripped_exactly_once() {
        let candidate = lan_candidate();
        let bare = candidate.build_url("library/sections").unwrap();
        let slashed = candidate.build_url("/library/sections").unwrap();
        let doubled = candidate.build_url("//library/sections").unwrap();

        assert_eq!(bare, slashed);
        assert_eq!(bare.path(), "/library/sections");
        assert_eq!(doubled.path(), "//library/sections");
        assert_ne!(bare, doubled);
    }

    #[test]
    fn empty_path_addresses_the_root() {
        let url = lan_candidate().build_url("").unwrap();
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn token_is_appended_only_when_present() {
        let untokened = lan_candidate().build_url("/status").unwrap();
        assert_eq!(untokened.query(), None);

        let tokened = gateway_candidate("s3cret").build_url("/status").unwrap();
        assert_eq!(tokened.query(), Some("X-Scry-Token=s3cret"));
    }

    #[test]
    fn build_url_rejects_empty_host() {
        let candidate = ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "", 32400, "");
        assert!(!candidate.is_well_formed());
        assert!(candidate.build_url("/").is_err());
    }

    #[test]
    fn port_zero_is_flagged_but_still_builds() {
        let candidate =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "192.168.1.20", 0, "");
        assert!(!candidate.is_well_formed());
        assert!(candidate.build_url("/").is_ok());
    }

    #[test]
    fn plain_url_decodes_gateway_hostnames() {
        assert_eq!(
            gateway_candidate("").plain_url(),
            "http://192.168.1.20:32400/"
        );
    }

    #[test]
    fn plain_url_leaves_ordinary_hostnames_alone() {
        let candidate = ConnectionCandidate::new(
            ConnectionOrigin::Manual,
            "https",
            "media.example.com",
            32400,
            "",
        );
        assert_eq!(candidate.plain_url(), "https://media.example.com:32400/");
    }

    #[test]
    fn plain_url_only_decodes_secure_endpoints() {
        let candidate = ConnectionCandidate::new(
            ConnectionOrigin::Manual,
            "http",
            "192-168-1-20.a1f8c2d6.scry.direct",
            32400,
            "",
        );
        assert_eq!(
            candidate.plain_url(),
            "http://192-168-1-20.a1f8c2d6.scry.direct:32400/"
        );
    }

    #[test]
    fn plain_url_ignores_empty_gateway_label() {
        let candidate =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "https", ".scry.direct", 32400, "");
        assert_eq!(candidate.plain_url(), "https://.scry.direct:32400/");
    }

    #[test]
    fn gateway_and_lan_candidates_are_duplicates() {
        let lan = lan_candidate();
        let gateway = gateway_candidate("s3cret");
        assert!(lan.is_duplicate_of(&gateway));
        assert!(gateway.is_duplicate_of(&lan));
    }

    #[test]
    fn duplicate_check_is_reflexive() {
        let candidate = gateway_candidate("s3cret");
        assert!(candidate.is_duplicate_of(&candidate));
    }

    #[test]
    fn differing_tokens_are_not_duplicates() {
        let first = gateway_candidate("alpha");
        let second = gateway_candidate("beta");
        assert!(!first.is_duplicate_of(&second));
        assert!(!second.is_duplicate_of(&first));
    }

    #[test]
    fn differing_endpoints_are_not_duplicates() {
        let first = lan_candidate();
        let second =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "192.168.1.21", 32400, "");
        assert!(!first.is_duplicate_of(&second));
    }

    #[test]
    fn merge_upgrades_to_the_secure_endpoint() {
        let mut primary = lan_candidate();
        primary.merge(&gateway_candidate("s3cret"));

        assert_eq!(primary.scheme(), "https");
        assert_eq!(primary.host(), "192-168-1-20.a1f8c2d6.scry.direct");
        assert_eq!(primary.token(), "s3cret");
        assert!(primary.origins().contains(ConnectionOrigin::Discovered));
        assert!(primary.origins().contains(ConnectionOrigin::RemoteDirectory));
    }

    #[test]
    fn merge_never_downgrades_a_secure_endpoint() {
        let mut primary = gateway_candidate("s3cret");
        primary.merge(&lan_candidate());
        assert_eq!(primary.scheme(), "https");
        assert_eq!(primary.host(), "192-168-1-20.a1f8c2d6.scry.direct");
    }

    #[test]
    fn merge_keeps_the_primary_endpoint_between_equals() {
        let mut primary = lan_candidate();
        let other =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "10.0.0.9", 32400, "");
        primary.merge(&other);
        assert_eq!(primary.host(), "192.168.1.20");
    }

    #[test]
    fn merge_never_clears_a_token() {
        let mut primary = gateway_candidate("s3cret");
        primary.merge(&lan_candidate());
        assert_eq!(primary.token(), "s3cret");
    }

    #[test]
    fn merge_prefers_the_incoming_token_when_both_differ() {
        let mut primary = gateway_candidate("old");
        primary.merge(&gateway_candidate("new"));
        assert_eq!(primary.token(), "new");
    }

    #[test]
    fn merge_promotes_to_reachable_in_either_direction() {
        let mut stale = lan_candidate();
        stale.set_state(ConnectionState::Unreachable);
        let mut fresh = gateway_candidate("");
        fresh.set_state(ConnectionState::Reachable);

        let mut forward = stale.clone();
        forward.merge(&fresh);
        assert_eq!(forward.state(), ConnectionState::Reachable);

        let mut backward = fresh.clone();
        backward.merge(&stale);
        assert_eq!(backward.state(), ConnectionState::Reachable);
    }

    #[test]
    fn merge_does_not_adopt_negative_verdicts() {
        let mut primary = lan_candidate();
        let mut other = gateway_candidate("");
        other.set_state(ConnectionState::Unauthorized);
        primary.merge(&other);
        assert_eq!(primary.state(), ConnectionState::Unknown);
    }

    #[test]
    fn merging_a_clone_only_refreshes() {
        let mut primary = gateway_candidate("s3cret");
        primary.set_state(ConnectionState::Unauthorized);
        primary.mark_stale();
        let snapshot = primary.clone();

        primary.merge(&snapshot);

        assert!(primary.refreshed());
        assert_eq!(primary.host(), snapshot.host());
        assert_eq!(primary.token(), snapshot.token());
        assert_eq!(primary.state(), snapshot.state());
        assert_eq!(primary.origins(), snapshot.origins());
    }

    #[test]
    fn manual_entry_absorbs_a_directory_listing() {
        let mut manual =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "192.168.1.20", 32400, "");
        manual.mark_stale();
        let directory = gateway_candidate("T");

        manual.merge(&directory);

        assert!(manual.is_secure());
        assert_eq!(manual.host(), "192-168-1-20.a1f8c2d6.scry.direct");
        assert_eq!(manual.token(), "T");
        assert_eq!(manual.origins().to_string(), "(manual)(directory)");
        assert!(manual.refreshed());
    }

    #[test]
    fn mark_stale_clears_the_refreshed_flag() {
        let mut candidate = lan_candidate();
        assert!(candidate.refreshed());
        candidate.mark_stale();
        assert!(!candidate.refreshed());
    }

    #[test]
    fn reconcile_folds_duplicates_into_the_first_seen() {
        let other_server =
            ConnectionCandidate::new(ConnectionOrigin::Manual, "http", "10.0.0.9", 32400, "");
        let reconciled = reconcile_candidates(vec![
            lan_candidate(),
            other_server,
            gateway_candidate("s3cret"),
        ]);

        assert_eq!(reconciled.len(), 2);
        assert_eq!(reconciled[0].scheme(), "https");
        assert_eq!(reconciled[0].token(), "s3cret");
        assert!(reconciled[0].origins().contains(ConnectionOrigin::Discovered));
        assert_eq!(reconciled[1].host(), "10.0.0.9");
    }

    #[test]
    fn serialized_candidates_omit_the_token() {
        let value = serde_json::to_value(gateway_candidate("s3cret")).unwrap();
        assert!(value.get("token").is_none());
        assert_eq!(value["state"], serde_json::json!("unknown"));
        assert_eq!(value["origins"], serde_json::json!(["remote_directory"]));
        assert_eq!(value["port"], serde_json::json!(32400));
    }

    #[test]
    fn display_renders_url_origins_and_state() {
        let rendered = gateway_candidate("s3cret").to_string();
        assert_eq!(rendered, "http://192.168.1.20:32400/ (directory) unknown");
    }
}
