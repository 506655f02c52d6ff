//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the Scry Media Server wire protocol and the
//! scry.direct certificate infrastructure; changing them breaks compatibility
//! with deployed servers.

// ─────────────────────────────────────────────────────────────────────────────
// Reachability probing
// ─────────────────────────────────────────────────────────────────────────────

/// Timeout for a single reachability probe (seconds).
///
/// 3 seconds keeps a full candidate sweep snappy: a LAN server answers in
/// milliseconds, and a relay slower than this loses to any alternative anyway.
pub const PROBE_TIMEOUT_SECS: u64 = 3;

/// `Accept` header value sent with probes.
///
/// Servers answer the root resource with an XML container document.
pub const PROBE_ACCEPT: &str = "application/xml";

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "X-Scry-Token";

// ─────────────────────────────────────────────────────────────────────────────
// Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Hostname suffix of the wildcard-certificate TLS gateway.
///
/// Servers published through the gateway get per-server hostnames whose first
/// DNS label encodes the server's LAN IPv4 address with `-` standing in for
/// `.` (the wildcard certificate cannot cover dotted labels).
pub const SECURE_GATEWAY_SUFFIX: &str = ".scry.direct";
