//! Shared types for server connection candidates.
//!
//! This module contains the state and origin vocabulary used across candidate
//! construction, merging, and probing.

use serde::Serialize;
use std::collections::HashSet;

/// Reachability verdict for a connection candidate.
///
/// `Reachable` is only ever assigned after a probe whose response body was
/// positively recognized as belonging to the expected server; merging and
/// origin bookkeeping never manufacture it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not yet probed, or the last probe was cancelled before it concluded.
    #[default]
    Unknown,
    /// The endpoint answered and identified as the expected server.
    Reachable,
    /// The endpoint answered with HTTP 401.
    Unauthorized,
    /// The endpoint did not answer, or answered as something else.
    Unreachable,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Reachable => write!(f, "reachable"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Where a connection candidate came from.
///
/// The same endpoint is routinely produced by more than one source (a LAN
/// scan and the directory listing, for instance), so candidates accumulate
/// origins over their lifetime instead of holding exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOrigin {
    /// Found by local-network discovery.
    Discovered,
    /// Entered by the user.
    Manual,
    /// Listed by the remote directory service.
    RemoteDirectory,
}

impl std::fmt::Display for ConnectionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovered => write!(f, "discovered"),
            Self::Manual => write!(f, "manual"),
            Self::RemoteDirectory => write!(f, "directory"),
        }
    }
}

/// All origins in declaration order; drives set iteration and rendering.
const ORIGIN_ORDER: &[ConnectionOrigin] = &[
    ConnectionOrigin::Discovered,
    ConnectionOrigin::Manual,
    ConnectionOrigin::RemoteDirectory,
];

/// Set of [`ConnectionOrigin`] flags attached to a candidate.
///
/// Thin wrapper over `HashSet` so the union semantics used by merging and the
/// diagnostic rendering live in one place. Iteration, rendering, and
/// serialization follow the declaration order of [`ConnectionOrigin`], not
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OriginSet(HashSet<ConnectionOrigin>);

impl OriginSet {
    /// Adds an origin to the set.
    pub fn insert(&mut self, origin: ConnectionOrigin) {
        self.0.insert(origin);
    }

    /// True when the set contains `origin`.
    #[must_use]
    pub fn contains(&self, origin: ConnectionOrigin) -> bool {
        self.0.contains(&origin)
    }

    /// Unions `other` into this set.
    pub fn merge(&mut self, other: &OriginSet) {
        self.0.extend(other.0.iter().copied());
    }

    /// True when no origin has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct origins recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the recorded origins in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ConnectionOrigin> + '_ {
        ORIGIN_ORDER.iter().copied().filter(|o| self.0.contains(o))
    }
}

impl From<ConnectionOrigin> for OriginSet {
    fn from(origin: ConnectionOrigin) -> Self {
        let mut set = HashSet::new();
        set.insert(origin);
        Self(set)
    }
}

impl std::fmt::Display for OriginSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for origin in self.iter() {
            write!(f, "({})", origin)?;
        }
        Ok(())
    }
}

impl Serialize for OriginSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}
