//! Server connection management.
//!
//! This module decides how a client talks to a media server: which of the
//! independently-discovered endpoint candidates for the server actually work,
//! how duplicates among them collapse into one record, and what an
//! authenticated request URL for a candidate looks like.
//!
//! # Module Structure
//!
//! - `types` - Connection states, origins, and the origin set
//! - `candidate` - `ConnectionCandidate`: URL building, merging, reconciliation
//! - `traits` - `Transport` and `ServerMetadata` abstractions for testability
//! - `transport` - `HttpTransport` concrete trait implementation and config
//! - `prober` - `ReachabilityProber`: bounded probes and their classification

pub mod candidate;
pub mod prober;
pub mod traits;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use candidate::{reconcile_candidates, ConnectionCandidate, InvalidEndpoint};
pub use types::{ConnectionOrigin, ConnectionState, OriginSet};

// Re-export trait abstractions
pub use traits::{ServerMetadata, Transport};

// Re-export concrete implementation
pub use prober::ReachabilityProber;
pub use transport::{HttpTransport, TransportConfig, TransportError, TransportResult};
