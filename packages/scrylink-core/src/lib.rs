//! Scrylink Core - connection resolution for Scry Media Server clients.
//!
//! This crate answers one question for a client: given several
//! independently-discovered ways to reach the same logical media server (a
//! manual host entry, a LAN scan hit, the directory's relay listing), which
//! one should requests go to? It probes candidates for reachability, folds
//! duplicates into a single best record, and renders correctly-authenticated
//! request URLs for whichever candidate wins.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - [`connection`]: candidate records, URL building, merging, and probing
//! - [`protocol_constants`]: fixed wire-protocol values
//!
//! # Abstraction Traits
//!
//! The crate defines two traits to decouple the resolution logic from its
//! collaborators:
//!
//! - [`Transport`](connection::Transport): the single HTTP GET a probe needs.
//!   [`HttpTransport`](connection::HttpTransport) is the stock implementation.
//! - [`ServerMetadata`](connection::ServerMetadata): access-token lookup and
//!   root-response recognition, implemented by whatever owns the server
//!   record (account layer, discovery cache).
//!
//! Discovery itself, token acquisition, and response parsing live behind
//! those seams; this crate never grows opinions about them.

#![warn(clippy::all)]

pub mod connection;
pub mod protocol_constants;

// Re-export commonly used types at the crate root
pub use connection::{
    reconcile_candidates, ConnectionCandidate, ConnectionOrigin, ConnectionState, HttpTransport,
    InvalidEndpoint, OriginSet, ReachabilityProber, ServerMetadata, Transport, TransportConfig,
    TransportError, TransportResult,
};
