#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

//! A library that keeps track of which autonomous system originates which
//! IPv4 prefix, per BGP neighbor, as reported by a stream of text events
//! from a route server or BGP speaker.
//!
//! Event lines look like this:
//!
//! ```text
//! neighbor 10.0.0.1 up
//! neighbor 10.0.0.1 announced route 10.1.0.0/24 as-path [ 65001 65002 ]
//! neighbor 10.0.0.1 withdrawn route 10.1.0.0/24
//! ```
//!
//! A single ingest thread feeds these lines to a [RoutingEngine]. For every
//! neighbor it keeps a map from prefix to origin AS (the right-most AS in
//! the AS-path), the reverse map from AS to its prefixes, and a binary trie
//! for longest-prefix matching of addresses. Any number of threads can
//! query the engine while ingest is running.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use origin_index::asn::Asn;
//! use origin_index::{RoutingEngine, StoreConfig};
//!
//! let engine = RoutingEngine::new(StoreConfig::default());
//! engine.process_line(
//!     "neighbor 203.0.113.5 announced route 203.0.113.0/24 \
//!      as-path [ 64512 64513 ]",
//! ).unwrap();
//!
//! let found = engine.lookup_asn(None, Ipv4Addr::new(203, 0, 113, 42))
//!     .unwrap();
//! assert_eq!(found["203.0.113.5"], Some(Asn::from_u32(64513)));
//! ```
mod types;

/// Event line and route attribute parsers
pub mod parser;

/// Binary trie for longest-prefix matching
pub mod trie;

/// Per-neighbor indexes, the neighbor registry and the engine on top
pub mod rib;

// re-exports
pub use inetnum::{addr, asn};

// Public Interfaces on the root of the crate

pub use rib::config::StoreConfig;
pub use rib::engine::RoutingEngine;

/// Types used to create match queries on a trie or an index
pub use types::match_options;

/// Error types returned by the parsers, the indexes and the engine
pub use types::errors;

/// Neighbor listings and ingest counters
pub use types::stats;

/// The internal, hashable and ordered representation of an IPv4 prefix
pub use types::PrefixId;

/// A parsed route attribute string
pub use types::RouteDescriptor;
