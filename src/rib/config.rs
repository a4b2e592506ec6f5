//------------ Config --------------------------------------------------------

//! Configuration options for the routing state engine.
//!
//! A configuration is created by instantiating [StoreConfig], setting some
//! fields on it, and passing it in as an argument to
//! [RoutingEngine::new](super::engine::RoutingEngine::new). Nothing in the
//! engine changes the configuration after construction.
//!
//! ```
//! use origin_index::rib::config::StoreConfig;
//! use origin_index::rib::engine::RoutingEngine;
//!
//! let config = StoreConfig {
//!     progress_interval: 0,
//!     ..Default::default()
//! };
//! assert!(config.accepts_len(24));
//! assert!(!config.accepts_len(26));
//!
//! let _engine = RoutingEngine::new(config);
//! ```

/// Default shortest prefix length that is indexed.
pub const DEFAULT_MIN_PREFIX_LEN: u8 = 8;
/// Default longest prefix length that is indexed.
pub const DEFAULT_MAX_PREFIX_LEN: u8 = 25;
/// Default number of route updates per neighbor between progress lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 25_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Announcements for prefixes shorter than this are not indexed.
    pub min_prefix_len: u8,
    /// Announcements for prefixes longer than this are not indexed.
    pub max_prefix_len: u8,
    /// Log a progress line each time a neighbor has processed this many
    /// announce and withdraw events. Zero turns progress lines off.
    pub progress_interval: u64,
    /// Log every address lookup at debug level.
    pub trace_lookups: bool,
}

impl StoreConfig {
    /// Whether prefixes of length `len` pass the policy filter.
    pub fn accepts_len(&self, len: u8) -> bool {
        (self.min_prefix_len..=self.max_prefix_len).contains(&len)
    }

    pub(crate) fn is_progress_point(&self, update_count: u64) -> bool {
        self.progress_interval != 0
            && update_count % self.progress_interval == 0
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            min_prefix_len: DEFAULT_MIN_PREFIX_LEN,
            max_prefix_len: DEFAULT_MAX_PREFIX_LEN,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            trace_lookups: false,
        }
    }
}
