use std::net::Ipv4Addr;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use inetnum::addr::Prefix;
use inetnum::asn::Asn;
use log::error;

use crate::rib::config::StoreConfig;
use crate::rib::prefix_index::PrefixIndex;
use crate::types::errors::{FatalError, FatalResult};
use crate::types::match_options::QueryResult;
use crate::types::stats::NeighborSummary;

//------------ NeighborState -------------------------------------------------

/// Everything known about one peering session.
#[derive(Debug)]
pub struct NeighborState {
    session_state: String,
    update_count: u64,
    index: PrefixIndex,
}

impl NeighborState {
    fn new(config: &StoreConfig) -> Self {
        Self {
            session_state: String::new(),
            update_count: 0,
            index: PrefixIndex::new(config),
        }
    }

    /// The last session status reported for this neighbor, empty if none
    /// was reported yet.
    pub fn session_state(&self) -> &str {
        &self.session_state
    }

    /// The number of announce and withdraw events applied so far,
    /// including the ones that turned out to be malformed.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    pub(crate) fn index_mut(&mut self) -> &mut PrefixIndex {
        &mut self.index
    }

    pub(crate) fn set_session_state(&mut self, state: String) {
        self.session_state = state;
    }

    /// Count one announce or withdraw event. Returns the new count.
    pub(crate) fn record_update(&mut self) -> u64 {
        self.update_count += 1;
        self.update_count
    }
}

//------------ Neighbor ------------------------------------------------------

/// A peering session and its state, behind its own reader-writer lock.
///
/// The lock is independent of the registry lock and of the lock of every
/// other neighbor. All read methods copy what they return out of the
/// state, so no guard outlives the call.
#[derive(Debug)]
pub struct Neighbor {
    address: String,
    state: RwLock<NeighborState>,
}

impl Neighbor {
    pub(crate) fn new(address: String, config: &StoreConfig) -> Self {
        Self {
            address,
            state: RwLock::new(NeighborState::new(config)),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Take the read side of the lock. A poisoned lock means a writer
    /// panicked halfway through an update, so the state cannot be trusted.
    pub fn read(&self) -> FatalResult<RwLockReadGuard<'_, NeighborState>> {
        self.state.read().map_err(|_| {
            error!("FATAL: state of neighbor {} is poisoned", self.address);
            FatalError
        })
    }

    pub(crate) fn write(
        &self,
    ) -> FatalResult<RwLockWriteGuard<'_, NeighborState>> {
        self.state.write().map_err(|_| {
            error!("FATAL: state of neighbor {} is poisoned", self.address);
            FatalError
        })
    }

    pub fn summary(&self) -> FatalResult<NeighborSummary> {
        let state = self.read()?;
        Ok(NeighborSummary {
            address: self.address.clone(),
            session_state: state.session_state.clone(),
            update_count: state.update_count,
            prefix_count: state.index.prefix_count(),
            asn_count: state.index.asn_count(),
        })
    }

    pub fn session_state(&self) -> FatalResult<String> {
        Ok(self.read()?.session_state.clone())
    }

    pub fn update_count(&self) -> FatalResult<u64> {
        Ok(self.read()?.update_count)
    }

    pub fn prefix_count(&self) -> FatalResult<usize> {
        Ok(self.read()?.index.prefix_count())
    }

    pub fn asn_count(&self) -> FatalResult<usize> {
        Ok(self.read()?.index.asn_count())
    }

    /// The prefixes currently originated by `asn`, ordered by network and
    /// length.
    pub fn prefixes_for_asn(&self, asn: Asn) -> FatalResult<Vec<Prefix>> {
        Ok(self.read()?.index.prefixes_for_asn(asn))
    }

    /// All prefixes with their origin, ordered by network and length.
    pub fn prefix_asn_pairs(&self) -> FatalResult<Vec<(Prefix, Asn)>> {
        Ok(self.read()?.index.prefix_asn_pairs())
    }

    pub fn longest_match(&self, addr: Ipv4Addr) -> FatalResult<QueryResult> {
        Ok(self.read()?.index.longest_match(addr))
    }

    /// Every recorded prefix that covers `addr`, shortest first.
    pub fn covering_prefixes(
        &self,
        addr: Ipv4Addr,
    ) -> FatalResult<Vec<(Prefix, Asn)>> {
        Ok(self.read()?.index.less_specifics(addr))
    }
}
