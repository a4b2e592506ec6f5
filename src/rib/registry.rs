use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_utils::sync::ShardedLock;
use log::{error, info};

use crate::rib::config::StoreConfig;
use crate::rib::neighbor::Neighbor;
use crate::types::errors::{FatalError, FatalResult};
use crate::types::stats::NeighborSummary;

//------------ NeighborRegistry ----------------------------------------------

/// The set of known neighbors, keyed by peer address.
///
/// Neighbors are created on first reference and never removed. Membership
/// sits behind a sharded reader-writer lock, so the many lookups made by
/// queries only contend on their own shard. Each neighbor carries its own
/// lock for its state; when both are held, the registry lock is always the
/// outer one.
#[derive(Debug)]
pub struct NeighborRegistry {
    neighbors: ShardedLock<HashMap<String, Arc<Neighbor>>>,
    config: StoreConfig,
}

impl NeighborRegistry {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            neighbors: ShardedLock::new(HashMap::new()),
            config,
        }
    }

    /// Return the neighbor for `address`, creating it if it does not exist.
    ///
    /// The fast path only takes the read lock. On a miss, the write lock is
    /// taken and the map is asked again through its entry API, so of any
    /// number of callers racing for the same unseen address exactly one
    /// creates the neighbor and all of them get that one back.
    pub fn get_or_create(&self, address: &str) -> FatalResult<Arc<Neighbor>> {
        if let Some(neighbor) = self.get(address)? {
            return Ok(neighbor);
        }

        let mut created = false;
        let neighbor = {
            let mut neighbors =
                self.neighbors.write().map_err(|_| poisoned())?;
            Arc::clone(neighbors.entry(address.to_string()).or_insert_with(
                || {
                    created = true;
                    Arc::new(Neighbor::new(address.to_string(), &self.config))
                },
            ))
        };

        if created {
            info!("new neighbor {}", address);
        }
        Ok(neighbor)
    }

    /// Return the neighbor for `address`, if it is known. Never creates.
    pub fn get(&self, address: &str) -> FatalResult<Option<Arc<Neighbor>>> {
        let neighbors = self.neighbors.read().map_err(|_| poisoned())?;
        Ok(neighbors.get(address).cloned())
    }

    /// All known neighbors, ordered by address. The registry lock is
    /// released before this returns.
    pub fn neighbors(&self) -> FatalResult<Vec<Arc<Neighbor>>> {
        let mut all = {
            let neighbors = self.neighbors.read().map_err(|_| poisoned())?;
            neighbors.values().cloned().collect::<Vec<_>>()
        };
        all.sort_by(|a, b| a.address().cmp(b.address()));
        Ok(all)
    }

    /// A copied listing of all neighbors, ordered by address.
    ///
    /// Each row is read under the lock of its own neighbor only, after the
    /// registry lock has been given up. Rows are consistent in themselves,
    /// but ingest may move on between two rows.
    pub fn snapshot(&self) -> FatalResult<Vec<NeighborSummary>> {
        self.neighbors()?.iter().map(|n| n.summary()).collect()
    }

    pub fn len(&self) -> FatalResult<usize> {
        Ok(self.neighbors.read().map_err(|_| poisoned())?.len())
    }

    pub fn is_empty(&self) -> FatalResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> FatalError {
    error!("FATAL: neighbor registry lock is poisoned");
    FatalError
}
