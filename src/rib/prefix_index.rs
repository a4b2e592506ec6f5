use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use inetnum::addr::Prefix;
use inetnum::asn::Asn;
use log::trace;

use crate::rib::config::StoreConfig;
use crate::trie::PrefixTrie;
use crate::types::errors::PrefixStoreError;
use crate::types::match_options::{MatchType, QueryResult};
use crate::types::PrefixId;

//------------ InsertOutcome -------------------------------------------------

/// What an insert did to the index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The prefix length is outside the policy filter. Nothing changed.
    Filtered,
    /// The prefix was not in the index before.
    Inserted,
    /// The prefix was already owned by the same AS. Nothing changed.
    Unchanged,
    /// The prefix moved to a new AS. Carries the previous owner.
    Replaced(Asn),
}

//------------ PrefixIndex ---------------------------------------------------

/// The prefix/origin index of one neighbor.
///
/// Three structures describe the same set of prefixes:
/// - a map from prefix to its origin AS,
/// - a map from origin AS to the set of prefixes it owns,
/// - a [PrefixTrie] with the same prefix to origin mapping, for
///   longest-prefix matching of addresses.
///
/// Every method leaves the three in agreement: a prefix is in the first map
/// with origin `a` if and only if it is in the set of `a` in the second map
/// and stored in the trie with origin `a`. An AS with no prefixes has no
/// entry in the second map. Prefixes with a length outside the configured
/// range never enter any of them.
#[derive(Debug)]
pub struct PrefixIndex {
    prefix_asn: HashMap<PrefixId, Asn>,
    asn_prefixes: HashMap<Asn, HashSet<PrefixId>>,
    trie: PrefixTrie,
    min_len: u8,
    max_len: u8,
}

impl PrefixIndex {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            prefix_asn: HashMap::new(),
            asn_prefixes: HashMap::new(),
            trie: PrefixTrie::new(),
            min_len: config.min_prefix_len,
            max_len: config.max_prefix_len,
        }
    }

    pub fn accepts_len(&self, len: u8) -> bool {
        (self.min_len..=self.max_len).contains(&len)
    }

    /// Record `asn` as the origin of `prefix`.
    ///
    /// If the prefix was owned by another AS, it is taken away from that
    /// AS first. A prefix whose length does not pass the filter is silently
    /// ignored.
    pub fn insert(&mut self, prefix: PrefixId, asn: Asn) -> InsertOutcome {
        if !self.accepts_len(prefix.get_len()) {
            trace!("filtered {} (length {})", prefix, prefix.get_len());
            return InsertOutcome::Filtered;
        }

        let outcome = match self.prefix_asn.insert(prefix, asn) {
            Some(old) if old == asn => return InsertOutcome::Unchanged,
            Some(old) => {
                self.unlink(old, prefix);
                InsertOutcome::Replaced(old)
            }
            None => InsertOutcome::Inserted,
        };

        self.asn_prefixes.entry(asn).or_default().insert(prefix);
        self.trie.insert(prefix, asn);

        outcome
    }

    /// Remove `prefix` from the index, returning the AS that owned it.
    pub fn withdraw(
        &mut self,
        prefix: PrefixId,
    ) -> Result<Asn, PrefixStoreError> {
        let asn = self
            .prefix_asn
            .remove(&prefix)
            .ok_or(PrefixStoreError::PrefixNotFound)?;
        self.unlink(asn, prefix);
        self.trie.remove(prefix);

        Ok(asn)
    }

    // Drop `prefix` from the set of `asn`, and the set itself once empty.
    fn unlink(&mut self, asn: Asn, prefix: PrefixId) {
        if let Some(set) = self.asn_prefixes.get_mut(&asn) {
            set.remove(&prefix);
            if set.is_empty() {
                self.asn_prefixes.remove(&asn);
            }
        }
    }

    /// The origin of exactly `prefix`.
    pub fn get(&self, prefix: PrefixId) -> Option<Asn> {
        self.prefix_asn.get(&prefix).copied()
    }

    pub fn contains(&self, prefix: PrefixId) -> bool {
        self.prefix_asn.contains_key(&prefix)
    }

    /// The most specific prefix covering `addr` and its origin.
    pub fn longest_match(&self, addr: Ipv4Addr) -> QueryResult {
        self.trie
            .match_prefix(PrefixId::host(addr), MatchType::LongestMatch)
    }

    /// Every prefix covering `addr`, shortest first.
    pub fn less_specifics(&self, addr: Ipv4Addr) -> Vec<(Prefix, Asn)> {
        self.trie
            .less_specifics(PrefixId::host(addr))
            .into_iter()
            .map(|(pfx, asn)| (pfx.into(), asn))
            .collect()
    }

    /// The prefixes owned by `asn`, ordered by network and length.
    pub fn prefixes_for_asn(&self, asn: Asn) -> Vec<Prefix> {
        let mut pfxs = self
            .asn_prefixes
            .get(&asn)
            .map(|set| set.iter().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        pfxs.sort();
        pfxs.into_iter().map(Prefix::from).collect()
    }

    /// Every prefix with its origin, ordered by network and length.
    pub fn prefix_asn_pairs(&self) -> Vec<(Prefix, Asn)> {
        let mut pairs = self
            .prefix_asn
            .iter()
            .map(|(pfx, asn)| (*pfx, *asn))
            .collect::<Vec<_>>();
        pairs.sort_by_key(|(pfx, _)| *pfx);
        pairs
            .into_iter()
            .map(|(pfx, asn)| (pfx.into(), asn))
            .collect()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefix_asn.len()
    }

    pub fn asn_count(&self) -> usize {
        self.asn_prefixes.len()
    }

    pub fn trie(&self) -> &PrefixTrie {
        &self.trie
    }

    /// Check that the three structures describe the same prefixes with the
    /// same origins, and that nothing got past the length filter.
    pub fn is_consistent(&self) -> bool {
        let forward = self.prefix_asn.iter().all(|(pfx, asn)| {
            self.accepts_len(pfx.get_len())
                && self
                    .asn_prefixes
                    .get(asn)
                    .is_some_and(|set| set.contains(pfx))
                && self.trie.get(*pfx) == Some(*asn)
        });

        let mut in_sets = 0;
        let backward = self.asn_prefixes.iter().all(|(asn, set)| {
            in_sets += set.len();
            !set.is_empty()
                && set.iter().all(|pfx| self.prefix_asn.get(pfx) == Some(asn))
        });

        forward
            && backward
            && in_sets == self.prefix_asn.len()
            && self.trie.len() == self.prefix_asn.len()
    }
}
