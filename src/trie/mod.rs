//! A binary trie over 32-bit IPv4 keys, mapping prefixes to their origin
//! AS.
//!
//! Nodes live in a `Vec` arena and refer to each other by index. Removing a
//! prefix prunes the nodes that no longer lead anywhere and puts their slots
//! on a free list, so a trie that had a prefix inserted and then removed is
//! structurally identical to the trie before the insert.
//!
//! The trie itself is not synchronised. It lives inside a
//! [PrefixIndex](crate::rib::prefix_index::PrefixIndex), behind the lock of
//! the neighbor that owns it.
mod node;


use std::net::Ipv4Addr;

use inetnum::asn::Asn;
use log::trace;

use crate::types::af;
use crate::types::match_options::{MatchType, QueryResult};
use crate::types::PrefixId;

use node::{NodeIdx, TrieNode};

const ROOT: NodeIdx = 0;

//------------ PrefixTrie ----------------------------------------------------

#[derive(Debug)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    free: Vec<NodeIdx>,
    prefixes: usize,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            free: vec![],
            prefixes: 0,
        }
    }

    /// The number of prefixes stored.
    pub fn len(&self) -> usize {
        self.prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes == 0
    }

    /// The number of live nodes, including the root.
    pub fn nodes_len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn node(&self, idx: NodeIdx) -> Option<&TrieNode> {
        self.nodes.get(idx as usize)
    }

    fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut TrieNode> {
        self.nodes.get_mut(idx as usize)
    }

    fn acquire_node(&mut self) -> NodeIdx {
        match self.free.pop() {
            Some(idx) => {
                if let Some(node) = self.node_mut(idx) {
                    *node = TrieNode::default();
                }
                idx
            }
            None => {
                self.nodes.push(TrieNode::default());
                (self.nodes.len() - 1) as NodeIdx
            }
        }
    }

    fn release_node(&mut self, idx: NodeIdx) {
        if idx != ROOT {
            self.free.push(idx);
        }
    }

    // Walk the key bits for `prefix` and return the index of the node at
    // its depth, if that node exists.
    fn find_node(&self, prefix: PrefixId) -> Option<NodeIdx> {
        let mut cur = ROOT;
        for depth in 0..prefix.get_len() {
            let bit = af::bit_at(prefix.get_net(), depth);
            cur = self.node(cur)?.child(bit)?;
        }
        Some(cur)
    }

    /// Insert `prefix` with origin `asn`. Returns the origin that was
    /// previously stored for exactly this prefix, if any.
    pub fn insert(&mut self, prefix: PrefixId, asn: Asn) -> Option<Asn> {
        let mut cur = ROOT;
        for depth in 0..prefix.get_len() {
            let bit = af::bit_at(prefix.get_net(), depth);
            let next = self.node(cur).and_then(|n| n.child(bit));
            cur = match next {
                Some(idx) => idx,
                None => {
                    let idx = self.acquire_node();
                    if let Some(node) = self.node_mut(cur) {
                        node.set_child(bit, Some(idx));
                    }
                    idx
                }
            };
        }

        let old = self.node_mut(cur).and_then(|n| n.asn.replace(asn));
        if old.is_none() {
            self.prefixes += 1;
        }
        trace!("trie insert {} {} (was {:?})", prefix, asn, old);
        old
    }

    /// Remove `prefix`, returning its origin, or `None` if the prefix was
    /// not stored. Nodes left without an origin and without children are
    /// pruned, from the bottom up.
    pub fn remove(&mut self, prefix: PrefixId) -> Option<Asn> {
        // (parent, bit leading to the child) for every step down.
        let mut path: Vec<(NodeIdx, bool)> =
            Vec::with_capacity(prefix.get_len() as usize);
        let mut cur = ROOT;
        for depth in 0..prefix.get_len() {
            let bit = af::bit_at(prefix.get_net(), depth);
            let next = self.node(cur)?.child(bit)?;
            path.push((cur, bit));
            cur = next;
        }

        let old = self.node_mut(cur)?.asn.take()?;
        self.prefixes -= 1;

        while let Some((parent, bit)) = path.pop() {
            if !self.node(cur).is_some_and(|n| n.is_vacant()) {
                break;
            }
            if let Some(node) = self.node_mut(parent) {
                node.set_child(bit, None);
            }
            self.release_node(cur);
            cur = parent;
        }

        trace!("trie remove {} {}", prefix, old);
        Some(old)
    }

    /// The origin stored for exactly `prefix`.
    pub fn get(&self, prefix: PrefixId) -> Option<Asn> {
        self.find_node(prefix).and_then(|idx| self.node(idx)?.asn)
    }

    /// The most specific stored prefix covering `search`, together with
    /// its origin. `search` itself counts as covering.
    pub fn longest_match(&self, search: PrefixId) -> Option<(PrefixId, Asn)> {
        let mut found = self.node(ROOT)?.asn.map(|asn| (0, asn));
        let mut cur = ROOT;
        for depth in 0..search.get_len() {
            let bit = af::bit_at(search.get_net(), depth);
            match self.node(cur).and_then(|n| n.child(bit)) {
                Some(next) => cur = next,
                None => break,
            }
            if let Some(asn) = self.node(cur).and_then(|n| n.asn) {
                found = Some((depth + 1, asn));
            }
        }
        found.map(|(len, asn)| (search.truncate_to_len(len), asn))
    }

    /// Every stored prefix covering `search`, shortest first. Includes
    /// `search` itself if it is stored.
    pub fn less_specifics(&self, search: PrefixId) -> Vec<(PrefixId, Asn)> {
        let mut res = vec![];
        let mut cur = ROOT;
        if let Some(asn) = self.node(ROOT).and_then(|n| n.asn) {
            res.push((search.truncate_to_len(0), asn));
        }
        for depth in 0..search.get_len() {
            let bit = af::bit_at(search.get_net(), depth);
            match self.node(cur).and_then(|n| n.child(bit)) {
                Some(next) => cur = next,
                None => break,
            }
            if let Some(asn) = self.node(cur).and_then(|n| n.asn) {
                res.push((search.truncate_to_len(depth + 1), asn));
            }
        }
        res
    }

    /// Match `search` according to `match_type`.
    pub fn match_prefix(
        &self,
        search: PrefixId,
        match_type: MatchType,
    ) -> QueryResult {
        let found = match match_type {
            MatchType::ExactMatch => {
                self.get(search).map(|asn| (search, asn))
            }
            MatchType::LongestMatch => self.longest_match(search),
            MatchType::EmptyMatch => None,
        };

        match found {
            Some((pfx, asn)) => QueryResult {
                match_type: if pfx == search {
                    MatchType::ExactMatch
                } else {
                    MatchType::LongestMatch
                },
                prefix: Some(pfx.into()),
                asn: Some(asn),
            },
            None => QueryResult::empty(),
        }
    }

    /// Longest match for a single address.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<(PrefixId, Asn)> {
        self.longest_match(PrefixId::host(addr))
    }
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}
