use inetnum::asn::Asn;

//------------ TrieNode ------------------------------------------------------

/// Index of a node in the arena of a [super::PrefixTrie].
pub(crate) type NodeIdx = u32;

// A node in the binary trie. A node sits at depth `d` when its position
// is reached by following `d` bits of a key from the root. It carries an
// origin only if a prefix of exactly that length was inserted; otherwise
// it is just a waypoint to longer prefixes.
#[derive(Debug, Default, Clone)]
pub(crate) struct TrieNode {
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    pub(crate) asn: Option<Asn>,
}

impl TrieNode {
    pub(crate) fn child(&self, bit: bool) -> Option<NodeIdx> {
        if bit {
            self.right
        } else {
            self.left
        }
    }

    pub(crate) fn set_child(&mut self, bit: bool, idx: Option<NodeIdx>) {
        if bit {
            self.right = idx;
        } else {
            self.left = idx;
        }
    }

    // A node with neither an origin nor children serves no purpose and can
    // be returned to the free list.
    pub(crate) fn is_vacant(&self) -> bool {
        self.asn.is_none() && self.left.is_none() && self.right.is_none()
    }
}
