use std::net::{IpAddr, Ipv4Addr};

use inetnum::addr::Prefix;

use super::af;
use super::errors::RouteParseError;

//------------ PrefixId ------------------------------------------------------

/// The key under which a prefix is stored in the index and the trie.
///
/// A `PrefixId` always holds a truncated network, i.e. no bits are set
/// beyond `len`. Ordering is by network first, then by length, so that a
/// sorted list of prefixes reads like a routing table.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone)]
pub struct PrefixId {
    net: u32,
    len: u8,
}

impl PrefixId {
    /// Create a new prefix id. Bits beyond `len` are cleared and a length
    /// larger than 32 is clamped to 32.
    pub fn new(net: u32, len: u8) -> Self {
        let len = len.min(af::BITS);
        PrefixId {
            net: af::truncate_to_len(net, len),
            len,
        }
    }

    /// The host route (/32) for a single address.
    pub fn host(addr: Ipv4Addr) -> Self {
        Self::new(af::from_ipaddr(addr), af::BITS)
    }

    pub fn get_net(&self) -> u32 {
        self.net
    }

    pub fn get_len(&self) -> u8 {
        self.len
    }

    pub fn addr(&self) -> Ipv4Addr {
        af::into_ipaddr(self.net)
    }

    pub(crate) fn truncate_to_len(self, len: u8) -> Self {
        Self::new(self.net, len)
    }

    /// Whether `addr` falls inside this prefix.
    pub fn covers(&self, addr: Ipv4Addr) -> bool {
        af::truncate_to_len(af::from_ipaddr(addr), self.len) == self.net
    }
}

impl std::fmt::Display for PrefixId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr(), self.len)
    }
}

impl std::str::FromStr for PrefixId {
    type Err = RouteParseError;

    /// Parses `a.b.c.d/len`. Host bits are masked off, like a CIDR parser
    /// does, so `10.1.2.3/16` yields `10.1.0.0/16`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RouteParseError::InvalidRoute {
            value: s.to_string(),
        };

        let (addr, len) = s.split_once('/').ok_or_else(invalid)?;
        let len = len.parse::<u8>().map_err(|_| invalid())?;

        match addr.parse::<IpAddr>().map_err(|_| invalid())? {
            IpAddr::V4(addr) if len <= af::BITS => {
                Ok(Self::new(af::from_ipaddr(addr), len))
            }
            IpAddr::V4(_) => Err(invalid()),
            IpAddr::V6(_) => Err(RouteParseError::NotIpv4 {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<Prefix> for PrefixId {
    type Error = RouteParseError;

    fn try_from(value: Prefix) -> Result<Self, Self::Error> {
        match value.addr() {
            IpAddr::V4(addr) => {
                Ok(Self::new(af::from_ipaddr(addr), value.len()))
            }
            IpAddr::V6(_) => Err(RouteParseError::NotIpv4 {
                value: value.to_string(),
            }),
        }
    }
}

// There is no reasonable way for this to panic, PrefixId and inetnum's Prefix
// represent the same data in slightly different ways, and a PrefixId never
// carries host bits or a length over 32.
#[allow(clippy::unwrap_used)]
impl From<PrefixId> for Prefix {
    fn from(value: PrefixId) -> Self {
        Prefix::new(IpAddr::V4(value.addr()), value.get_len()).unwrap()
    }
}
