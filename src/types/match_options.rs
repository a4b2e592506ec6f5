use std::fmt;

use inetnum::addr::Prefix;
use inetnum::asn::Asn;

//------------ MatchType -----------------------------------------------------

/// Option to set the match type for a prefix match. Type can be Exact,
/// Longest, or Empty.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MatchType {
    /// Only return the requested prefix, and the associated origin, if the
    /// requested prefix exactly matches a stored prefix.
    ExactMatch,
    /// Return the longest matching prefix for the requested prefix (if
    /// any). May match the prefix exactly.
    LongestMatch,
    /// Nothing matched.
    EmptyMatch,
}

impl MatchType {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::EmptyMatch)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchType::ExactMatch => write!(f, "exact-match"),
            MatchType::LongestMatch => write!(f, "longest-match"),
            MatchType::EmptyMatch => write!(f, "empty-match"),
        }
    }
}

//------------- QueryResult --------------------------------------------------

/// The type that is returned by a prefix match on a trie or an index.
///
/// `match_type` is the type of match that was actually found, which may
/// differ from the requested one: a longest match that hits the search
/// prefix itself reports `ExactMatch`, and a miss reports `EmptyMatch`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult {
    pub match_type: MatchType,
    pub prefix: Option<Prefix>,
    pub asn: Option<Asn>,
}

impl QueryResult {
    pub fn empty() -> Self {
        QueryResult {
            match_type: MatchType::EmptyMatch,
            prefix: None,
            asn: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.match_type.is_empty()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pfx_str = match self.prefix {
            Some(pfx) => format!("{}", pfx),
            None => "".to_string(),
        };
        let asn_str = match self.asn {
            Some(asn) => format!("{}", asn),
            None => "".to_string(),
        };
        write!(
            f,
            "match_type: {}\nprefix: {}\norigin: {}",
            self.match_type, pfx_str, asn_str
        )
    }
}
