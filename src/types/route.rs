use inetnum::asn::Asn;

use super::PrefixId;

//------------ RouteDescriptor -----------------------------------------------

/// A parsed announce or withdraw payload.
///
/// `options` holds every scalar `key value` pair in the order it appeared.
/// The AS-path holds every AS-path element, scalar or listed, in order.
/// Elements inside a parenthesized group are not part of the path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    options: Vec<(String, String)>,
    as_path: Vec<Asn>,
    prefix: PrefixId,
}

impl RouteDescriptor {
    pub fn new(
        options: Vec<(String, String)>,
        as_path: Vec<Asn>,
        prefix: PrefixId,
    ) -> Self {
        Self {
            options,
            as_path,
            prefix,
        }
    }

    pub fn prefix(&self) -> PrefixId {
        self.prefix
    }

    pub fn as_path(&self) -> &[Asn] {
        &self.as_path
    }

    /// The originating AS: the right-most element of the AS-path, or
    /// `None` if the path is empty.
    pub fn primary_asn(&self) -> Option<Asn> {
        self.as_path.last().copied()
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The value recorded for `key`. If a key appears more than once, the
    /// last value wins.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)?;
        if let Some(asn) = self.primary_asn() {
            write!(f, " origin {}", asn)?;
        }
        Ok(())
    }
}
