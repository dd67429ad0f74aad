//! OID name resolution for display.
//!
//! Resolution is optional. Everything in the crate works on numeric OIDs;
//! a resolver only makes output friendlier. When no resolver is available
//! or nothing matches, [`ResolvedOid`] prints the dotted OID.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::oid::Oid;

/// A name found for an OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Display name of the matched prefix, e.g. `sysDescr`.
    pub name: String,
    /// Number of arcs covered by the name.
    pub matched_len: usize,
}

/// Lookup service mapping numeric OIDs to names.
pub trait OidResolver: Send + Sync {
    /// Name of the longest known prefix of `oid`, if any.
    fn resolve(&self, oid: &Oid) -> Option<Resolution>;
}

/// Resolver over an in-memory tree of named prefixes.
///
/// ```
/// use snmp_v1::oid;
/// use snmp_v1::resolve::{OidResolver, ResolvedOid, TreeResolver};
///
/// let mut tree = TreeResolver::new();
/// tree.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1), "sysDescr");
///
/// let oid = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// let names: &dyn OidResolver = &tree;
/// assert_eq!(ResolvedOid::new(&oid, Some(names)).to_string(), "sysDescr.0");
/// assert_eq!(ResolvedOid::new(&oid, None).to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeResolver {
    names: BTreeMap<Oid, String>,
}

impl TreeResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name a prefix.
    pub fn insert(&mut self, prefix: Oid, name: impl Into<String>) {
        self.names.insert(prefix, name.into());
    }

    /// Number of named prefixes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no prefixes are named.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parse `name oid` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped. Either column
    /// order is accepted as long as one column parses as an OID.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tree = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line.split_whitespace();
            let (Some(first), Some(second), None) = (columns.next(), columns.next(), columns.next()) else {
                return Err(Error::Config(format!("line {}: expected `name oid`", number + 1).into()).boxed());
            };
            let (name, oid) = match (Oid::parse(first), Oid::parse(second)) {
                (_, Ok(oid)) => (first, oid),
                (Ok(oid), Err(_)) => (second, oid),
                (Err(_), Err(e)) => return Err(e),
            };
            tree.insert(oid, name);
        }
        Ok(tree)
    }
}

impl OidResolver for TreeResolver {
    fn resolve(&self, oid: &Oid) -> Option<Resolution> {
        (1..=oid.len()).rev().find_map(|len| {
            let prefix = Oid::from_slice(&oid.arcs()[..len]);
            self.names.get(&prefix).map(|name| Resolution {
                name: name.clone(),
                matched_len: len,
            })
        })
    }
}

/// An OID paired with an optional resolver, for display.
pub struct ResolvedOid<'a> {
    oid: &'a Oid,
    resolver: Option<&'a dyn OidResolver>,
}

impl<'a> ResolvedOid<'a> {
    /// Wrap `oid` for display through `resolver`.
    pub fn new(oid: &'a Oid, resolver: Option<&'a dyn OidResolver>) -> Self {
        Self { oid, resolver }
    }
}

impl fmt::Display for ResolvedOid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(found) = self.resolver.and_then(|r| r.resolve(self.oid)) else {
            return write!(f, "{}", self.oid);
        };
        f.write_str(&found.name)?;
        for arc in &self.oid.arcs()[found.matched_len..] {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}
