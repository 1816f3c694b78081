//! Distinguished name value objects.
//!
//! This module provides type-safe wrappers around distinguished names with
//! normalization at construction. A [`Dn`] is stored leaf-first, matching its
//! textual form (`cn=alice,ou=dept,ou=system`), and all comparisons operate on
//! the normalized representation.
//!
//! The full directory-name grammar (escaping, multi-valued RDNs, attribute
//! options) lives in the external name parser; values arriving here are the
//! already-flattened `attribute=value` form that parser emits.

use crate::error::{DnParseError, DnParseResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single `attribute=value` relative distinguished name component.
///
/// Both the attribute type and the value are normalized to lowercase with
/// surrounding whitespace removed, so two `Rdn`s compare equal whenever the
/// directory would treat them as the same name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rdn {
    attribute: String,
    value: String,
}

impl Rdn {
    /// Create a new RDN from an attribute type and value, normalizing both.
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> DnParseResult<Self> {
        let attribute = attribute.into().trim().to_ascii_lowercase();
        let value = value.into().trim().to_ascii_lowercase();
        if attribute.is_empty() || value.is_empty() {
            return Err(DnParseError::EmptyAttributeOrValue {
                component: format!("{}={}", attribute, value),
            });
        }
        Ok(Self { attribute, value })
    }

    /// Parse a single `attribute=value` component.
    pub fn parse(component: &str) -> DnParseResult<Self> {
        let Some((attribute, value)) = component.split_once('=') else {
            return Err(DnParseError::MissingSeparator {
                component: component.trim().to_string(),
            });
        };
        Self::new(attribute, value)
    }

    /// The normalized attribute type.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The normalized attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

impl FromStr for Rdn {
    type Err = DnParseError;

    fn from_str(s: &str) -> DnParseResult<Self> {
        Self::parse(s)
    }
}

/// A normalized distinguished name.
///
/// The empty name (zero RDNs) is the tree root; relative names used by
/// subtree specifications are plain `Dn` values interpreted against a prefix
/// via [`Dn::join`].
///
/// # Examples
///
/// ```rust
/// use subentry_server::model::Dn;
///
/// let dept = Dn::parse("ou=dept,ou=system")?;
/// let alice = Dn::parse("cn=alice,ou=dept,ou=system")?;
/// assert!(alice.is_descendant_of(&dept));
/// assert_eq!(alice.depth_below(&dept), Some(1));
/// assert_eq!(alice.parent(), Some(dept));
/// # Ok::<(), subentry_server::error::DnParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Dn {
    // Leaf-first, matching the textual form.
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The root (empty) name.
    pub fn root() -> Self {
        Self { rdns: Vec::new() }
    }

    /// Parse a distinguished name from its textual form.
    ///
    /// An empty (or all-whitespace) string parses to the root name. Each
    /// comma-separated component must be a well-formed `attribute=value`
    /// pair.
    pub fn parse(text: &str) -> DnParseResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut rdns = Vec::new();
        for component in trimmed.split(',') {
            if component.trim().is_empty() {
                return Err(DnParseError::EmptyComponent {
                    dn: trimmed.to_string(),
                });
            }
            rdns.push(Rdn::parse(component)?);
        }
        Ok(Self { rdns })
    }

    /// Build a name from leaf-first RDN components.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// Whether this is the root (empty) name.
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Number of RDN components.
    pub fn depth(&self) -> usize {
        self.rdns.len()
    }

    /// The leaf RDN, if any.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The leaf-first RDN components.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The parent name, or `None` for the root.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            return None;
        }
        Some(Dn {
            rdns: self.rdns[1..].to_vec(),
        })
    }

    /// The name of a direct child formed by prepending `rdn`.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend_from_slice(&self.rdns);
        Dn { rdns }
    }

    /// Resolve a relative name beneath this one.
    ///
    /// `self` acts as the prefix: `"ou=system".join("ou=dept")` is
    /// `ou=dept,ou=system`. Joining the root relative name returns `self`
    /// unchanged.
    pub fn join(&self, relative: &Dn) -> Dn {
        if relative.is_root() {
            return self.clone();
        }
        let mut rdns = Vec::with_capacity(relative.rdns.len() + self.rdns.len());
        rdns.extend_from_slice(&relative.rdns);
        rdns.extend_from_slice(&self.rdns);
        Dn { rdns }
    }

    /// Number of RDN steps from `ancestor` down to this name.
    ///
    /// Returns `Some(0)` when the names are equal, `Some(k)` when this name
    /// has `k` components beneath `ancestor`, and `None` when this name does
    /// not lie within `ancestor` at all. O(depth), allocation-free.
    pub fn depth_below(&self, ancestor: &Dn) -> Option<usize> {
        if ancestor.rdns.len() > self.rdns.len() {
            return None;
        }
        let offset = self.rdns.len() - ancestor.rdns.len();
        if self.rdns[offset..] == ancestor.rdns[..] {
            Some(offset)
        } else {
            None
        }
    }

    /// Whether this name lies strictly beneath `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &Dn) -> bool {
        matches!(self.depth_below(ancestor), Some(d) if d > 0)
    }

    /// The name produced by replacing the leaf RDN.
    ///
    /// Returns `None` for the root, which has no RDN to replace.
    pub fn renamed(&self, new_rdn: Rdn) -> Option<Dn> {
        let mut rdns = self.rdns.clone();
        *rdns.first_mut()? = new_rdn;
        Some(Dn { rdns })
    }

    /// The name produced by moving the leaf beneath a new parent.
    ///
    /// Keeps the leaf RDN, replacing everything above it. Returns `None` for
    /// the root.
    pub fn moved_to(&self, new_parent: &Dn) -> Option<Dn> {
        let leaf = self.rdn()?.clone();
        Some(new_parent.child(leaf))
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rdn in &self.rdns {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", rdn)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Dn {
    type Err = DnParseError;

    fn from_str(s: &str) -> DnParseResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Dn {
    type Error = DnParseError;

    fn try_from(value: &str) -> DnParseResult<Self> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Dn {
    type Error = DnParseError;

    fn try_from(value: String) -> DnParseResult<Self> {
        Self::parse(&value)
    }
}

impl Serialize for Dn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let dn = Dn::parse("CN=Alice, OU=Dept , ou=system").unwrap();
        assert_eq!(dn.to_string(), "cn=alice,ou=dept,ou=system");
        assert_eq!(dn.depth(), 3);
        assert_eq!(dn.rdn().unwrap().attribute(), "cn");
        assert_eq!(dn.rdn().unwrap().value(), "alice");
    }

    #[test]
    fn test_parse_root() {
        let dn = Dn::parse("").unwrap();
        assert!(dn.is_root());
        assert_eq!(dn.to_string(), "");
        assert_eq!(Dn::parse("   ").unwrap(), Dn::root());
    }

    #[test]
    fn test_parse_rejects_malformed_components() {
        assert!(matches!(
            Dn::parse("cn=alice,,ou=system"),
            Err(DnParseError::EmptyComponent { .. })
        ));
        assert!(matches!(
            Dn::parse("bogus"),
            Err(DnParseError::MissingSeparator { .. })
        ));
        assert!(matches!(
            Dn::parse("cn=,ou=system"),
            Err(DnParseError::EmptyAttributeOrValue { .. })
        ));
    }

    #[test]
    fn test_parent_and_child() {
        let dn = Dn::parse("cn=alice,ou=dept").unwrap();
        let parent = dn.parent().unwrap();
        assert_eq!(parent, Dn::parse("ou=dept").unwrap());
        assert_eq!(parent.parent(), Some(Dn::root()));
        assert_eq!(Dn::root().parent(), None);

        let rebuilt = parent.child(Rdn::parse("cn=alice").unwrap());
        assert_eq!(rebuilt, dn);
    }

    #[test]
    fn test_join() {
        let prefix = Dn::parse("ou=system").unwrap();
        let relative = Dn::parse("cn=config,ou=dept").unwrap();
        let joined = prefix.join(&relative);
        assert_eq!(joined.to_string(), "cn=config,ou=dept,ou=system");
        assert_eq!(prefix.join(&Dn::root()), prefix);
    }

    #[test]
    fn test_depth_below() {
        let base = Dn::parse("ou=dept,ou=system").unwrap();
        let same = Dn::parse("ou=dept,ou=system").unwrap();
        let child = Dn::parse("cn=alice,ou=dept,ou=system").unwrap();
        let grandchild = Dn::parse("cn=x,cn=alice,ou=dept,ou=system").unwrap();
        let outside = Dn::parse("cn=alice,ou=other,ou=system").unwrap();

        assert_eq!(same.depth_below(&base), Some(0));
        assert_eq!(child.depth_below(&base), Some(1));
        assert_eq!(grandchild.depth_below(&base), Some(2));
        assert_eq!(outside.depth_below(&base), None);
        assert_eq!(base.depth_below(&child), None);
    }

    #[test]
    fn test_descendant_is_strict() {
        let base = Dn::parse("ou=dept").unwrap();
        assert!(!base.is_descendant_of(&base));
        assert!(Dn::parse("cn=alice,ou=dept").unwrap().is_descendant_of(&base));
        assert!(Dn::parse("cn=alice,ou=dept").unwrap().is_descendant_of(&Dn::root()));
    }

    #[test]
    fn test_renamed_and_moved() {
        let dn = Dn::parse("cn=alice,ou=dept").unwrap();
        let renamed = dn.renamed(Rdn::parse("cn=alicia").unwrap()).unwrap();
        assert_eq!(renamed.to_string(), "cn=alicia,ou=dept");

        let other = Dn::parse("ou=other").unwrap();
        let moved = dn.moved_to(&other).unwrap();
        assert_eq!(moved.to_string(), "cn=alice,ou=other");

        assert_eq!(Dn::root().renamed(Rdn::parse("cn=x").unwrap()), None);
        assert_eq!(Dn::root().moved_to(&other), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let dn = Dn::parse("cn=alice,ou=dept").unwrap();
        let json = serde_json::to_string(&dn).unwrap();
        assert_eq!(json, "\"cn=alice,ou=dept\"");
        let back: Dn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dn);

        let bad: Result<Dn, _> = serde_json::from_str("\"no-separator\"");
        assert!(bad.is_err());
    }
}
