//! Directory entry model.
//!
//! An [`Entry`] is a distinguished name plus an attribute map. Attribute
//! identifiers are case-insensitive and held in normalized lowercase form;
//! values are ordered sets, so multi-valued attributes deduplicate and
//! serialize deterministically. Object-class values are also normalized,
//! since class membership checks are case-insensitive throughout the
//! administrative model.

use crate::model::Dn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Normalized identifier of the object-class attribute.
pub const OBJECT_CLASS_AT: &str = "objectclass";
/// Object class marking an entry as a subentry.
pub const SUBENTRY_OC: &str = "subentry";
/// Numeric OID form of the subentry object class.
pub const SUBENTRY_OC_OID: &str = "2.5.17.0";
/// Attribute naming the administrative roles of an administrative point.
pub const ADMINISTRATIVE_ROLE_AT: &str = "administrativerole";
/// Attribute holding a subentry's subtree specification.
pub const SUBTREE_SPECIFICATION_AT: &str = "subtreespecification";

/// A directory entry: a name and its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    dn: Dn,
    attributes: BTreeMap<String, BTreeSet<String>>,
}

impl Entry {
    /// Create an entry with no attributes.
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper adding an attribute with the given values.
    pub fn with_attribute<I, V>(mut self, attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.add_value(attribute, value.into());
        }
        self
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    /// Re-key the entry under a new name. Used by the tree when an entry is
    /// renamed or moved.
    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    /// The value set of an attribute, if present.
    pub fn attribute(&self, attribute: &str) -> Option<&BTreeSet<String>> {
        self.attributes.get(&normalize_id(attribute))
    }

    /// The first value of an attribute, if present.
    pub fn first_value(&self, attribute: &str) -> Option<&str> {
        self.attribute(attribute)
            .and_then(|values| values.iter().next())
            .map(String::as_str)
    }

    /// Whether the entry carries the attribute with at least one value.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attribute(attribute).is_some_and(|v| !v.is_empty())
    }

    /// Whether the attribute contains the exact value.
    pub fn has_value(&self, attribute: &str, value: &str) -> bool {
        self.attribute(attribute).is_some_and(|v| v.contains(value))
    }

    /// Add a value to an attribute, creating the attribute if absent.
    pub fn add_value(&mut self, attribute: &str, value: impl Into<String>) {
        let id = normalize_id(attribute);
        let mut value = value.into();
        if id == OBJECT_CLASS_AT {
            value = value.to_ascii_lowercase();
        }
        self.attributes.entry(id).or_default().insert(value);
    }

    /// Remove a single value from an attribute.
    ///
    /// The attribute itself is dropped when its value set empties; entries
    /// never carry empty attributes. Returns whether the value was present.
    pub fn remove_value(&mut self, attribute: &str, value: &str) -> bool {
        let id = normalize_id(attribute);
        let Some(values) = self.attributes.get_mut(&id) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.attributes.remove(&id);
        }
        removed
    }

    /// Replace the full value set of an attribute.
    ///
    /// An empty replacement drops the attribute.
    pub fn replace_values<I, V>(&mut self, attribute: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let id = normalize_id(attribute);
        self.attributes.remove(&id);
        for value in values {
            self.add_value(attribute, value.into());
        }
    }

    /// Drop an attribute entirely. Returns its former values, if any.
    pub fn remove_attribute(&mut self, attribute: &str) -> Option<BTreeSet<String>> {
        self.attributes.remove(&normalize_id(attribute))
    }

    /// Iterate over `(attribute, values)` pairs in normalized order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The entry's object classes (empty set when the attribute is absent).
    pub fn object_classes(&self) -> BTreeSet<String> {
        self.attribute(OBJECT_CLASS_AT).cloned().unwrap_or_default()
    }

    /// Case-insensitive object-class membership check.
    pub fn has_object_class(&self, class: &str) -> bool {
        self.has_value(OBJECT_CLASS_AT, &class.to_ascii_lowercase())
    }

    /// Whether this entry is a subentry, by descriptor or numeric OID.
    pub fn is_subentry(&self) -> bool {
        self.has_object_class(SUBENTRY_OC) || self.has_object_class(SUBENTRY_OC_OID)
    }
}

fn normalize_id(attribute: &str) -> String {
    attribute.trim().to_ascii_lowercase()
}
