//! Directory tree boundary.
//!
//! This module defines the contract the interceptor consumes from the
//! surrounding tree and pipeline layer: raw lookup, search, and write
//! operations over the directory information tree. The trait is deliberately
//! free of subentry semantics: it moves entries and attribute values and
//! nothing more, so any partition or pipeline tail can stand behind it.
//!
//! # Architecture
//!
//! The boundary is responsible for:
//! - Entry lookup and scoped, filtered search
//! - Applying ordered modification lists to single entries
//! - Structural writes: add, delete, rename, move
//!
//! The boundary is NOT responsible for:
//! - Subtree specification parsing or evaluation
//! - Operational-attribute maintenance
//! - Subentry visibility rules

pub mod errors;
pub mod in_memory;

pub use errors::NexusError;
pub use in_memory::InMemoryNexus;

use crate::model::{Dn, Entry, Rdn};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Scope of a search operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchScope {
    /// The base entry alone.
    Object,
    /// Direct children of the base, excluding the base itself.
    OneLevel,
    /// The base entry and all of its descendants.
    Subtree,
}

impl SearchScope {
    /// Whether `candidate` falls inside this scope rooted at `base`.
    pub fn contains(&self, base: &Dn, candidate: &Dn) -> bool {
        match self {
            Self::Object => candidate == base,
            Self::OneLevel => candidate.depth_below(base) == Some(1),
            Self::Subtree => candidate.depth_below(base).is_some(),
        }
    }
}

/// A search filter.
///
/// Only the forms the interceptor needs are modeled: attribute presence and
/// attribute equality. Equality on values is exact except for object classes,
/// which compare case-insensitively through the entry model's normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Matches entries carrying the attribute with at least one value.
    Present(String),
    /// Matches entries whose attribute contains the value.
    Equality(String, String),
}

impl Filter {
    /// Presence filter on an attribute.
    pub fn present(attribute: impl Into<String>) -> Self {
        Self::Present(attribute.into())
    }

    /// Equality filter on an attribute value.
    pub fn equality(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equality(attribute.into(), value.into())
    }

    /// Whether an entry matches this filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::Present(attribute) => entry.has_attribute(attribute),
            Self::Equality(attribute, value) => {
                if attribute.eq_ignore_ascii_case(crate::model::OBJECT_CLASS_AT) {
                    entry.has_object_class(value)
                } else {
                    entry.has_value(attribute, value)
                }
            }
        }
    }
}

/// The change operation of a single modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeOperation {
    /// Add values to the attribute, creating it if absent.
    Add,
    /// Replace the attribute's full value set.
    Replace,
    /// Remove the listed values, or the whole attribute when none listed.
    Remove,
}

/// One element of an ordered modification list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub op: ChangeOperation,
    pub attribute: String,
    pub values: Vec<String>,
}

impl Modification {
    /// An `Add` modification.
    pub fn add<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            op: ChangeOperation::Add,
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A `Replace` modification.
    pub fn replace<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            op: ChangeOperation::Replace,
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A `Remove` modification targeting specific values.
    pub fn remove<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            op: ChangeOperation::Remove,
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A `Remove` modification dropping the attribute entirely.
    pub fn remove_attribute(attribute: impl Into<String>) -> Self {
        Self {
            op: ChangeOperation::Remove,
            attribute: attribute.into(),
            values: Vec::new(),
        }
    }
}

/// Contract consumed from the surrounding tree and pipeline layer.
///
/// Implementations stand for "the rest of the pipeline": the interceptor
/// forwards structural writes here after its pre-logic and issues its
/// corrective searches and modifies through the same surface.
///
/// Search results are finite and fully materialized; consistent ordering is
/// expected so corrective sweeps behave deterministically.
pub trait DirectoryNexus: Send + Sync {
    /// The error type returned by tree operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch an entry by name.
    ///
    /// Absence is `Ok(None)`; callers that require presence map it to their
    /// own missing-object error.
    fn lookup(&self, dn: &Dn) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send;

    /// Scoped, filtered search beneath `base`.
    fn search(
        &self,
        base: &Dn,
        scope: SearchScope,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<(Dn, Entry)>, Self::Error>> + Send;

    /// Apply an ordered modification list to one entry.
    fn modify(
        &self,
        dn: &Dn,
        changes: &[Modification],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Create an entry.
    fn add(&self, entry: Entry) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete a leaf entry.
    fn delete(&self, dn: &Dn) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Rename an entry in place, returning its new name.
    fn rename(
        &self,
        dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
    ) -> impl Future<Output = Result<Dn, Self::Error>> + Send;

    /// Move an entry (and its subtree) beneath a new parent, optionally
    /// renaming its leaf RDN, returning the new name.
    fn move_entry(
        &self,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: Option<&Rdn>,
    ) -> impl Future<Output = Result<Dn, Self::Error>> + Send;
}
