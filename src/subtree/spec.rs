//! Subtree specification values.
//!
//! A [`SubtreeSpecification`] selects a subset of the subtree beneath an
//! administrative point: a relative base, chop exclusions, depth bounds, and
//! an optional refinement over object classes. Values are immutable once
//! parsed; the lifecycle handlers replace them wholesale, never edit them.

use crate::model::Dn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An immutable subtree specification.
///
/// All names are relative: `base` is resolved against the administrative
/// point, and the chop exclusions are resolved against the resolved base.
/// The default value (`{}` in the textual form) covers the administrative
/// point's entire subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubtreeSpecification {
    /// Base of the selected subtree, relative to the administrative point.
    pub base: Dn,
    /// Exclusions removing a named node and its whole subtree.
    pub chop_before: Vec<Dn>,
    /// Exclusions removing only the descendants of a named node.
    pub chop_after: Vec<Dn>,
    /// Minimum depth below the base (0 selects the base node itself).
    pub minimum: usize,
    /// Maximum depth below the base; `None` is unbounded.
    pub maximum: Option<usize>,
    /// Optional object-class refinement.
    pub refinement: Option<Refinement>,
}

impl SubtreeSpecification {
    /// A specification covering the whole administrative area.
    pub fn whole_area() -> Self {
        Self::default()
    }

    /// Builder-style helper setting the relative base.
    pub fn with_base(mut self, base: Dn) -> Self {
        self.base = base;
        self
    }

    /// Builder-style helper setting the depth bounds.
    pub fn with_bounds(mut self, minimum: usize, maximum: Option<usize>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// Builder-style helper adding a chop-before exclusion.
    pub fn with_chop_before(mut self, name: Dn) -> Self {
        self.chop_before.push(name);
        self
    }

    /// Builder-style helper adding a chop-after exclusion.
    pub fn with_chop_after(mut self, name: Dn) -> Self {
        self.chop_after.push(name);
        self
    }

    /// Builder-style helper setting the refinement.
    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }
}

/// A refinement filter over an entry's object classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Refinement {
    /// Satisfied when the class set contains the named class.
    Item(String),
    /// Satisfied when every nested refinement is satisfied.
    And(Vec<Refinement>),
    /// Satisfied when at least one nested refinement is satisfied.
    Or(Vec<Refinement>),
    /// Satisfied when the nested refinement is not.
    Not(Box<Refinement>),
}

impl Refinement {
    /// A refinement on a single object class.
    pub fn item(class: impl Into<String>) -> Self {
        Self::Item(class.into().to_ascii_lowercase())
    }

    /// Evaluate this refinement against a normalized object-class set.
    pub fn matches(&self, classes: &BTreeSet<String>) -> bool {
        match self {
            Self::Item(class) => classes.contains(class),
            Self::And(nested) => nested.iter().all(|r| r.matches(classes)),
            Self::Or(nested) => nested.iter().any(|r| r.matches(classes)),
            Self::Not(nested) => !nested.matches(classes),
        }
    }
}
