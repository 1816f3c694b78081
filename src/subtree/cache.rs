//! Subentry specification cache.
//!
//! Maps each live subentry's distinguished name to its parsed subtree
//! specification. The cache is the single source of truth for which
//! subentries currently exist and what they cover; the lifecycle handlers
//! keep it aligned with the persisted subentry objects within the span of one
//! operation. It holds no validation logic of its own.
//!
//! Thread-safe via an async `RwLock` behind `Arc`; cloning shares the
//! underlying map, so one cache instance can be handed to the interceptor and
//! inspected from tests concurrently.

use crate::model::Dn;
use crate::subtree::spec::SubtreeSpecification;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared in-memory map: subentry DN → parsed subtree specification.
#[derive(Debug, Clone, Default)]
pub struct SubtreeCache {
    specs: Arc<RwLock<HashMap<Dn, SubtreeSpecification>>>,
}

impl SubtreeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The specification cached for a subentry, if any.
    pub async fn get(&self, dn: &Dn) -> Option<SubtreeSpecification> {
        self.specs.read().await.get(dn).cloned()
    }

    /// Insert or replace the specification for a subentry.
    pub async fn put(&self, dn: Dn, spec: SubtreeSpecification) {
        self.specs.write().await.insert(dn, spec);
    }

    /// Remove a subentry's specification, returning it if present.
    pub async fn remove(&self, dn: &Dn) -> Option<SubtreeSpecification> {
        self.specs.write().await.remove(dn)
    }

    /// The distinguished names of all cached subentries.
    pub async fn keys(&self) -> Vec<Dn> {
        self.specs.read().await.keys().cloned().collect()
    }

    /// A point-in-time copy of every cached `(name, specification)` pair.
    ///
    /// Handlers iterate over the snapshot rather than holding the lock
    /// across tree I/O.
    pub async fn snapshot(&self) -> Vec<(Dn, SubtreeSpecification)> {
        self.specs
            .read()
            .await
            .iter()
            .map(|(dn, spec)| (dn.clone(), spec.clone()))
            .collect()
    }

    /// Number of cached subentries.
    pub async fn len(&self) -> usize {
        self.specs.read().await.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.specs.read().await.is_empty()
    }

    /// Drop every cached specification.
    pub async fn clear(&self) {
        self.specs.write().await.clear();
    }
}
