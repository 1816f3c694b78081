//! Subentry lifecycle interception.
//!
//! [`SubentryInterceptor`] sits in front of the directory tree boundary and
//! keeps every ordinary entry's subentry back-references consistent with the
//! live set of subentries. Each structural operation (add, delete, modify,
//! rename, move) is validated, forwarded, and followed by zero or more
//! corrective scoped searches and modifies; list and search results pass
//! through the subentry visibility filter.
//!
//! # Consistency invariant
//!
//! After any successful operation: for every ordinary entry E and cached
//! subentry S under administrative point A, E's operational attribute for
//! each role of A contains S's name exactly when S's subtree specification
//! covers E.
//!
//! # Concurrency precondition
//!
//! Handlers share the [`SubtreeCache`] and interleave cache access with tree
//! I/O without taking a lock across the whole operation. The surrounding
//! pipeline must serialize structural writes over overlapping subtree
//! regions (single-writer or pessimistic subtree locking); this component
//! does not re-derive that discipline. Within that discipline each handler
//! either completes or fails synchronously; no background work, timeouts,
//! or cancellation.
//!
//! # Failure semantics
//!
//! Validation failures abort before any mutation. Once the primary write has
//! been forwarded, corrective modifies are best-effort per candidate: a
//! failure propagates without rolling back the primary write or corrections
//! already applied, and the caller may re-run [`SubentryInterceptor::rebuild`]
//! to reconverge from scratch.

pub mod lifecycle;
pub mod operational;
pub mod visibility;

pub use visibility::VisibilityFilter;

use crate::error::{SubentryError, SubentryResult};
use crate::model::{Dn, Entry, OBJECT_CLASS_AT, SUBENTRY_OC, SUBTREE_SPECIFICATION_AT};
use crate::nexus::{DirectoryNexus, Filter, SearchScope};
use crate::subtree::{SubtreeCache, parse_subtree_specification};
use log::{debug, info, warn};

/// Interceptor maintaining subentry-derived operational attributes.
///
/// Generic over the boundary `N`, which stands for the rest of the pipeline:
/// structural writes are forwarded to it after this component's pre-logic,
/// and corrective searches and modifies go through the same surface. The
/// cache is injected so tests (and a rebuild sweep) can share a handle.
#[derive(Debug, Clone)]
pub struct SubentryInterceptor<N: DirectoryNexus> {
    nexus: N,
    cache: SubtreeCache,
}

impl<N: DirectoryNexus> SubentryInterceptor<N> {
    /// Create an interceptor over the given boundary and cache.
    pub fn new(nexus: N, cache: SubtreeCache) -> Self {
        Self { nexus, cache }
    }

    /// The injected subentry specification cache.
    pub fn cache(&self) -> &SubtreeCache {
        &self.cache
    }

    /// The underlying tree boundary.
    pub fn nexus(&self) -> &N {
        &self.nexus
    }

    /// Populate the cache by scanning every root naming context for
    /// subentries.
    ///
    /// A subentry whose `subtreeSpecification` is missing or fails to parse
    /// is logged and skipped; one bad policy object does not abort startup.
    pub async fn initialize(&self, suffixes: &[Dn]) -> SubentryResult<()> {
        let filter = Filter::equality(OBJECT_CLASS_AT, SUBENTRY_OC);
        let mut cached = 0usize;
        for suffix in suffixes {
            let results = self
                .nexus
                .search(suffix, SearchScope::Subtree, &filter)
                .await
                .map_err(SubentryError::nexus)?;
            for (dn, entry) in results {
                let Some(text) = entry.first_value(SUBTREE_SPECIFICATION_AT) else {
                    warn!("subentry '{}' has no subtreeSpecification, skipping", dn);
                    continue;
                };
                match parse_subtree_specification(text) {
                    Ok(spec) => {
                        self.cache.put(dn, spec).await;
                        cached += 1;
                    }
                    Err(e) => {
                        warn!("skipping subentry '{}': {}", dn, e);
                    }
                }
            }
        }
        info!(
            "subentry cache initialized with {} specification(s) from {} suffix(es)",
            cached,
            suffixes.len()
        );
        Ok(())
    }

    /// Rebuild the cache from scratch by re-running the startup scan.
    ///
    /// The cache owns no persistent state, so this reconverges it with the
    /// tree after a partially-failed corrective phase.
    pub async fn rebuild(&self, suffixes: &[Dn]) -> SubentryResult<()> {
        debug!("rebuilding subentry cache");
        self.cache.clear().await;
        self.initialize(suffixes).await
    }

    pub(crate) async fn require_entry(&self, dn: &Dn) -> SubentryResult<Entry> {
        self.nexus
            .lookup(dn)
            .await
            .map_err(SubentryError::nexus)?
            .ok_or_else(|| SubentryError::no_such_object(dn.clone()))
    }
}
