//! Operation handlers for the subentry interceptor.
//!
//! Five independent handlers share the cache and the computers: each decides
//! which branch applies (subentry vs ordinary target), performs the primary
//! write through the boundary, then runs its corrective scoped sweep. The
//! read paths (`search`, `list`) only apply the visibility filter.

use crate::error::{SubentryError, SubentryResult};
use crate::interceptor::operational::{
    additions_for, administrative_roles, attributes_for, removals_for, replacements_for,
};
use crate::interceptor::{SubentryInterceptor, VisibilityFilter};
use crate::model::{
    Dn, Entry, OBJECT_CLASS_AT, Rdn, RequestContext, SUBENTRY_OPERATIONAL_ATTRIBUTES,
    SUBTREE_SPECIFICATION_AT,
};
use crate::nexus::{ChangeOperation, DirectoryNexus, Filter, Modification, SearchScope};
use crate::subtree::{SubtreeSpecification, evaluate, parse_subtree_specification};
use log::{debug, warn};
use std::collections::BTreeMap;

impl<N: DirectoryNexus> SubentryInterceptor<N> {
    /// Handle an add operation.
    ///
    /// A subentry add validates its administrative point and specification
    /// before any mutation, then sweeps the scoped base adding references to
    /// covered entries. An ordinary add is seeded with the references of
    /// every covering cached subentry before forwarding, so the entry is
    /// created already consistent in a single write.
    pub async fn add(&self, entry: Entry, ctx: &RequestContext) -> SubentryResult<()> {
        debug!("[{}] add '{}'", ctx.request_id, entry.dn());
        if entry.is_subentry() {
            self.add_subentry(entry).await
        } else {
            self.add_ordinary(entry).await
        }
    }

    async fn add_subentry(&self, entry: Entry) -> SubentryResult<()> {
        let dn = entry.dn().clone();
        let admin_point = dn.parent().ok_or_else(|| {
            SubentryError::constraint_violation("a subentry cannot be a root naming context")
        })?;

        // Validation phase: nothing below may mutate cache or tree.
        let point_entry = self.require_entry(&admin_point).await?;
        let roles = administrative_roles(&point_entry)?;
        let text = entry.first_value(SUBTREE_SPECIFICATION_AT).ok_or_else(|| {
            SubentryError::no_such_attribute("subtreeSpecification", dn.clone())
        })?;
        let spec = parse_subtree_specification(text)?;

        self.cache.put(dn.clone(), spec.clone()).await;
        if let Err(e) = self.nexus.add(entry).await {
            self.cache.remove(&dn).await;
            return Err(SubentryError::nexus(e));
        }

        let additions = additions_for(&dn, &roles);
        let mut corrected = 0usize;
        for (candidate_dn, candidate) in self.scoped_candidates(&admin_point, &spec).await? {
            if evaluate(&spec, &admin_point, &candidate_dn, &candidate.object_classes()) {
                self.nexus
                    .modify(&candidate_dn, &additions)
                    .await
                    .map_err(SubentryError::nexus)?;
                corrected += 1;
            }
        }
        debug!("subentry '{}' added, {} entries referenced", dn, corrected);
        Ok(())
    }

    async fn add_ordinary(&self, mut entry: Entry) -> SubentryResult<()> {
        let classes = entry.object_classes();
        for (subentry_dn, spec) in self.cache.snapshot().await {
            let Some(admin_point) = subentry_dn.parent() else {
                continue;
            };
            if !evaluate(&spec, &admin_point, entry.dn(), &classes) {
                continue;
            }
            let Some(point_entry) = self
                .nexus
                .lookup(&admin_point)
                .await
                .map_err(SubentryError::nexus)?
            else {
                warn!(
                    "administrative point '{}' of cached subentry '{}' is gone",
                    admin_point, subentry_dn
                );
                continue;
            };
            let roles = administrative_roles(&point_entry)?;
            for (attribute, value) in attributes_for(&subentry_dn, &roles) {
                entry.add_value(attribute, value);
            }
        }
        self.nexus.add(entry).await.map_err(SubentryError::nexus)
    }

    /// Handle a delete operation.
    ///
    /// Deleting a subentry strips its references from every entry in the old
    /// scoped base that actually carries one. Ordinary deletes forward
    /// unchanged: the deleted identity was never a subentry, so no other
    /// entry references it.
    pub async fn delete(&self, dn: &Dn, ctx: &RequestContext) -> SubentryResult<()> {
        debug!("[{}] delete '{}'", ctx.request_id, dn);
        let entry = self.require_entry(dn).await?;
        if !entry.is_subentry() {
            return self.nexus.delete(dn).await.map_err(SubentryError::nexus);
        }

        let removed = self.cache.remove(dn).await;
        if let Err(e) = self.nexus.delete(dn).await {
            if let Some(spec) = removed {
                self.cache.put(dn.clone(), spec).await;
            }
            return Err(SubentryError::nexus(e));
        }

        let spec = removed.unwrap_or_default();
        let admin_point = dn.parent().unwrap_or_else(Dn::root);
        for (candidate_dn, candidate) in self.scoped_candidates(&admin_point, &spec).await? {
            let removals = removals_for(&candidate, dn);
            if !removals.is_empty() {
                self.nexus
                    .modify(&candidate_dn, &removals)
                    .await
                    .map_err(SubentryError::nexus)?;
            }
        }
        Ok(())
    }

    /// Handle a rename-in-place operation, returning the new name.
    pub async fn rename(
        &self,
        dn: &Dn,
        new_rdn: &Rdn,
        delete_old_rdn: bool,
        ctx: &RequestContext,
    ) -> SubentryResult<Dn> {
        debug!("[{}] rename '{}' to '{}'", ctx.request_id, dn, new_rdn);
        let entry = self.require_entry(dn).await?;
        if entry.is_subentry() {
            let spec = self.cache.remove(dn).await.unwrap_or_default();
            let new_dn = dn
                .renamed(new_rdn.clone())
                .ok_or_else(|| SubentryError::constraint_violation("cannot rename the root"))?;
            self.cache.put(new_dn.clone(), spec.clone()).await;
            match self.nexus.rename(dn, new_rdn, delete_old_rdn).await {
                Ok(renamed) => {
                    self.relink_subentry(dn, &renamed, &spec).await?;
                    Ok(renamed)
                }
                Err(e) => {
                    self.cache.remove(&new_dn).await;
                    self.cache.put(dn.clone(), spec).await;
                    Err(SubentryError::nexus(e))
                }
            }
        } else {
            self.reject_administrative_relocation(dn).await?;
            let new_dn = self
                .nexus
                .rename(dn, new_rdn, delete_old_rdn)
                .await
                .map_err(SubentryError::nexus)?;
            self.resync_relocated_entry(dn, &new_dn).await?;
            Ok(new_dn)
        }
    }

    /// Handle a move (optionally with a new leaf RDN), returning the new
    /// name.
    pub async fn move_entry(
        &self,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: Option<&Rdn>,
        ctx: &RequestContext,
    ) -> SubentryResult<Dn> {
        debug!(
            "[{}] move '{}' under '{}'",
            ctx.request_id, dn, new_parent
        );
        let entry = self.require_entry(dn).await?;
        if entry.is_subentry() {
            let spec = self.cache.remove(dn).await.unwrap_or_default();
            let leaf = new_rdn
                .cloned()
                .or_else(|| dn.rdn().cloned())
                .ok_or_else(|| SubentryError::constraint_violation("cannot move the root"))?;
            let new_dn = new_parent.child(leaf);
            self.cache.put(new_dn.clone(), spec.clone()).await;
            match self.nexus.move_entry(dn, new_parent, new_rdn).await {
                Ok(moved) => {
                    self.relink_subentry(dn, &moved, &spec).await?;
                    Ok(moved)
                }
                Err(e) => {
                    self.cache.remove(&new_dn).await;
                    self.cache.put(dn.clone(), spec).await;
                    Err(SubentryError::nexus(e))
                }
            }
        } else {
            self.reject_administrative_relocation(dn).await?;
            let new_dn = self
                .nexus
                .move_entry(dn, new_parent, new_rdn)
                .await
                .map_err(SubentryError::nexus)?;
            self.resync_relocated_entry(dn, &new_dn).await?;
            Ok(new_dn)
        }
    }

    /// Handle a modify operation.
    ///
    /// Only a change to a subentry's `subtreeSpecification` triggers
    /// recomputation: the old scope is swept stripping references from
    /// entries the old specification covered, then the new scope is swept
    /// adding references to entries the new specification covers. Every
    /// other modify forwards unchanged, since neither administrative
    /// structure nor subtree scope moved.
    pub async fn modify(
        &self,
        dn: &Dn,
        changes: &[Modification],
        ctx: &RequestContext,
    ) -> SubentryResult<()> {
        debug!("[{}] modify '{}'", ctx.request_id, dn);
        let entry = self.require_entry(dn).await?;
        if !entry.is_subentry() || !touches_subtree_specification(changes) {
            return self
                .nexus
                .modify(dn, changes)
                .await
                .map_err(SubentryError::nexus);
        }

        let text = new_specification_text(changes).ok_or_else(|| {
            SubentryError::constraint_violation(
                "a subentry must retain a subtreeSpecification value",
            )
        })?;
        let new_spec = parse_subtree_specification(text)?;

        let admin_point = dn.parent().unwrap_or_else(Dn::root);
        let old_spec = self.cache.remove(dn).await.unwrap_or_default();
        self.cache.put(dn.clone(), new_spec.clone()).await;
        if let Err(e) = self.nexus.modify(dn, changes).await {
            self.cache.remove(dn).await;
            self.cache.put(dn.clone(), old_spec).await;
            return Err(SubentryError::nexus(e));
        }

        // Strip across the old scope first, then add across the new one; an
        // entry covered by both transiently loses and regains its reference
        // within the same corrective phase.
        for (candidate_dn, candidate) in self.scoped_candidates(&admin_point, &old_spec).await? {
            if evaluate(&old_spec, &admin_point, &candidate_dn, &candidate.object_classes()) {
                let removals = removals_for(&candidate, dn);
                if !removals.is_empty() {
                    self.nexus
                        .modify(&candidate_dn, &removals)
                        .await
                        .map_err(SubentryError::nexus)?;
                }
            }
        }

        let point_entry = self.require_entry(&admin_point).await?;
        let roles = administrative_roles(&point_entry)?;
        let additions = additions_for(dn, &roles);
        for (candidate_dn, candidate) in self.scoped_candidates(&admin_point, &new_spec).await? {
            if evaluate(&new_spec, &admin_point, &candidate_dn, &candidate.object_classes()) {
                self.nexus
                    .modify(&candidate_dn, &additions)
                    .await
                    .map_err(SubentryError::nexus)?;
            }
        }
        Ok(())
    }

    /// Scoped, filtered search with subentry visibility applied.
    pub async fn search(
        &self,
        base: &Dn,
        scope: SearchScope,
        filter: &Filter,
        ctx: &RequestContext,
    ) -> SubentryResult<Vec<(Dn, Entry)>> {
        let results = self
            .nexus
            .search(base, scope, filter)
            .await
            .map_err(SubentryError::nexus)?;
        Ok(VisibilityFilter::wrap(results.into_iter(), scope, ctx).collect())
    }

    /// List the children of an entry, hiding subentries unless requested.
    pub async fn list(&self, base: &Dn, ctx: &RequestContext) -> SubentryResult<Vec<(Dn, Entry)>> {
        self.search(
            base,
            SearchScope::OneLevel,
            &Filter::present(OBJECT_CLASS_AT),
            ctx,
        )
        .await
    }

    /// Every entry in the subtree rooted at the specification's resolved
    /// base. Candidates are filtered by the evaluator at the call site.
    async fn scoped_candidates(
        &self,
        admin_point: &Dn,
        spec: &SubtreeSpecification,
    ) -> SubentryResult<Vec<(Dn, Entry)>> {
        let base = admin_point.join(&spec.base);
        self.nexus
            .search(&base, SearchScope::Subtree, &Filter::present(OBJECT_CLASS_AT))
            .await
            .map_err(SubentryError::nexus)
    }

    /// Swap a relocated subentry's old name for its new one across the
    /// (possibly relocated) scoped base.
    async fn relink_subentry(
        &self,
        old_dn: &Dn,
        new_dn: &Dn,
        spec: &SubtreeSpecification,
    ) -> SubentryResult<()> {
        let admin_point = new_dn.parent().unwrap_or_else(Dn::root);
        let mut relinked = 0usize;
        for (candidate_dn, candidate) in self.scoped_candidates(&admin_point, spec).await? {
            let swaps = replacements_for(&candidate, old_dn, new_dn);
            if !swaps.is_empty() {
                self.nexus
                    .modify(&candidate_dn, &swaps)
                    .await
                    .map_err(SubentryError::nexus)?;
                relinked += 1;
            }
        }
        debug!(
            "subentry '{}' relocated to '{}', {} references updated",
            old_dn, new_dn, relinked
        );
        Ok(())
    }

    /// Administrative points cannot be silently relocated: reject when any
    /// strict descendant carries an `administrativeRole`.
    async fn reject_administrative_relocation(&self, dn: &Dn) -> SubentryResult<()> {
        let descendants = self
            .nexus
            .search(
                dn,
                SearchScope::Subtree,
                &Filter::present("administrativeRole"),
            )
            .await
            .map_err(SubentryError::nexus)?;
        if descendants.iter().any(|(candidate, _)| candidate != dn) {
            return Err(SubentryError::not_allowed_on_rdn(
                dn.clone(),
                "an administrative point lies beneath it",
            ));
        }
        Ok(())
    }

    /// Recompute an ordinary entry's references after a rename or move.
    ///
    /// For every cached subentry, inclusion is evaluated against the old and
    /// the new name; lost coverage strips the reference and gained coverage
    /// adds it. The final per-attribute value sets are diffed against the
    /// entry's current state to emit `Add` for new attributes, `Replace` for
    /// changed ones, and `Remove` for emptied ones. An attribute whose value
    /// set empties is removed, never left empty.
    async fn resync_relocated_entry(&self, old_dn: &Dn, new_dn: &Dn) -> SubentryResult<()> {
        let entry = self.require_entry(new_dn).await?;
        let classes = entry.object_classes();

        let mut desired: BTreeMap<&'static str, std::collections::BTreeSet<String>> =
            SUBENTRY_OPERATIONAL_ATTRIBUTES
                .iter()
                .map(|attribute| {
                    (
                        *attribute,
                        entry.attribute(attribute).cloned().unwrap_or_default(),
                    )
                })
                .collect();

        for (subentry_dn, spec) in self.cache.snapshot().await {
            let Some(admin_point) = subentry_dn.parent() else {
                continue;
            };
            let was_covered = evaluate(&spec, &admin_point, old_dn, &classes);
            let now_covered = evaluate(&spec, &admin_point, new_dn, &classes);
            if was_covered == now_covered {
                continue;
            }
            let reference = subentry_dn.to_string();
            if now_covered {
                let point_entry = self.require_entry(&admin_point).await?;
                let roles = administrative_roles(&point_entry)?;
                for (attribute, value) in attributes_for(&subentry_dn, &roles) {
                    desired.entry(attribute).or_default().insert(value);
                }
            } else {
                for values in desired.values_mut() {
                    values.remove(&reference);
                }
            }
        }

        let mut changes = Vec::new();
        for (attribute, values) in desired {
            let current = entry.attribute(attribute);
            match current {
                None if values.is_empty() => {}
                None => changes.push(Modification::add(attribute, values)),
                Some(_) if values.is_empty() => {
                    changes.push(Modification::remove_attribute(attribute));
                }
                Some(current) if *current != values => {
                    changes.push(Modification::replace(attribute, values));
                }
                Some(_) => {}
            }
        }

        if !changes.is_empty() {
            self.nexus
                .modify(new_dn, &changes)
                .await
                .map_err(SubentryError::nexus)?;
        }
        Ok(())
    }
}

fn touches_subtree_specification(changes: &[Modification]) -> bool {
    changes
        .iter()
        .any(|change| normalized(&change.attribute) == SUBTREE_SPECIFICATION_AT)
}

/// The specification text a modify leaves in effect: the last `Add` or
/// `Replace` on the attribute with a value. A change list that only removes
/// the attribute yields `None`.
fn new_specification_text(changes: &[Modification]) -> Option<&str> {
    changes
        .iter()
        .rev()
        .find(|change| {
            normalized(&change.attribute) == SUBTREE_SPECIFICATION_AT
                && matches!(change.op, ChangeOperation::Add | ChangeOperation::Replace)
                && !change.values.is_empty()
        })
        .map(|change| change.values[0].as_str())
}

fn normalized(attribute: &str) -> String {
    attribute.trim().to_ascii_lowercase()
}
