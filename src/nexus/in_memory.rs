//! In-memory directory tree.
//!
//! A thread-safe reference implementation of [`DirectoryNexus`] over a
//! `HashMap` keyed by distinguished name. It enforces the structural rules
//! the interceptor relies on (parents must exist before children, deletes
//! refuse non-leaves, renames and moves re-key whole subtrees) and stamps
//! the usual entry metadata (`createTimestamp`, `modifyTimestamp`,
//! `entryUUID`).
//!
//! Intended for tests, development, and the consistency rebuild sweep; a
//! production deployment puts its partition layer behind the same trait.

use crate::model::{Dn, Entry, Rdn};
use crate::nexus::errors::{NexusError, NexusResult};
use crate::nexus::{ChangeOperation, DirectoryNexus, Filter, Modification, SearchScope};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Attribute stamped with an entry's creation time.
pub const CREATE_TIMESTAMP_AT: &str = "createTimestamp";
/// Attribute stamped with an entry's last modification time.
pub const MODIFY_TIMESTAMP_AT: &str = "modifyTimestamp";
/// Attribute holding an entry's generated identifier.
pub const ENTRY_UUID_AT: &str = "entryUUID";

/// Thread-safe in-memory tree implementation.
///
/// Cloning shares the underlying map, so a test can keep a handle for
/// direct inspection while the interceptor owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNexus {
    entries: Arc<RwLock<HashMap<Dn, Entry>>>,
}

impl InMemoryNexus {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the tree.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the tree is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry (useful for testing).
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn generalized_time() -> String {
        Utc::now().format("%Y%m%d%H%M%SZ").to_string()
    }

    fn apply_change(entry: &mut Entry, change: &Modification) {
        match change.op {
            ChangeOperation::Add => {
                for value in &change.values {
                    entry.add_value(&change.attribute, value.clone());
                }
            }
            ChangeOperation::Replace => {
                entry.replace_values(&change.attribute, change.values.iter().cloned());
            }
            ChangeOperation::Remove => {
                if change.values.is_empty() {
                    entry.remove_attribute(&change.attribute);
                } else {
                    for value in &change.values {
                        entry.remove_value(&change.attribute, value);
                    }
                }
            }
        }
    }

    /// Re-key every entry of the subtree rooted at `old_base` beneath
    /// `new_base`. The caller has already checked the target is free.
    fn rekey_subtree(entries: &mut HashMap<Dn, Entry>, old_base: &Dn, new_base: &Dn) {
        let moved: Vec<Dn> = entries
            .keys()
            .filter(|key| key.depth_below(old_base).is_some())
            .cloned()
            .collect();
        let mut rekeyed = Vec::with_capacity(moved.len());
        for key in moved {
            let offset = key
                .depth_below(old_base)
                .expect("key was selected as part of the subtree");
            let relative = Dn::from_rdns(key.rdns()[..offset].to_vec());
            let new_key = new_base.join(&relative);
            let mut entry = entries
                .remove(&key)
                .expect("key was collected from the map");
            entry.set_dn(new_key.clone());
            rekeyed.push((new_key, entry));
        }
        for (key, entry) in rekeyed {
            entries.insert(key, entry);
        }
    }
}

impl DirectoryNexus for InMemoryNexus {
    type Error = NexusError;

    async fn lookup(&self, dn: &Dn) -> NexusResult<Option<Entry>> {
        Ok(self.entries.read().await.get(dn).cloned())
    }

    async fn search(
        &self,
        base: &Dn,
        scope: SearchScope,
        filter: &Filter,
    ) -> NexusResult<Vec<(Dn, Entry)>> {
        let entries = self.entries.read().await;
        let mut results: Vec<(Dn, Entry)> = entries
            .iter()
            .filter(|(dn, entry)| scope.contains(base, dn) && filter.matches(entry))
            .map(|(dn, entry)| (dn.clone(), entry.clone()))
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(results)
    }

    async fn modify(&self, dn: &Dn, changes: &[Modification]) -> NexusResult<()> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(dn)
            .ok_or_else(|| NexusError::no_such_object(dn.clone()))?;
        for change in changes {
            Self::apply_change(entry, change);
        }
        entry.replace_values(MODIFY_TIMESTAMP_AT, [Self::generalized_time()]);
        Ok(())
    }

    async fn add(&self, mut entry: Entry) -> NexusResult<()> {
        let mut entries = self.entries.write().await;
        let dn = entry.dn().clone();
        let Some(parent) = dn.parent() else {
            return Err(NexusError::invalid_name("cannot add the root entry"));
        };
        if entries.contains_key(&dn) {
            return Err(NexusError::entry_exists(dn));
        }
        if !parent.is_root() && !entries.contains_key(&parent) {
            return Err(NexusError::no_such_object(parent));
        }
        let now = Self::generalized_time();
        if !entry.has_attribute(ENTRY_UUID_AT) {
            entry.add_value(ENTRY_UUID_AT, Uuid::new_v4().to_string());
        }
        entry.replace_values(CREATE_TIMESTAMP_AT, [now.clone()]);
        entry.replace_values(MODIFY_TIMESTAMP_AT, [now]);
        entries.insert(dn, entry);
        Ok(())
    }

    async fn delete(&self, dn: &Dn) -> NexusResult<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(dn) {
            return Err(NexusError::no_such_object(dn.clone()));
        }
        if entries.keys().any(|key| key.is_descendant_of(dn)) {
            return Err(NexusError::not_allowed_on_non_leaf(dn.clone()));
        }
        entries.remove(dn);
        Ok(())
    }

    async fn rename(&self, dn: &Dn, new_rdn: &Rdn, delete_old_rdn: bool) -> NexusResult<Dn> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(dn) {
            return Err(NexusError::no_such_object(dn.clone()));
        }
        let old_rdn = dn
            .rdn()
            .cloned()
            .ok_or_else(|| NexusError::invalid_name("cannot rename the root entry"))?;
        let new_dn = dn
            .renamed(new_rdn.clone())
            .ok_or_else(|| NexusError::invalid_name("cannot rename the root entry"))?;
        if new_dn == *dn {
            return Ok(new_dn);
        }
        if entries.contains_key(&new_dn) {
            return Err(NexusError::entry_exists(new_dn));
        }
        Self::rekey_subtree(&mut entries, dn, &new_dn);
        let entry = entries
            .get_mut(&new_dn)
            .expect("renamed entry was just re-keyed");
        entry.add_value(new_rdn.attribute(), new_rdn.value().to_string());
        if delete_old_rdn && old_rdn != *new_rdn {
            entry.remove_value(old_rdn.attribute(), old_rdn.value());
        }
        entry.replace_values(MODIFY_TIMESTAMP_AT, [Self::generalized_time()]);
        Ok(new_dn)
    }

    async fn move_entry(
        &self,
        dn: &Dn,
        new_parent: &Dn,
        new_rdn: Option<&Rdn>,
    ) -> NexusResult<Dn> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(dn) {
            return Err(NexusError::no_such_object(dn.clone()));
        }
        if !new_parent.is_root() && !entries.contains_key(new_parent) {
            return Err(NexusError::no_such_object(new_parent.clone()));
        }
        if new_parent.depth_below(dn).is_some() {
            return Err(NexusError::invalid_name(
                "cannot move an entry beneath itself",
            ));
        }
        let old_rdn = dn
            .rdn()
            .cloned()
            .ok_or_else(|| NexusError::invalid_name("cannot move the root entry"))?;
        let leaf = new_rdn.cloned().unwrap_or_else(|| old_rdn.clone());
        let new_dn = new_parent.child(leaf.clone());
        if new_dn == *dn {
            return Ok(new_dn);
        }
        if entries.contains_key(&new_dn) {
            return Err(NexusError::entry_exists(new_dn));
        }
        Self::rekey_subtree(&mut entries, dn, &new_dn);
        let entry = entries
            .get_mut(&new_dn)
            .expect("moved entry was just re-keyed");
        if leaf != old_rdn {
            entry.add_value(leaf.attribute(), leaf.value().to_string());
            entry.remove_value(old_rdn.attribute(), old_rdn.value());
        }
        entry.replace_values(MODIFY_TIMESTAMP_AT, [Self::generalized_time()]);
        Ok(new_dn)
    }
}
