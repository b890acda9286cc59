//! In-memory construct store.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{
    ConstructId, ConstructKind, ConstructRef, IdentityKind, Locator, Record, TopicMapId,
};
use super::{ConstructStore, IdentityKey};

/// A bound identity row.
#[derive(Debug, Clone)]
struct IdentityRow {
    owner: ConstructRef,
    locator: Locator,
}

/// In-memory construct store.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order. Cloning the
/// store is how transactions take their snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConstructStore {
    /// Last allocated id.
    last_id: u64,
    /// Records by ID.
    records: BTreeMap<ConstructId, Record>,
    /// Parent -> Children mapping.
    children: BTreeMap<ConstructId, BTreeSet<ConstructId>>,
    /// (map, kind) -> constructs.
    by_map: BTreeMap<(TopicMapId, ConstructKind), BTreeSet<ConstructId>>,
    /// Identity table.
    identities: BTreeMap<IdentityKey, IdentityRow>,
    /// Owner -> identity keys.
    owned: BTreeMap<ConstructId, BTreeSet<IdentityKey>>,
}

impl InMemoryConstructStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of live constructs.
    pub fn num_constructs(&self) -> usize {
        self.records.len()
    }

    /// Get number of identity rows.
    pub fn num_identities(&self) -> usize {
        self.identities.len()
    }

    fn unlink(&mut self, id: ConstructId, record: &Record) {
        if let Some(parent) = record.parent() {
            if let Some(siblings) = self.children.get_mut(&parent.id()) {
                siblings.remove(&id);
                if siblings.is_empty() {
                    self.children.remove(&parent.id());
                }
            }
        }
    }
}

impl ConstructStore for InMemoryConstructStore {
    fn allocate_id(&mut self) -> ConstructId {
        self.last_id += 1;
        ConstructId::new(self.last_id)
    }

    fn insert(&mut self, id: ConstructId, record: Record) {
        if let Some(previous) = self.records.remove(&id) {
            self.unlink(id, &previous);
        }
        if let Some(parent) = record.parent() {
            self.children.entry(parent.id()).or_default().insert(id);
        }
        self.by_map
            .entry((record.topic_map(id), record.kind()))
            .or_default()
            .insert(id);
        self.records.insert(id, record);
    }

    fn get(&self, id: ConstructId) -> Option<&Record> {
        self.records.get(&id)
    }

    fn get_mut(&mut self, id: ConstructId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    fn delete(&mut self, id: ConstructId) -> Option<Record> {
        let record = self.records.remove(&id)?;
        self.unlink(id, &record);
        if let Some(ids) = self.by_map.get_mut(&(record.topic_map(id), record.kind())) {
            ids.remove(&id);
        }
        for key in self.owned.remove(&id).unwrap_or_default() {
            self.identities.remove(&key);
        }
        Some(record)
    }

    fn reparent(&mut self, id: ConstructId, parent: ConstructRef) -> bool {
        let Some(mut record) = self.records.remove(&id) else {
            return false;
        };
        self.unlink(id, &record);
        let moved = record.set_parent(parent);
        if let Some(parent) = record.parent() {
            self.children.entry(parent.id()).or_default().insert(id);
        }
        self.records.insert(id, record);
        moved
    }

    fn children(&self, parent: ConstructId) -> Vec<ConstructRef> {
        self.children
            .get(&parent)
            .map(|set| {
                set.iter()
                    .filter_map(|id| self.records.get(id).map(|r| ConstructRef::new(r.kind(), *id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn filter(&self, topic_map: TopicMapId, kind: ConstructKind) -> Vec<ConstructId> {
        self.by_map
            .get(&(topic_map, kind))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn topic_maps(&self) -> Vec<TopicMapId> {
        self.records
            .iter()
            .filter(|(_, record)| record.kind() == ConstructKind::TopicMap)
            .map(|(id, record)| record.topic_map(*id))
            .collect()
    }

    fn lookup(&self, key: &IdentityKey) -> Option<ConstructRef> {
        self.identities.get(key).map(|row| row.owner)
    }

    fn bind(&mut self, key: IdentityKey, owner: ConstructRef, locator: Locator) -> Option<ConstructRef> {
        let previous = self
            .identities
            .insert(key.clone(), IdentityRow { owner, locator })
            .map(|row| row.owner);
        if let Some(previous) = previous {
            if let Some(keys) = self.owned.get_mut(&previous.id()) {
                keys.remove(&key);
            }
        }
        self.owned.entry(owner.id()).or_default().insert(key);
        previous
    }

    fn unbind(&mut self, key: &IdentityKey) -> Option<ConstructRef> {
        let row = self.identities.remove(key)?;
        if let Some(keys) = self.owned.get_mut(&row.owner.id()) {
            keys.remove(key);
        }
        Some(row.owner)
    }

    fn identities(&self, owner: ConstructId, kind: IdentityKind) -> Vec<Locator> {
        self.owned
            .get(&owner)
            .map(|keys| {
                keys.iter()
                    .filter(|key| key.kind == kind)
                    .filter_map(|key| self.identities.get(key).map(|row| row.locator.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
