//! The construct graph.
//!
//! All graph operations are methods on [`TopicMapSystem`] taking typed
//! handles. A handle is only a key: every call re-reads the store, and a
//! handle whose construct was removed (or merged away) yields
//! [`ModelError::NotFound`](crate::error::ModelError::NotFound).
//!
//! ## Layout
//!
//! - `topic_map`: topic and association factories, map-level lookups
//! - `topic`: names, occurrences, types and roles played of a topic
//! - `statement`: roles, variants, literals and the typed/scoped/reifiable capabilities
//! - `remove`: removal with cascade and the topic-in-use guard

mod remove;
mod statement;
mod topic;
mod topic_map;

pub use topic::TOPIC_NAME_TYPE;

use crate::error::{ModelError, Result};
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{Construct, ConstructId, ConstructRef, Record, TopicId, TopicMapId};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Allocate an id and store `record` under it.
    pub(crate) fn insert_record(&mut self, record: Record) -> ConstructId {
        let id = self.store.allocate_id();
        self.store.insert(id, record);
        id
    }

    /// Whether the handle still addresses a live construct.
    pub fn exists<C: Construct>(&self, construct: C) -> bool {
        self.store.contains(construct)
    }

    /// Look up a construct of `topic_map` by its system id.
    pub fn get_construct_by_id(&self, topic_map: TopicMapId, id: ConstructId) -> Option<ConstructRef> {
        let record = self.store.get(id)?;
        (record.topic_map(id) == topic_map).then(|| ConstructRef::new(record.kind(), id))
    }

    /// Logical parent of a construct; `None` for topic maps.
    pub fn get_parent<C: Construct>(&self, construct: C) -> Result<Option<ConstructRef>> {
        Ok(self.store.checked(construct)?.parent())
    }

    /// Topic map a construct belongs to.
    pub fn topic_map_of<C: Construct>(&self, construct: C) -> Result<TopicMapId> {
        self.store.owner_map(construct)
    }

    /// Current reifier of any reifiable construct.
    pub(crate) fn reifier_of(&self, construct: ConstructRef) -> Result<Option<TopicId>> {
        Ok(self
            .store
            .record(construct.id())?
            .as_reifiable()
            .and_then(|r| r.reification().get()))
    }

    /// Point `construct` at `reifier`, keeping both directions in sync.
    ///
    /// Performs no constraint checks.
    pub(crate) fn attach_reifier(&mut self, construct: ConstructRef, reifier: Option<TopicId>) -> Result<()> {
        let previous = self
            .store
            .record_mut(construct.id())?
            .as_reifiable_mut()
            .ok_or_else(|| ModelError::constraint(construct, "construct cannot be reified"))?
            .reification_mut()
            .set(reifier);
        if let Some(old) = previous.filter(|old| Some(*old) != reifier) {
            if let Ok(record) = self.store.topic_mut(old) {
                if record.reified == Some(construct) {
                    record.reified = None;
                }
            }
        }
        if let Some(new) = reifier {
            self.store.topic_mut(new)?.reified = Some(construct);
        }
        Ok(())
    }
}
