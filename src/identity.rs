//! Identity store operations.
//!
//! Every identifier lives in the store's identity table under
//! `(topic map, kind, address)`, so a lookup is one keyed read that yields
//! a tagged [`ConstructRef`] owner.
//!
//! ## Collisions
//!
//! | Adding | Probed kinds | Topic owner | Other owner |
//! |---|---|---|---|
//! | item identifier to a topic | iid, sid | merge or fail | fail |
//! | item identifier to a statement | iid | fail | fail |
//! | subject identifier | sid, iid | merge or fail | ignored |
//! | subject locator | slo | merge or fail | n/a |
//!
//! "Merge or fail" follows the system's automerge feature. The topic that
//! already holds the identifier survives a merge.

use crate::error::{ModelError, Result};
use crate::merge::MergeQueue;
use crate::store::{ConstructStore, IdentityKey, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{Construct, ConstructRef, IdentityKind, Locator, TopicId, TopicMapId};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Current owner of an identifier.
    pub(crate) fn identity_owner(
        &self,
        topic_map: TopicMapId,
        kind: IdentityKind,
        locator: &Locator,
    ) -> Option<ConstructRef> {
        self.store.lookup(&IdentityKey::new(topic_map, kind, locator))
    }

    /// Bind an identifier without any collision check.
    pub(crate) fn bind_identity(
        &mut self,
        topic_map: TopicMapId,
        kind: IdentityKind,
        locator: &Locator,
        owner: ConstructRef,
    ) {
        self.store
            .bind(IdentityKey::new(topic_map, kind, locator), owner, locator.clone());
    }

    /// Give `topic` an identifier, resolving same-subject collisions.
    ///
    /// With `merge` set, every colliding topic absorbs the holder through
    /// `queue`; otherwise the first collision fails. Returns the topic that
    /// finally holds the identifier.
    pub(crate) fn attach_topic_identity(
        &mut self,
        topic: TopicId,
        kind: IdentityKind,
        locator: &Locator,
        merge: bool,
        queue: &mut MergeQueue,
    ) -> Result<TopicId> {
        let topic_map = self.store.topic(topic)?.topic_map;
        let mut holder = topic;
        for probe in std::iter::once(kind).chain(kind.counterpart()) {
            let Some(owner) = self.identity_owner(topic_map, probe, locator) else {
                continue;
            };
            match owner.as_topic() {
                Some(existing) if existing == holder => {}
                Some(existing) => {
                    if !merge {
                        tracing::debug!(
                            topic = %holder,
                            existing = %existing,
                            locator = %locator,
                            kind = %probe,
                            "Identity collision without automerge"
                        );
                        return Err(ModelError::IdentityConstraint {
                            reporter: holder.into(),
                            existing: owner,
                            locator: locator.clone(),
                        });
                    }
                    tracing::debug!(
                        topic = %holder,
                        existing = %existing,
                        locator = %locator,
                        kind = %probe,
                        "Identity collision, merging topics"
                    );
                    queue.enqueue(existing, holder);
                    self.run_merges(queue)?;
                    holder = queue.resolve(existing);
                }
                None if kind == IdentityKind::ItemIdentifier => {
                    return Err(ModelError::IdentityConstraint {
                        reporter: holder.into(),
                        existing: owner,
                        locator: locator.clone(),
                    });
                }
                None => {}
            }
        }
        self.bind_identity(topic_map, kind, locator, holder.into());
        Ok(holder)
    }

    fn add_topic_identity(&mut self, topic: TopicId, kind: IdentityKind, locator: &Locator) -> Result<TopicId> {
        let mut queue = MergeQueue::default();
        let merge = self.automerge();
        self.attach_topic_identity(topic, kind, locator, merge, &mut queue)
    }

    /// Add an item identifier to any construct.
    ///
    /// Adding an identifier the construct already holds is a no-op. For
    /// topics a collision with another topic merges them when automerge is
    /// on; the returned handle is then the surviving topic. For all other
    /// constructs a collision fails with `IdentityConstraint`.
    pub fn add_item_identifier<C: Construct>(&mut self, construct: C, locator: &Locator) -> Result<C> {
        let topic_map = self.store.owner_map(construct)?;
        let target: ConstructRef = construct.into();
        if let ConstructRef::Topic(topic) = target {
            let holder = self.add_topic_identity(topic, IdentityKind::ItemIdentifier, locator)?;
            return ConstructRef::from(holder)
                .downcast()
                .ok_or(ModelError::NotFound(holder.id()));
        }
        self.bind_item_identifier(topic_map, target, locator)?;
        Ok(construct)
    }

    /// Item identifier of a non-topic construct; any other owner is a violation.
    pub(crate) fn bind_item_identifier(
        &mut self,
        topic_map: TopicMapId,
        target: ConstructRef,
        locator: &Locator,
    ) -> Result<()> {
        match self.identity_owner(topic_map, IdentityKind::ItemIdentifier, locator) {
            Some(owner) if owner == target => Ok(()),
            Some(owner) => Err(ModelError::IdentityConstraint {
                reporter: target,
                existing: owner,
                locator: locator.clone(),
            }),
            None => {
                self.bind_identity(topic_map, IdentityKind::ItemIdentifier, locator, target);
                Ok(())
            }
        }
    }

    /// Add a subject identifier to a topic. Returns the surviving topic.
    pub fn add_subject_identifier(&mut self, topic: TopicId, locator: &Locator) -> Result<TopicId> {
        self.add_topic_identity(topic, IdentityKind::SubjectIdentifier, locator)
    }

    /// Add a subject locator to a topic. Returns the surviving topic.
    pub fn add_subject_locator(&mut self, topic: TopicId, locator: &Locator) -> Result<TopicId> {
        self.add_topic_identity(topic, IdentityKind::SubjectLocator, locator)
    }

    fn remove_identity(&mut self, owner: ConstructRef, kind: IdentityKind, locator: &Locator) -> Result<()> {
        let topic_map = self.store.record(owner.id())?.topic_map(owner.id());
        let key = IdentityKey::new(topic_map, kind, locator);
        if self.store.lookup(&key) == Some(owner) {
            self.store.unbind(&key);
        }
        Ok(())
    }

    /// Drop an item identifier. Identifiers the construct does not hold are ignored.
    pub fn remove_item_identifier<C: Construct>(&mut self, construct: C, locator: &Locator) -> Result<()> {
        self.store.checked(construct)?;
        self.remove_identity(construct.into(), IdentityKind::ItemIdentifier, locator)
    }

    /// Drop a subject identifier of a topic.
    pub fn remove_subject_identifier(&mut self, topic: TopicId, locator: &Locator) -> Result<()> {
        self.store.topic(topic)?;
        self.remove_identity(topic.into(), IdentityKind::SubjectIdentifier, locator)
    }

    /// Drop a subject locator of a topic.
    pub fn remove_subject_locator(&mut self, topic: TopicId, locator: &Locator) -> Result<()> {
        self.store.topic(topic)?;
        self.remove_identity(topic.into(), IdentityKind::SubjectLocator, locator)
    }

    /// Item identifiers of a construct, in address order.
    pub fn get_item_identifiers<C: Construct>(&self, construct: C) -> Result<Vec<Locator>> {
        self.store.checked(construct)?;
        Ok(self.store.identities(construct.id(), IdentityKind::ItemIdentifier))
    }

    /// Subject identifiers of a topic, in address order.
    pub fn get_subject_identifiers(&self, topic: TopicId) -> Result<Vec<Locator>> {
        self.store.topic(topic)?;
        Ok(self.store.identities(topic.id(), IdentityKind::SubjectIdentifier))
    }

    /// Subject locators of a topic, in address order.
    pub fn get_subject_locators(&self, topic: TopicId) -> Result<Vec<Locator>> {
        self.store.topic(topic)?;
        Ok(self.store.identities(topic.id(), IdentityKind::SubjectLocator))
    }

    /// Construct of `topic_map` holding an item identifier.
    pub fn get_construct_by_item_identifier(
        &self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<Option<ConstructRef>> {
        self.store.topic_map_record(topic_map)?;
        Ok(self.identity_owner(topic_map, IdentityKind::ItemIdentifier, locator))
    }

    /// Topic of `topic_map` holding a subject identifier.
    pub fn get_topic_by_subject_identifier(
        &self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<Option<TopicId>> {
        self.store.topic_map_record(topic_map)?;
        Ok(self
            .identity_owner(topic_map, IdentityKind::SubjectIdentifier, locator)
            .and_then(ConstructRef::as_topic))
    }

    /// Topic of `topic_map` holding a subject locator.
    pub fn get_topic_by_subject_locator(
        &self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<Option<TopicId>> {
        self.store.topic_map_record(topic_map)?;
        Ok(self
            .identity_owner(topic_map, IdentityKind::SubjectLocator, locator)
            .and_then(ConstructRef::as_topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TopicMapSystemFactory;
    use crate::types::feature::AUTOMERGE;

    fn make_system(automerge: bool) -> (TopicMapSystem, TopicMapId) {
        let mut factory = TopicMapSystemFactory::new_instance();
        factory.set_feature(AUTOMERGE, automerge).unwrap();
        let mut sys = factory.new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        (sys, tm)
    }

    #[test]
    fn test_item_identifier_idempotent() {
        let (mut sys, tm) = make_system(true);
        let ty = sys.create_topic(tm).unwrap();
        let assoc = sys.create_association(tm, ty, &[]).unwrap();
        let iid = sys.create_locator("http://example.org/a").unwrap();
        sys.add_item_identifier(assoc, &iid).unwrap();
        sys.add_item_identifier(assoc, &iid).unwrap();
        assert_eq!(sys.get_item_identifiers(assoc).unwrap(), vec![iid.clone()]);
        assert_eq!(sys.get_construct_by_item_identifier(tm, &iid).unwrap(), Some(assoc.into()));
    }

    #[test]
    fn test_statement_collision_always_fails() {
        let (mut sys, tm) = make_system(true);
        let ty = sys.create_topic(tm).unwrap();
        let a1 = sys.create_association(tm, ty, &[]).unwrap();
        let a2 = sys.create_association(tm, ty, &[]).unwrap();
        let iid = sys.create_locator("http://example.org/a").unwrap();
        sys.add_item_identifier(a1, &iid).unwrap();
        let err = sys.add_item_identifier(a2, &iid).unwrap_err();
        assert_eq!(
            err,
            ModelError::IdentityConstraint {
                reporter: a2.into(),
                existing: a1.into(),
                locator: iid.clone(),
            }
        );
        assert!(sys.add_item_identifier(ty, &iid).unwrap_err().is_model_constraint());
    }

    #[test]
    fn test_remove_absent_identifier_is_silent() {
        let (mut sys, tm) = make_system(true);
        let topic = sys.create_topic(tm).unwrap();
        let other = sys.create_topic(tm).unwrap();
        let sid = sys.create_locator("http://psi.example.org/a").unwrap();
        sys.add_subject_identifier(other, &sid).unwrap();
        sys.remove_subject_identifier(topic, &sid).unwrap();
        assert_eq!(sys.get_topic_by_subject_identifier(tm, &sid).unwrap(), Some(other));
        sys.remove_subject_identifier(other, &sid).unwrap();
        assert_eq!(sys.get_topic_by_subject_identifier(tm, &sid).unwrap(), None);
    }

    #[test]
    fn test_subject_identifier_ignores_statement_item_identifier() {
        let (mut sys, tm) = make_system(false);
        let ty = sys.create_topic(tm).unwrap();
        let assoc = sys.create_association(tm, ty, &[]).unwrap();
        let loc = sys.create_locator("http://example.org/x").unwrap();
        sys.add_item_identifier(assoc, &loc).unwrap();
        assert_eq!(sys.add_subject_identifier(ty, &loc).unwrap(), ty);
    }
}
