//! Topic map level factories and lookups.

use std::collections::BTreeSet;

use crate::error::{ModelError, Result};
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, AssociationRecord, Construct, ConstructRef, IdentityKind, Locator, Record,
    Reification, Scope, TopicId, TopicMapId, TopicRecord, Typing,
};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Create a topic without any identity.
    pub fn create_empty_topic(&mut self, topic_map: TopicMapId) -> Result<TopicId> {
        self.store.topic_map_record(topic_map)?;
        let id = self.insert_record(Record::Topic(TopicRecord {
            topic_map,
            types: BTreeSet::new(),
            reified: None,
        }));
        Ok(TopicId::from_id(id))
    }

    /// Create a topic carrying a freshly generated item identifier.
    pub fn create_topic(&mut self, topic_map: TopicMapId) -> Result<TopicId> {
        let iid = self.generate_item_identifier()?;
        let topic = self.create_empty_topic(topic_map)?;
        self.bind_identity(topic_map, IdentityKind::ItemIdentifier, &iid, topic.into());
        Ok(topic)
    }

    /// Return the topic with item identifier `locator`, creating it if needed.
    ///
    /// A topic whose subject identifier equals `locator` is reused and gains
    /// the item identifier. Fails if a non-topic construct holds it.
    pub fn create_topic_by_item_identifier(
        &mut self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<TopicId> {
        self.store.topic_map_record(topic_map)?;
        if let Some(owner) = self.identity_owner(topic_map, IdentityKind::ItemIdentifier, locator) {
            return owner.as_topic().ok_or_else(|| ModelError::IdentityConstraint {
                reporter: topic_map.into(),
                existing: owner,
                locator: locator.clone(),
            });
        }
        let topic = match self
            .identity_owner(topic_map, IdentityKind::SubjectIdentifier, locator)
            .and_then(ConstructRef::as_topic)
        {
            Some(topic) => topic,
            None => self.create_empty_topic(topic_map)?,
        };
        self.bind_identity(topic_map, IdentityKind::ItemIdentifier, locator, topic.into());
        Ok(topic)
    }

    /// Return the topic with subject identifier `locator`, creating it if needed.
    ///
    /// A topic whose item identifier equals `locator` is reused and gains the
    /// subject identifier.
    pub fn create_topic_by_subject_identifier(
        &mut self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<TopicId> {
        self.store.topic_map_record(topic_map)?;
        if let Some(topic) = self
            .identity_owner(topic_map, IdentityKind::SubjectIdentifier, locator)
            .and_then(ConstructRef::as_topic)
        {
            return Ok(topic);
        }
        let topic = match self
            .identity_owner(topic_map, IdentityKind::ItemIdentifier, locator)
            .and_then(ConstructRef::as_topic)
        {
            Some(topic) => topic,
            None => self.create_empty_topic(topic_map)?,
        };
        self.bind_identity(topic_map, IdentityKind::SubjectIdentifier, locator, topic.into());
        Ok(topic)
    }

    /// Return the topic with subject locator `locator`, creating it if needed.
    pub fn create_topic_by_subject_locator(
        &mut self,
        topic_map: TopicMapId,
        locator: &Locator,
    ) -> Result<TopicId> {
        self.store.topic_map_record(topic_map)?;
        if let Some(topic) = self
            .identity_owner(topic_map, IdentityKind::SubjectLocator, locator)
            .and_then(ConstructRef::as_topic)
        {
            return Ok(topic);
        }
        let topic = self.create_empty_topic(topic_map)?;
        self.bind_identity(topic_map, IdentityKind::SubjectLocator, locator, topic.into());
        Ok(topic)
    }

    /// Create an association without roles.
    pub fn create_association(
        &mut self,
        topic_map: TopicMapId,
        association_type: TopicId,
        scope: &[TopicId],
    ) -> Result<AssociationId> {
        self.store.topic_map_record(topic_map)?;
        self.check_same_map(topic_map.into(), topic_map, association_type, "type")?;
        self.check_themes(topic_map.into(), topic_map, scope)?;
        let id = self.insert_record(Record::Association(AssociationRecord {
            topic_map,
            typing: Typing::new(association_type),
            scope: Scope::new(scope.iter().copied()),
            reification: Reification::default(),
        }));
        Ok(AssociationId::from_id(id))
    }

    /// All topics of a map, in id order.
    pub fn get_topics(&self, topic_map: TopicMapId) -> Result<Vec<TopicId>> {
        self.store.topic_map_record(topic_map)?;
        Ok(self.store.all_of(topic_map))
    }

    /// All associations of a map, in id order.
    pub fn get_associations(&self, topic_map: TopicMapId) -> Result<Vec<AssociationId>> {
        self.store.topic_map_record(topic_map)?;
        Ok(self.store.all_of(topic_map))
    }

    /// Title of a map.
    pub fn get_title(&self, topic_map: TopicMapId) -> Result<Option<String>> {
        Ok(self.store.topic_map_record(topic_map)?.title.clone())
    }

    /// Set or clear the title of a map.
    pub fn set_title(&mut self, topic_map: TopicMapId, title: Option<String>) -> Result<()> {
        self.store.topic_map_record_mut(topic_map)?.title = title;
        Ok(())
    }

    /// Base address of a map.
    pub fn get_base_address(&self, topic_map: TopicMapId) -> Result<Option<Locator>> {
        Ok(self.store.topic_map_record(topic_map)?.base_address.clone())
    }

    /// Set or clear the base address of a map.
    pub fn set_base_address(&mut self, topic_map: TopicMapId, base: Option<Locator>) -> Result<()> {
        self.store.topic_map_record_mut(topic_map)?.base_address = base;
        Ok(())
    }

    /// Resolve `reference` against the map's base address, or its IRI if it has none.
    pub fn resolve_reference(&self, topic_map: TopicMapId, reference: &str) -> Result<Locator> {
        let record = self.store.topic_map_record(topic_map)?;
        let base = record.base_address.as_ref().unwrap_or(&record.locator);
        Ok(base.resolve(reference)?)
    }
}
