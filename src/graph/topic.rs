//! Topic level factories and accessors.

use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, Construct, ConstructRef, Literal, Locator, NameId, NameRecord, OccurrenceId,
    OccurrenceRecord, Record, Reification, RoleId, Scope, TopicId, Typing,
};

/// Subject identifier of the default name type.
pub const TOPIC_NAME_TYPE: &str = "http://psi.topicmaps.org/iso13250/model/topic-name";

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Create a name on `topic`.
    ///
    /// Without an explicit type the name is typed by the topic carrying the
    /// subject identifier [`TOPIC_NAME_TYPE`], which is created on demand.
    pub fn create_name(
        &mut self,
        topic: TopicId,
        name_type: Option<TopicId>,
        value: impl Into<String>,
        scope: &[TopicId],
    ) -> Result<NameId> {
        let topic_map = self.store.topic(topic)?.topic_map;
        self.check_themes(topic.into(), topic_map, scope)?;
        let name_type = match name_type {
            Some(ty) => {
                self.check_same_map(topic.into(), topic_map, ty, "type")?;
                ty
            }
            None => {
                let psi = Locator::from_normalized(TOPIC_NAME_TYPE);
                self.create_topic_by_subject_identifier(topic_map, &psi)?
            }
        };
        let id = self.insert_record(Record::Name(NameRecord {
            topic_map,
            topic,
            typing: Typing::new(name_type),
            scope: Scope::new(scope.iter().copied()),
            reification: Reification::default(),
            value: value.into(),
        }));
        Ok(NameId::from_id(id))
    }

    /// Create an occurrence on `topic`. The datatype comes from the literal.
    pub fn create_occurrence(
        &mut self,
        topic: TopicId,
        occurrence_type: TopicId,
        value: impl Into<Literal>,
        scope: &[TopicId],
    ) -> Result<OccurrenceId> {
        let topic_map = self.store.topic(topic)?.topic_map;
        self.check_same_map(topic.into(), topic_map, occurrence_type, "type")?;
        self.check_themes(topic.into(), topic_map, scope)?;
        let id = self.insert_record(Record::Occurrence(OccurrenceRecord {
            topic_map,
            topic,
            typing: Typing::new(occurrence_type),
            scope: Scope::new(scope.iter().copied()),
            reification: Reification::default(),
            literal: value.into(),
        }));
        Ok(OccurrenceId::from_id(id))
    }

    /// Names of `topic`, optionally only those of `name_type`.
    pub fn get_names(&self, topic: TopicId, name_type: Option<TopicId>) -> Result<Vec<NameId>> {
        self.store.topic(topic)?;
        let names = self.store.children_of::<NameId>(topic.id());
        match name_type {
            None => Ok(names),
            Some(ty) => self.filter_by_type(names, ty),
        }
    }

    /// Occurrences of `topic`, optionally only those of `occurrence_type`.
    pub fn get_occurrences(
        &self,
        topic: TopicId,
        occurrence_type: Option<TopicId>,
    ) -> Result<Vec<OccurrenceId>> {
        self.store.topic(topic)?;
        let occurrences = self.store.children_of::<OccurrenceId>(topic.id());
        match occurrence_type {
            None => Ok(occurrences),
            Some(ty) => self.filter_by_type(occurrences, ty),
        }
    }

    /// Roles played by `topic`, optionally filtered by role type and by the
    /// type of the parent association.
    pub fn get_roles_played(
        &self,
        topic: TopicId,
        role_type: Option<TopicId>,
        association_type: Option<TopicId>,
    ) -> Result<Vec<RoleId>> {
        let topic_map = self.store.topic(topic)?.topic_map;
        let mut played = Vec::new();
        for role in self.store.all_of::<RoleId>(topic_map) {
            let record = self.store.role(role)?;
            if record.player != topic {
                continue;
            }
            if role_type.is_some_and(|ty| record.typing.get() != ty) {
                continue;
            }
            if let Some(ty) = association_type {
                if self.store.association(record.association)?.typing.get() != ty {
                    continue;
                }
            }
            played.push(role);
        }
        Ok(played)
    }

    /// Associations in which `topic` plays at least one role.
    pub fn get_associations_played(&self, topic: TopicId) -> Result<Vec<AssociationId>> {
        let mut associations = Vec::new();
        for role in self.get_roles_played(topic, None, None)? {
            let parent = self.store.role(role)?.association;
            if !associations.contains(&parent) {
                associations.push(parent);
            }
        }
        associations.sort();
        Ok(associations)
    }

    /// Make `topic` an instance of `ty`.
    pub fn add_type(&mut self, topic: TopicId, ty: TopicId) -> Result<()> {
        let topic_map = self.store.topic(topic)?.topic_map;
        self.check_same_map(topic.into(), topic_map, ty, "type")?;
        self.store.topic_mut(topic)?.types.insert(ty);
        Ok(())
    }

    /// Drop `ty` from the types of `topic`. Absent types are ignored.
    pub fn remove_type(&mut self, topic: TopicId, ty: TopicId) -> Result<()> {
        self.store.topic_mut(topic)?.types.remove(&ty);
        Ok(())
    }

    /// Types of `topic`, in id order.
    pub fn get_types(&self, topic: TopicId) -> Result<Vec<TopicId>> {
        Ok(self.store.topic(topic)?.types.iter().copied().collect())
    }

    /// Construct reified by `topic`, if any.
    pub fn get_reified(&self, topic: TopicId) -> Result<Option<ConstructRef>> {
        Ok(self.store.topic(topic)?.reified)
    }

    fn filter_by_type<C: Construct>(&self, constructs: Vec<C>, ty: TopicId) -> Result<Vec<C>> {
        let mut matching = Vec::with_capacity(constructs.len());
        for construct in constructs {
            let typed = self.store.checked(construct)?.as_typed();
            if typed.is_some_and(|t| t.typing().get() == ty) {
                matching.push(construct);
            }
        }
        Ok(matching)
    }
}
