//! Lookups by type.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, NameId, OccurrenceId, RoleId, TopicId, TopicMapId, Typed,
};

/// Topics by their types and typed statements by their type.
#[derive(Debug, Clone, Copy)]
pub struct TypeInstanceIndex<'a, S: ConstructStore> {
    system: &'a TopicMapSystem<S>,
    topic_map: TopicMapId,
}

impl<'a, S: ConstructStore> TypeInstanceIndex<'a, S> {
    /// Create an index over `topic_map`.
    pub fn new(system: &'a TopicMapSystem<S>, topic_map: TopicMapId) -> Result<Self> {
        system.store().topic_map_record(topic_map)?;
        Ok(Self { system, topic_map })
    }

    /// Topics that are instances of `types`.
    ///
    /// With `match_all` a topic must have every type, otherwise any one.
    /// An empty `types` slice yields the untyped topics.
    pub fn get_topics(&self, types: &[TopicId], match_all: bool) -> Result<Vec<TopicId>> {
        let store = self.system.store();
        let mut topics = Vec::new();
        for topic in store.all_of::<TopicId>(self.topic_map) {
            let own = &store.topic(topic)?.types;
            let matches = if types.is_empty() {
                own.is_empty()
            } else if match_all {
                types.iter().all(|ty| own.contains(ty))
            } else {
                types.iter().any(|ty| own.contains(ty))
            };
            if matches {
                topics.push(topic);
            }
        }
        Ok(topics)
    }

    /// Every topic used as a topic type.
    pub fn get_topic_types(&self) -> Result<Vec<TopicId>> {
        let store = self.system.store();
        let mut types = BTreeSet::new();
        for topic in store.all_of::<TopicId>(self.topic_map) {
            types.extend(store.topic(topic)?.types.iter().copied());
        }
        Ok(types.into_iter().collect())
    }

    /// Associations of type `ty`.
    pub fn get_associations(&self, ty: TopicId) -> Result<Vec<AssociationId>> {
        self.instances(ty)
    }

    /// Every topic used as an association type.
    pub fn get_association_types(&self) -> Result<Vec<TopicId>> {
        self.types::<AssociationId>()
    }

    /// Roles of type `ty`.
    pub fn get_roles(&self, ty: TopicId) -> Result<Vec<RoleId>> {
        self.instances(ty)
    }

    /// Every topic used as a role type.
    pub fn get_role_types(&self) -> Result<Vec<TopicId>> {
        self.types::<RoleId>()
    }

    /// Names of type `ty`.
    pub fn get_names(&self, ty: TopicId) -> Result<Vec<NameId>> {
        self.instances(ty)
    }

    /// Every topic used as a name type.
    pub fn get_name_types(&self) -> Result<Vec<TopicId>> {
        self.types::<NameId>()
    }

    /// Occurrences of type `ty`.
    pub fn get_occurrences(&self, ty: TopicId) -> Result<Vec<OccurrenceId>> {
        self.instances(ty)
    }

    /// Every topic used as an occurrence type.
    pub fn get_occurrence_types(&self) -> Result<Vec<TopicId>> {
        self.types::<OccurrenceId>()
    }

    fn instances<C: Typed>(&self, ty: TopicId) -> Result<Vec<C>> {
        let mut found = Vec::new();
        for construct in self.system.store().all_of::<C>(self.topic_map) {
            if self.system.get_type(construct)? == ty {
                found.push(construct);
            }
        }
        Ok(found)
    }

    fn types<C: Typed>(&self) -> Result<Vec<TopicId>> {
        let mut types = BTreeSet::new();
        for construct in self.system.store().all_of::<C>(self.topic_map) {
            types.insert(self.system.get_type(construct)?);
        }
        Ok(types.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TopicMapSystemFactory;

    #[test]
    fn test_topics_by_type() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        let t1 = sys.create_topic(tm).unwrap();
        let t2 = sys.create_topic(tm).unwrap();
        let both = sys.create_topic(tm).unwrap();
        let one = sys.create_topic(tm).unwrap();
        sys.add_type(both, t1).unwrap();
        sys.add_type(both, t2).unwrap();
        sys.add_type(one, t1).unwrap();

        let index = TypeInstanceIndex::new(&sys, tm).unwrap();
        assert_eq!(index.get_topics(&[t1, t2], true).unwrap(), vec![both]);
        assert_eq!(index.get_topics(&[t1, t2], false).unwrap(), vec![both, one]);
        assert_eq!(index.get_topics(&[], false).unwrap(), vec![t1, t2]);
        assert_eq!(index.get_topic_types().unwrap(), vec![t1, t2]);
    }
}
