//! Lookups by value.

use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{DatatypeAware, Literal, NameId, OccurrenceId, TopicMapId, VariantId};

/// Names by string value, occurrences and variants by (value, datatype).
#[derive(Debug, Clone, Copy)]
pub struct LiteralIndex<'a, S: ConstructStore> {
    system: &'a TopicMapSystem<S>,
    topic_map: TopicMapId,
}

impl<'a, S: ConstructStore> LiteralIndex<'a, S> {
    /// Create an index over `topic_map`.
    pub fn new(system: &'a TopicMapSystem<S>, topic_map: TopicMapId) -> Result<Self> {
        system.store().topic_map_record(topic_map)?;
        Ok(Self { system, topic_map })
    }

    /// Names with exactly this value.
    pub fn get_names(&self, value: &str) -> Result<Vec<NameId>> {
        let store = self.system.store();
        let mut found = Vec::new();
        for name in store.all_of::<NameId>(self.topic_map) {
            if store.name(name)?.value == value {
                found.push(name);
            }
        }
        Ok(found)
    }

    /// Occurrences with this value and datatype.
    ///
    /// Plain strings imply `xsd:string`, locators `xsd:anyURI`.
    pub fn get_occurrences(&self, value: impl Into<Literal>) -> Result<Vec<OccurrenceId>> {
        self.with_literal(&value.into())
    }

    /// Variants with this value and datatype.
    pub fn get_variants(&self, value: impl Into<Literal>) -> Result<Vec<VariantId>> {
        self.with_literal(&value.into())
    }

    fn with_literal<C: DatatypeAware>(&self, literal: &Literal) -> Result<Vec<C>> {
        let mut found = Vec::new();
        for construct in self.system.store().all_of::<C>(self.topic_map) {
            if self.system.get_literal(construct)? == *literal {
                found.push(construct);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TopicMapSystemFactory;

    #[test]
    fn test_datatype_is_part_of_the_match() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        let topic = sys.create_topic(tm).unwrap();
        let as_uri = sys.create_occurrence(topic, topic, &loc, &[]).unwrap();
        let as_string = sys
            .create_occurrence(topic, topic, "http://example.org/map", &[])
            .unwrap();

        let index = LiteralIndex::new(&sys, tm).unwrap();
        assert_eq!(index.get_occurrences(&loc).unwrap(), vec![as_uri]);
        assert_eq!(index.get_occurrences("http://example.org/map").unwrap(), vec![as_string]);
        assert!(index.get_names("missing").unwrap().is_empty());
    }
}
