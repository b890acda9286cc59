//! Lookups by theme.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{AssociationId, NameId, OccurrenceId, Scoped, TopicId, TopicMapId, VariantId};

/// Scoped statements by their themes.
///
/// Variants are matched on their effective scope.
#[derive(Debug, Clone, Copy)]
pub struct ScopedIndex<'a, S: ConstructStore> {
    system: &'a TopicMapSystem<S>,
    topic_map: TopicMapId,
}

impl<'a, S: ConstructStore> ScopedIndex<'a, S> {
    /// Create an index over `topic_map`.
    pub fn new(system: &'a TopicMapSystem<S>, topic_map: TopicMapId) -> Result<Self> {
        system.store().topic_map_record(topic_map)?;
        Ok(Self { system, topic_map })
    }

    /// Associations scoped by `themes`.
    ///
    /// With `match_all` every theme must be in scope, otherwise any one. An
    /// empty `themes` slice yields the associations in the unconstrained scope.
    pub fn get_associations(&self, themes: &[TopicId], match_all: bool) -> Result<Vec<AssociationId>> {
        self.scoped(themes, match_all)
    }

    /// Every topic used as an association theme.
    pub fn get_association_themes(&self) -> Result<Vec<TopicId>> {
        self.themes::<AssociationId>()
    }

    /// Names scoped by `themes`.
    pub fn get_names(&self, themes: &[TopicId], match_all: bool) -> Result<Vec<NameId>> {
        self.scoped(themes, match_all)
    }

    /// Every topic used as a name theme.
    pub fn get_name_themes(&self) -> Result<Vec<TopicId>> {
        self.themes::<NameId>()
    }

    /// Occurrences scoped by `themes`.
    pub fn get_occurrences(&self, themes: &[TopicId], match_all: bool) -> Result<Vec<OccurrenceId>> {
        self.scoped(themes, match_all)
    }

    /// Every topic used as an occurrence theme.
    pub fn get_occurrence_themes(&self) -> Result<Vec<TopicId>> {
        self.themes::<OccurrenceId>()
    }

    /// Variants whose effective scope matches `themes`.
    pub fn get_variants(&self, themes: &[TopicId], match_all: bool) -> Result<Vec<VariantId>> {
        self.scoped(themes, match_all)
    }

    /// Every topic in the effective scope of some variant.
    pub fn get_variant_themes(&self) -> Result<Vec<TopicId>> {
        self.themes::<VariantId>()
    }

    fn scoped<C: Scoped>(&self, themes: &[TopicId], match_all: bool) -> Result<Vec<C>> {
        let mut found = Vec::new();
        for construct in self.system.store().all_of::<C>(self.topic_map) {
            let scope = self.system.get_scope(construct)?;
            let matches = if themes.is_empty() {
                scope.is_empty()
            } else if match_all {
                themes.iter().all(|theme| scope.contains(theme))
            } else {
                themes.iter().any(|theme| scope.contains(theme))
            };
            if matches {
                found.push(construct);
            }
        }
        Ok(found)
    }

    fn themes<C: Scoped>(&self) -> Result<Vec<TopicId>> {
        let mut themes = BTreeSet::new();
        for construct in self.system.store().all_of::<C>(self.topic_map) {
            themes.extend(self.system.get_scope(construct)?);
        }
        Ok(themes.into_iter().collect())
    }
}
