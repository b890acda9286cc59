//! Inline model constraint checks.
//!
//! Every mutating operation calls into these before touching the store:
//!
//! - type, player, theme and reifier arguments belong to the same topic map
//! - a topic reifies at most one construct
//! - a variant's scope adds at least one theme to its name's scope
//! - a topic is not removed while anything still refers to it

use std::collections::BTreeSet;

use crate::error::{ModelError, Result};
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    Construct, ConstructKind, ConstructRef, NameId, Record, TopicId, TopicMapId, VariantId,
};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// `topic` must live in `topic_map`.
    pub(crate) fn check_same_map(
        &self,
        reporter: ConstructRef,
        topic_map: TopicMapId,
        topic: TopicId,
        role: &str,
    ) -> Result<()> {
        let owner = self.store.topic(topic)?.topic_map;
        if owner != topic_map {
            return Err(ModelError::constraint(
                reporter,
                format!("{role} {topic} belongs to a different topic map"),
            ));
        }
        Ok(())
    }

    /// Every theme must live in `topic_map`.
    pub(crate) fn check_themes(
        &self,
        reporter: ConstructRef,
        topic_map: TopicMapId,
        themes: &[TopicId],
    ) -> Result<()> {
        themes
            .iter()
            .try_for_each(|theme| self.check_same_map(reporter, topic_map, *theme, "theme"))
    }

    /// `reifier` may reify `reifiable` only if it reifies nothing else.
    pub(crate) fn check_reifier(
        &self,
        reifiable: ConstructRef,
        topic_map: TopicMapId,
        reifier: TopicId,
    ) -> Result<()> {
        self.check_same_map(reifiable, topic_map, reifier, "reifier")?;
        match self.store.topic(reifier)?.reified {
            Some(other) if other != reifiable => Err(ModelError::constraint(
                reifiable,
                format!("{reifier} already reifies {other}"),
            )),
            _ => Ok(()),
        }
    }

    /// A variant scope must add a theme the parent name does not have.
    pub(crate) fn check_variant_scope(&self, name: NameId, themes: &[TopicId]) -> Result<()> {
        if themes.is_empty() {
            return Err(ModelError::constraint(name, "variant scope must not be empty"));
        }
        let own: BTreeSet<TopicId> = themes.iter().copied().collect();
        let parent = self.store.name(name)?.scope.themes();
        if own.is_subset(parent) {
            return Err(ModelError::constraint(
                name,
                "variant scope must be a true superset of the name's scope",
            ));
        }
        Ok(())
    }

    /// Adding `theme` to a name must leave each variant a theme of its own.
    pub(crate) fn check_name_theme(&self, name: NameId, theme: TopicId) -> Result<()> {
        let mut widened = self.store.name(name)?.scope.themes().clone();
        widened.insert(theme);
        for variant in self.store.children_of::<VariantId>(name.id()) {
            if self.store.variant(variant)?.scope.themes().is_subset(&widened) {
                return Err(ModelError::constraint(
                    name,
                    format!("{variant} would have no theme beyond the name's scope"),
                ));
            }
        }
        Ok(())
    }

    /// Fails with `TopicInUse` if anything refers to `topic`.
    pub(crate) fn check_topic_removable(&self, topic: TopicId) -> Result<()> {
        let record = self.store.topic(topic)?;
        if let Some(reified) = record.reified {
            return Err(in_use(topic, format!("reifies {reified}")));
        }
        let topic_map = record.topic_map;
        for kind in [
            ConstructKind::Topic,
            ConstructKind::Association,
            ConstructKind::Role,
            ConstructKind::Name,
            ConstructKind::Occurrence,
            ConstructKind::Variant,
        ] {
            for id in self.store.filter(topic_map, kind) {
                let other = self.store.record(id)?;
                if other.references(topic) {
                    return Err(in_use(topic, usage(other, topic, kind)));
                }
            }
        }
        Ok(())
    }
}

fn in_use(topic: TopicId, message: String) -> ModelError {
    ModelError::TopicInUse { reporter: topic, message }
}

fn usage(record: &Record, topic: TopicId, kind: ConstructKind) -> String {
    match record {
        Record::Topic(_) => "used as a topic type".to_string(),
        Record::Role(r) if r.player == topic => "plays a role".to_string(),
        _ if record.as_typed().is_some_and(|t| t.typing().get() == topic) => {
            format!("used as {kind} type")
        }
        _ => format!("used as a theme of a {kind}"),
    }
}
