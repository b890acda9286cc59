//! Topic merge engine.
//!
//! Merging topic `source` into topic `target` leaves one topic carrying the
//! union of both: identities, types, names, occurrences, roles played and
//! reification. Statements that become structurally equal in the process
//! are collapsed by signature.
//!
//! ## Algorithm
//!
//! Merges are driven by a worklist of (target, source) pairs:
//!
//! 1. Pop a pair and resolve both ends through the redirect table
//! 2. Skip it if both ends are now the same topic
//! 3. Absorb `source` into `target`: move reification, union types, rebind
//!    identities, re-point every reference, re-parent names and occurrences
//! 4. Record `source -> target` in the redirect table and delete `source`
//! 5. Collapse duplicates among the statements touched by the re-pointing,
//!    including the variants of every touched name. Two duplicates with
//!    different reifiers push a new pair onto the worklist
//!
//! Every absorbed pair removes one topic from the map, so the worklist drains.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::signature::{
    association_signature, name_signature, occurrence_signature, role_signature, variant_signature,
};
use crate::store::{ConstructStore, IdentityKey, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, Construct, ConstructKind, ConstructRef, IdentityKind, NameId, OccurrenceId,
    Record, RoleId, TopicId, TopicMapId, VariantId,
};

/// Pending topic merges and the topics already merged away.
#[derive(Debug, Default)]
pub(crate) struct MergeQueue {
    pending: VecDeque<(TopicId, TopicId)>,
    redirects: BTreeMap<TopicId, TopicId>,
}

impl MergeQueue {
    /// Schedule merging `source` into `target`.
    pub(crate) fn enqueue(&mut self, target: TopicId, source: TopicId) {
        self.pending.push_back((target, source));
    }

    fn pop(&mut self) -> Option<(TopicId, TopicId)> {
        self.pending.pop_front()
    }

    /// The topic that `topic` ended up in.
    pub(crate) fn resolve(&self, mut topic: TopicId) -> TopicId {
        while let Some(next) = self.redirects.get(&topic) {
            topic = *next;
        }
        topic
    }

    fn redirect(&mut self, from: TopicId, to: TopicId) {
        self.redirects.insert(from, to);
    }
}

/// Statements whose signature may have changed during one absorb step.
#[derive(Debug, Default)]
struct Touched {
    occurrences: BTreeSet<OccurrenceId>,
    names: BTreeSet<NameId>,
    variants: BTreeSet<VariantId>,
    associations: BTreeSet<AssociationId>,
}

impl Touched {
    fn mark(&mut self, construct: ConstructRef) {
        match construct {
            ConstructRef::Occurrence(o) => {
                self.occurrences.insert(o);
            }
            ConstructRef::Name(n) => {
                self.names.insert(n);
            }
            ConstructRef::Variant(v) => {
                self.variants.insert(v);
            }
            ConstructRef::Association(a) => {
                self.associations.insert(a);
            }
            _ => {}
        }
    }

    fn len(&self) -> usize {
        self.occurrences.len() + self.names.len() + self.variants.len() + self.associations.len()
    }
}

const STATEMENT_KINDS: [ConstructKind; 6] = [
    ConstructKind::Topic,
    ConstructKind::Association,
    ConstructKind::Role,
    ConstructKind::Name,
    ConstructKind::Occurrence,
    ConstructKind::Variant,
];

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Merge `source` into `target`.
    ///
    /// Afterwards `source` no longer exists and every reference to it points
    /// to `target`. Merging a topic with itself is a no-op. Fails without
    /// changing anything if the topics live in different maps or both reify
    /// a construct.
    pub fn merge_topics(&mut self, target: TopicId, source: TopicId) -> Result<()> {
        let target_map = self.store.topic(target)?.topic_map;
        let source_map = self.store.topic(source)?.topic_map;
        if target_map != source_map {
            return Err(ModelError::constraint(
                target,
                format!("{source} belongs to a different topic map"),
            ));
        }
        if target == source {
            return Ok(());
        }
        self.check_reification_clash(target, source)?;
        let mut queue = MergeQueue::default();
        queue.enqueue(target, source);
        self.run_merges(&mut queue)
    }

    /// Drain the worklist.
    pub(crate) fn run_merges(&mut self, queue: &mut MergeQueue) -> Result<()> {
        while let Some((target, source)) = queue.pop() {
            let target = queue.resolve(target);
            let source = queue.resolve(source);
            if target == source {
                continue;
            }
            self.check_reification_clash(target, source)?;
            let topic_map = self.store.topic(target)?.topic_map;
            let touched = self.absorb_topic(topic_map, target, source)?;
            queue.redirect(source, target);
            info!(
                target = %target,
                source = %source,
                touched = touched.len(),
                pending = queue.pending.len(),
                "Merged topic"
            );
            self.collapse_duplicates(topic_map, touched, queue)?;
        }
        Ok(())
    }

    fn check_reification_clash(&self, target: TopicId, source: TopicId) -> Result<()> {
        let target_reified = self.store.topic(target)?.reified;
        let source_reified = self.store.topic(source)?.reified;
        if let (Some(a), Some(b)) = (target_reified, source_reified) {
            if a != b {
                return Err(ModelError::constraint(
                    target,
                    format!("{target} reifies {a} and {source} reifies {b}"),
                ));
            }
        }
        Ok(())
    }

    /// Move everything of `source` onto `target` and delete `source`.
    fn absorb_topic(&mut self, topic_map: TopicMapId, target: TopicId, source: TopicId) -> Result<Touched> {
        let mut touched = Touched::default();

        // Reification
        if let Some(reified) = self.store.topic(source)?.reified {
            self.attach_reifier(reified, Some(target))?;
        }

        // Types
        let types = self.store.topic(source)?.types.clone();
        self.store.topic_mut(target)?.types.extend(types);

        // Identities
        for kind in IdentityKind::ALL {
            for locator in self.store.identities(source.id(), kind) {
                let key = IdentityKey::new(topic_map, kind, &locator);
                self.store.bind(key, target.into(), locator);
            }
        }

        // References as type, theme, player or topic type
        for kind in STATEMENT_KINDS {
            for id in self.store.filter(topic_map, kind) {
                if id == source.id() {
                    continue;
                }
                let Some(record) = self.store.get_mut(id) else {
                    continue;
                };
                if !record.replace_references(source, target) {
                    continue;
                }
                match record {
                    Record::Role(role) => touched.mark(role.association.into()),
                    _ => touched.mark(ConstructRef::new(kind, id)),
                }
            }
        }

        // Characteristics
        for child in self.store.children(source.id()) {
            self.store.reparent(child.id(), target.into());
            touched.mark(child);
        }

        self.store.delete(source.id());
        Ok(touched)
    }

    fn collapse_duplicates(
        &mut self,
        topic_map: TopicMapId,
        touched: Touched,
        queue: &mut MergeQueue,
    ) -> Result<()> {
        for occurrence in touched.occurrences {
            self.collapse_occurrence(occurrence, queue)?;
        }
        // A name whose scope changed changes the effective scope of its variants.
        let mut variants = touched.variants;
        for name in touched.names {
            self.collapse_name(name, queue)?;
            if self.store.contains(name) {
                variants.extend(self.store.children_of::<VariantId>(name.id()));
            }
        }
        for variant in variants {
            self.collapse_variant(variant, queue)?;
        }
        for association in touched.associations {
            self.collapse_association(topic_map, association, queue)?;
        }
        Ok(())
    }

    fn collapse_occurrence(&mut self, occurrence: OccurrenceId, queue: &mut MergeQueue) -> Result<()> {
        if !self.store.contains(occurrence) {
            return Ok(());
        }
        let parent = self.store.occurrence(occurrence)?.topic;
        let signature = occurrence_signature(&self.store, occurrence)?;
        let siblings = self.store.children_of::<OccurrenceId>(parent.id());
        let duplicate = self.find_duplicate(siblings, Some(occurrence), &signature, |store, o| {
            occurrence_signature(store, o)
        })?;
        if let Some(existing) = duplicate {
            self.handle_existing_construct(occurrence.into(), existing.into(), queue)?;
            self.delete_cascade(occurrence.into())?;
            debug!(removed = %occurrence, kept = %existing, "Collapsed duplicate occurrence");
        }
        Ok(())
    }

    fn collapse_name(&mut self, name: NameId, queue: &mut MergeQueue) -> Result<()> {
        if !self.store.contains(name) {
            return Ok(());
        }
        let parent = self.store.name(name)?.topic;
        let signature = name_signature(&self.store, name)?;
        let siblings = self.store.children_of::<NameId>(parent.id());
        let duplicate =
            self.find_duplicate(siblings, Some(name), &signature, |store, n| name_signature(store, n))?;
        if let Some(existing) = duplicate {
            self.handle_existing_construct(name.into(), existing.into(), queue)?;
            self.move_variants(name, existing, queue)?;
            self.delete_cascade(name.into())?;
            debug!(removed = %name, kept = %existing, "Collapsed duplicate name");
        }
        Ok(())
    }

    fn collapse_variant(&mut self, variant: VariantId, queue: &mut MergeQueue) -> Result<()> {
        if !self.store.contains(variant) {
            return Ok(());
        }
        let parent = self.store.variant(variant)?.name;
        let signature = variant_signature(&self.store, variant)?;
        let siblings = self.store.children_of::<VariantId>(parent.id());
        let duplicate = self.find_duplicate(siblings, Some(variant), &signature, |store, v| {
            variant_signature(store, v)
        })?;
        if let Some(existing) = duplicate {
            self.handle_existing_construct(variant.into(), existing.into(), queue)?;
            self.delete_cascade(variant.into())?;
            debug!(removed = %variant, kept = %existing, "Collapsed duplicate variant");
        }
        Ok(())
    }

    fn collapse_association(
        &mut self,
        topic_map: TopicMapId,
        association: AssociationId,
        queue: &mut MergeQueue,
    ) -> Result<()> {
        if !self.store.contains(association) {
            return Ok(());
        }
        let association_type = self.store.association(association)?.typing.get();
        let signature = association_signature(&self.store, association)?;
        let candidates: Vec<AssociationId> = self
            .store
            .all_of::<AssociationId>(topic_map)
            .into_iter()
            .filter(|a| {
                self.store
                    .association(*a)
                    .is_ok_and(|r| r.typing.get() == association_type)
            })
            .collect();
        let duplicate = self.find_duplicate(candidates, Some(association), &signature, |store, a| {
            association_signature(store, a)
        })?;
        if let Some(existing) = duplicate {
            self.handle_existing_construct(association.into(), existing.into(), queue)?;
            self.move_role_characteristics(association, existing, queue)?;
            self.delete_cascade(association.into())?;
            debug!(removed = %association, kept = %existing, "Collapsed duplicate association");
        }
        Ok(())
    }

    /// First candidate other than `exclude` whose signature equals `wanted`.
    pub(crate) fn find_duplicate<C, K, F>(
        &self,
        candidates: Vec<C>,
        exclude: Option<C>,
        wanted: &K,
        signature: F,
    ) -> Result<Option<C>>
    where
        C: Construct,
        K: PartialEq,
        F: Fn(&S, C) -> Result<K>,
    {
        for candidate in candidates {
            if Some(candidate) != exclude && signature(&self.store, candidate)? == *wanted {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Move item identifiers and reifier of a duplicate onto the construct it duplicates.
    ///
    /// If both carry a reifier, the two reifier topics are scheduled for merging.
    pub(crate) fn handle_existing_construct(
        &mut self,
        source: ConstructRef,
        target: ConstructRef,
        queue: &mut MergeQueue,
    ) -> Result<()> {
        let topic_map = self.store.record(target.id())?.topic_map(target.id());
        for locator in self.store.identities(source.id(), IdentityKind::ItemIdentifier) {
            let key = IdentityKey::new(topic_map, IdentityKind::ItemIdentifier, &locator);
            self.store.bind(key, target, locator);
        }
        let Some(source_reifier) = self.reifier_of(source)? else {
            return Ok(());
        };
        self.attach_reifier(source, None)?;
        match self.reifier_of(target)? {
            Some(target_reifier) if target_reifier != source_reifier => {
                queue.enqueue(target_reifier, source_reifier);
            }
            Some(_) => {}
            None => self.attach_reifier(target, Some(source_reifier))?,
        }
        Ok(())
    }

    /// Move role item identifiers and reifiers onto the matching roles of `target`.
    ///
    /// Roles are matched by (type, player) signature, so several roles of
    /// `source` may land on the same role of `target`.
    pub(crate) fn move_role_characteristics(
        &mut self,
        source: AssociationId,
        target: AssociationId,
        queue: &mut MergeQueue,
    ) -> Result<()> {
        let mut by_signature = BTreeMap::new();
        for role in self.store.children_of::<RoleId>(target.id()) {
            by_signature
                .entry(role_signature(&self.store, role)?)
                .or_insert(role);
        }
        for role in self.store.children_of::<RoleId>(source.id()) {
            let signature = role_signature(&self.store, role)?;
            if let Some(existing) = by_signature.get(&signature).copied() {
                self.handle_existing_construct(role.into(), existing.into(), queue)?;
            }
        }
        Ok(())
    }

    /// Move variants of `source` to `target`, collapsing duplicates.
    pub(crate) fn move_variants(
        &mut self,
        source: NameId,
        target: NameId,
        queue: &mut MergeQueue,
    ) -> Result<()> {
        let mut by_signature = BTreeMap::new();
        for variant in self.store.children_of::<VariantId>(target.id()) {
            by_signature
                .entry(variant_signature(&self.store, variant)?)
                .or_insert(variant);
        }
        for variant in self.store.children_of::<VariantId>(source.id()) {
            let signature = variant_signature(&self.store, variant)?;
            match by_signature.get(&signature).copied() {
                Some(existing) => {
                    self.handle_existing_construct(variant.into(), existing.into(), queue)?;
                    self.delete_cascade(variant.into())?;
                }
                None => {
                    self.store.reparent(variant.id(), target.into());
                    by_signature.insert(signature, variant);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TopicMapSystemFactory;

    fn make_system() -> (TopicMapSystem, TopicMapId) {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        (sys, tm)
    }

    fn topic(raw: u64) -> TopicId {
        TopicId::from_id(crate::types::ConstructId::new(raw))
    }

    #[test]
    fn test_queue_resolves_chains() {
        let mut queue = MergeQueue::default();
        queue.redirect(topic(3), topic(2));
        queue.redirect(topic(2), topic(1));
        assert_eq!(queue.resolve(topic(3)), topic(1));
        assert_eq!(queue.resolve(topic(4)), topic(4));
    }

    #[test]
    fn test_self_merge_is_noop() {
        let (mut sys, tm) = make_system();
        let t = sys.create_topic(tm).unwrap();
        sys.merge_topics(t, t).unwrap();
        assert!(sys.exists(t));
        assert_eq!(sys.get_topics(tm).unwrap(), vec![t]);
    }

    #[test]
    fn test_merge_across_maps_rejected() {
        let (mut sys, tm) = make_system();
        let other_loc = sys.create_locator("http://example.org/other").unwrap();
        let other = sys.create_topic_map(&other_loc).unwrap();
        let a = sys.create_topic(tm).unwrap();
        let b = sys.create_topic(other).unwrap();
        assert!(sys.merge_topics(a, b).unwrap_err().is_model_constraint());
        assert!(sys.exists(b));
    }

    #[test]
    fn test_merge_repoints_third_party_references() {
        let (mut sys, tm) = make_system();
        let t1 = sys.create_topic(tm).unwrap();
        let t2 = sys.create_topic(tm).unwrap();
        let other = sys.create_topic(tm).unwrap();
        sys.add_type(other, t2).unwrap();
        let occ = sys.create_occurrence(other, t2, "v", &[t2]).unwrap();

        sys.merge_topics(t1, t2).unwrap();
        assert_eq!(sys.get_types(other).unwrap(), vec![t1]);
        assert_eq!(sys.get_type(occ).unwrap(), t1);
        assert_eq!(sys.get_scope(occ).unwrap(), vec![t1]);
    }

    #[test]
    fn test_third_party_statements_collapse() {
        let (mut sys, tm) = make_system();
        let t1 = sys.create_topic(tm).unwrap();
        let t2 = sys.create_topic(tm).unwrap();
        let other = sys.create_topic(tm).unwrap();
        sys.create_occurrence(other, t1, "v", &[]).unwrap();
        sys.create_occurrence(other, t2, "v", &[]).unwrap();

        sys.merge_topics(t1, t2).unwrap();
        assert_eq!(sys.get_occurrences(other, None).unwrap().len(), 1);
    }
}
