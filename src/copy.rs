//! Topic map merge: copying one map into another.
//!
//! `merge_in(target, source)` adds the content of `source` to `target`
//! without touching `source`. Topics that denote the same subject in both
//! maps end up as one topic, and statements that already exist in `target`
//! are not duplicated.
//!
//! ## Algorithm
//!
//! 1. Map every source topic that shares an identity with a target topic
//!    onto it (subject locator to subject locator, subject identifier to
//!    subject identifier or item identifier, item identifier to item
//!    identifier or subject identifier). A source topic mapped onto two
//!    target topics merges those two.
//! 2. If both maps are reified, map the source reifier onto the target reifier.
//! 3. Map every remaining source topic onto a fresh empty target topic.
//! 4. Copy identities, types, occurrences, names and variants of every
//!    source topic onto its mapped topic, reusing statements with an equal
//!    signature.
//! 5. Copy associations, reusing an existing association with an equal
//!    signature and moving role characteristics onto its matching roles.
//!
//! Mapped topics can be merged away while copying, so every lookup goes
//! through the merge queue's redirect table.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{ModelError, Result};
use crate::merge::MergeQueue;
use crate::signature::{
    association_signature, name_signature, occurrence_signature, variant_signature,
    AssociationSignature, DataSignature, NameSignature, OccurrenceSignature, RoleSignature,
    RolesSignature, ScopeSignature, VariantSignature,
};
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, Construct, ConstructRef, IdentityKind, NameId, OccurrenceId, RoleId, TopicId,
    TopicMapId, VariantId,
};

/// Source topic to target topic.
#[derive(Debug, Default)]
struct MergeMap {
    mapping: BTreeMap<TopicId, TopicId>,
}

impl MergeMap {
    fn contains(&self, source: TopicId) -> bool {
        self.mapping.contains_key(&source)
    }

    /// Current target topic of a mapped source topic.
    fn get(&self, source: TopicId, queue: &MergeQueue) -> Result<TopicId> {
        self.mapping
            .get(&source)
            .map(|target| queue.resolve(*target))
            .ok_or(ModelError::NotFound(source.id()))
    }

    fn get_all(&self, sources: impl IntoIterator<Item = TopicId>, queue: &MergeQueue) -> Result<Vec<TopicId>> {
        sources.into_iter().map(|t| self.get(t, queue)).collect()
    }
}

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Copy the content of `source` into `target`, merging where the two overlap.
    ///
    /// `source` is never modified. Copying a map into itself is a no-op.
    /// Same-subject topics are always merged, whatever the automerge feature says.
    pub fn merge_in(&mut self, target: TopicMapId, source: TopicMapId) -> Result<()> {
        self.store.topic_map_record(target)?;
        self.store.topic_map_record(source)?;
        if target == source {
            return Ok(());
        }
        let mut queue = MergeQueue::default();
        let mut merge_map = MergeMap::default();
        let source_topics = self.get_topics(source)?;

        // Identity collisions
        for &topic in &source_topics {
            for (kind, probes) in [
                (IdentityKind::SubjectLocator, &[IdentityKind::SubjectLocator][..]),
                (
                    IdentityKind::SubjectIdentifier,
                    &[IdentityKind::SubjectIdentifier, IdentityKind::ItemIdentifier][..],
                ),
                (
                    IdentityKind::ItemIdentifier,
                    &[IdentityKind::ItemIdentifier, IdentityKind::SubjectIdentifier][..],
                ),
            ] {
                for locator in self.store.identities(topic.id(), kind) {
                    for probe in probes {
                        let existing = self
                            .identity_owner(target, *probe, &locator)
                            .and_then(ConstructRef::as_topic);
                        if let Some(existing) = existing {
                            self.add_merge(&mut merge_map, &mut queue, topic, existing)?;
                        }
                    }
                }
            }
        }

        // Map reifiers
        let source_reifier = self.reifier_of(source.into())?;
        if let (Some(from), Some(onto)) = (source_reifier, self.reifier_of(target.into())?) {
            self.add_merge(&mut merge_map, &mut queue, from, onto)?;
        }

        // Remaining topics
        let mut created = 0usize;
        for &topic in &source_topics {
            if !merge_map.contains(topic) {
                let copy = self.create_empty_topic(target)?;
                merge_map.mapping.insert(topic, copy);
                created += 1;
            }
        }

        for &topic in &source_topics {
            self.copy_topic(&merge_map, &mut queue, topic)?;
        }
        let associations = self.get_associations(source)?;
        for &association in &associations {
            self.copy_association(&merge_map, &mut queue, target, association)?;
        }

        if let Some(from) = source_reifier {
            let reifier = merge_map.get(from, &queue)?;
            if self.reifier_of(target.into())?.is_none() && self.store.topic(reifier)?.reified.is_none() {
                self.attach_reifier(target.into(), Some(reifier))?;
            }
        }

        info!(
            target = %target,
            source = %source,
            topics = source_topics.len(),
            created,
            associations = associations.len(),
            "Merged topic map"
        );
        Ok(())
    }

    /// Map `source` onto `target`, merging with any previous mapping.
    fn add_merge(
        &mut self,
        merge_map: &mut MergeMap,
        queue: &mut MergeQueue,
        source: TopicId,
        target: TopicId,
    ) -> Result<()> {
        match merge_map.mapping.get(&source).copied() {
            Some(previous) => {
                let previous = queue.resolve(previous);
                let target = queue.resolve(target);
                if previous != target {
                    debug!(
                        source = %source,
                        previous = %previous,
                        target = %target,
                        "Source topic maps onto two target topics"
                    );
                    queue.enqueue(previous, target);
                    self.run_merges(queue)?;
                }
            }
            None => {
                merge_map.mapping.insert(source, target);
            }
        }
        Ok(())
    }

    fn copy_topic(&mut self, merge_map: &MergeMap, queue: &mut MergeQueue, source: TopicId) -> Result<()> {
        // Identities
        for kind in IdentityKind::ALL {
            for locator in self.store.identities(source.id(), kind) {
                let target = merge_map.get(source, queue)?;
                self.attach_topic_identity(target, kind, &locator, true, queue)?;
            }
        }

        // Types
        let types = merge_map.get_all(self.store.topic(source)?.types.iter().copied(), queue)?;
        for ty in types {
            let target = merge_map.get(source, queue)?;
            self.add_type(target, ty)?;
        }

        for occurrence in self.store.children_of::<OccurrenceId>(source.id()) {
            self.copy_occurrence(merge_map, queue, source, occurrence)?;
        }
        for name in self.store.children_of::<NameId>(source.id()) {
            self.copy_name(merge_map, queue, source, name)?;
        }
        Ok(())
    }

    fn copy_occurrence(
        &mut self,
        merge_map: &MergeMap,
        queue: &mut MergeQueue,
        source_topic: TopicId,
        occurrence: OccurrenceId,
    ) -> Result<()> {
        let record = self.store.occurrence(occurrence)?;
        let literal = record.literal.clone();
        let occurrence_type = merge_map.get(record.typing.get(), queue)?;
        let scope = merge_map.get_all(record.scope.themes().iter().copied(), queue)?;
        let signature = OccurrenceSignature {
            occurrence_type,
            scope: ScopeSignature::new(scope.iter().copied()),
            data: DataSignature::literal(&literal),
        };

        let topic = merge_map.get(source_topic, queue)?;
        let siblings = self.store.children_of::<OccurrenceId>(topic.id());
        let duplicate =
            self.find_duplicate(siblings, None, &signature, |store, o| occurrence_signature(store, o))?;
        let copy = match duplicate {
            Some(existing) => existing,
            None => self.create_occurrence(topic, occurrence_type, literal, &scope)?,
        };
        self.copy_item_identifiers(occurrence.into(), copy.into())?;
        self.copy_reifier(merge_map, queue, occurrence.into(), copy.into())
    }

    fn copy_name(
        &mut self,
        merge_map: &MergeMap,
        queue: &mut MergeQueue,
        source_topic: TopicId,
        name: NameId,
    ) -> Result<()> {
        let record = self.store.name(name)?;
        let value = record.value.clone();
        let name_type = merge_map.get(record.typing.get(), queue)?;
        let scope = merge_map.get_all(record.scope.themes().iter().copied(), queue)?;
        let signature = NameSignature {
            name_type,
            scope: ScopeSignature::new(scope.iter().copied()),
            data: DataSignature::name(&value),
        };

        let topic = merge_map.get(source_topic, queue)?;
        let siblings = self.store.children_of::<NameId>(topic.id());
        let duplicate =
            self.find_duplicate(siblings, None, &signature, |store, n| name_signature(store, n))?;
        let copy = match duplicate {
            Some(existing) => existing,
            None => self.create_name(topic, Some(name_type), value, &scope)?,
        };
        self.copy_item_identifiers(name.into(), copy.into())?;
        for variant in self.store.children_of::<VariantId>(name.id()) {
            self.copy_variant(merge_map, queue, variant, copy)?;
        }
        self.copy_reifier(merge_map, queue, name.into(), copy.into())
    }

    fn copy_variant(
        &mut self,
        merge_map: &MergeMap,
        queue: &mut MergeQueue,
        variant: VariantId,
        target_name: NameId,
    ) -> Result<()> {
        let record = self.store.variant(variant)?;
        let literal = record.literal.clone();
        let own_scope = merge_map.get_all(record.scope.themes().iter().copied(), queue)?;
        let name_scope = self.store.name(target_name)?.scope.themes().clone();
        let signature = VariantSignature {
            scope: ScopeSignature::new(own_scope.iter().copied().chain(name_scope)),
            data: DataSignature::literal(&literal),
        };

        let siblings = self.store.children_of::<VariantId>(target_name.id());
        let duplicate =
            self.find_duplicate(siblings, None, &signature, |store, v| variant_signature(store, v))?;
        let copy = match duplicate {
            Some(existing) => existing,
            None => self.create_variant(target_name, literal, &own_scope)?,
        };
        self.copy_item_identifiers(variant.into(), copy.into())?;
        self.copy_reifier(merge_map, queue, variant.into(), copy.into())
    }

    fn copy_association(
        &mut self,
        merge_map: &MergeMap,
        queue: &mut MergeQueue,
        target_map: TopicMapId,
        association: AssociationId,
    ) -> Result<()> {
        let record = self.store.association(association)?;
        let association_type = merge_map.get(record.typing.get(), queue)?;
        let scope = merge_map.get_all(record.scope.themes().iter().copied(), queue)?;
        let mut roles = Vec::new();
        for role in self.store.children_of::<RoleId>(association.id()) {
            let role_record = self.store.role(role)?;
            let mapped = RoleSignature {
                role_type: merge_map.get(role_record.typing.get(), queue)?,
                player: merge_map.get(role_record.player, queue)?,
            };
            roles.push((role, mapped));
        }
        let signature = AssociationSignature {
            association_type,
            scope: ScopeSignature::new(scope.iter().copied()),
            roles: RolesSignature::new(roles.iter().map(|(_, sig)| *sig)),
        };

        let candidates: Vec<AssociationId> = self
            .store
            .all_of::<AssociationId>(target_map)
            .into_iter()
            .filter(|a| {
                self.store
                    .association(*a)
                    .is_ok_and(|r| r.typing.get() == association_type)
            })
            .collect();
        let existing = self.find_duplicate(candidates, None, &signature, |store, a| {
            association_signature(store, a)
        })?;

        let (copy, role_pairs) = match existing {
            Some(existing) => {
                let mut by_signature = BTreeMap::new();
                for role in self.store.children_of::<RoleId>(existing.id()) {
                    let record = self.store.role(role)?;
                    by_signature
                        .entry(RoleSignature { role_type: record.typing.get(), player: record.player })
                        .or_insert(role);
                }
                let pairs = roles
                    .iter()
                    .filter_map(|(role, sig)| by_signature.get(sig).map(|target| (*role, *target)))
                    .collect::<Vec<_>>();
                debug!(source = %association, existing = %existing, "Association already present");
                (existing, pairs)
            }
            None => {
                let copy = self.create_association(target_map, association_type, &scope)?;
                let mut pairs = Vec::with_capacity(roles.len());
                for (role, sig) in &roles {
                    pairs.push((*role, self.create_role(copy, sig.role_type, sig.player)?));
                }
                (copy, pairs)
            }
        };

        for (role, target_role) in role_pairs {
            self.copy_item_identifiers(role.into(), target_role.into())?;
            self.copy_reifier(merge_map, queue, role.into(), target_role.into())?;
        }
        self.copy_item_identifiers(association.into(), copy.into())?;
        self.copy_reifier(merge_map, queue, association.into(), copy.into())
    }

    fn copy_item_identifiers(&mut self, source: ConstructRef, target: ConstructRef) -> Result<()> {
        if !self.store.contains_ref(target) {
            return Ok(());
        }
        let topic_map = self.store.record(target.id())?.topic_map(target.id());
        for locator in self.store.identities(source.id(), IdentityKind::ItemIdentifier) {
            self.bind_item_identifier(topic_map, target, &locator)?;
        }
        Ok(())
    }

    /// Give `target` the mapped reifier of `source`.
    ///
    /// If `target` already has a different reifier, the two are merged.
    fn copy_reifier(
        &mut self,
        merge_map: &MergeMap,
        queue: &mut MergeQueue,
        source: ConstructRef,
        target: ConstructRef,
    ) -> Result<()> {
        let Some(source_reifier) = self.reifier_of(source)? else {
            return Ok(());
        };
        if !self.store.contains_ref(target) {
            return Ok(());
        }
        let reifier = merge_map.get(source_reifier, queue)?;
        match self.reifier_of(target)? {
            Some(existing) if existing == reifier => Ok(()),
            Some(existing) => {
                queue.enqueue(existing, reifier);
                self.run_merges(queue)
            }
            None => {
                let topic_map = self.store.record(target.id())?.topic_map(target.id());
                self.check_reifier(target, topic_map, reifier)?;
                self.attach_reifier(target, Some(reifier))
            }
        }
    }
}
