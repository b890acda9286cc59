//! Topic map fingerprints.
//!
//! A [`TopicMapFingerprint`] captures the content of one topic map in a few
//! hashes: its identities, topic types and statements. Topics are labelled
//! by their smallest identity rather than their id, so two maps holding
//! the same identified content produce the same fingerprint. Topics
//! without any identity fall back to their id.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::error::ModelError;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, Construct, ConstructRef, IdentityKind, Literal, NameId, OccurrenceId, RoleId,
    TopicId, TopicMapId, VariantId,
};

/// Error computing a fingerprint.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The map or one of its constructs could not be read.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    /// Canonical serialization failed.
    #[error("Canonical serialization failed: {0}")]
    Canonical(#[from] serde_json::Error),
}

/// A deterministic fingerprint of one topic map's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMapFingerprint {
    /// xxh64 over all components.
    pub fingerprint_id: String,
    /// Number of topics.
    pub topic_count: u64,
    /// Number of associations.
    pub association_count: u64,
    /// Hash of sorted (topic, kind, address) identity rows.
    pub identity_hash: String,
    /// Hash of sorted (topic, type) pairs.
    pub type_hash: String,
    /// Hash of sorted statements. Roles within an association count as a set.
    pub statement_hash: String,
}

/// A statement with every topic replaced by its label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
enum StatementEntry {
    Association {
        association_type: String,
        scope: BTreeSet<String>,
        roles: BTreeSet<(String, String)>,
        reifier: Option<String>,
        item_identifiers: Vec<String>,
    },
    Name {
        topic: String,
        name_type: String,
        scope: BTreeSet<String>,
        value: String,
        variants: BTreeSet<(BTreeSet<String>, String, String)>,
        reifier: Option<String>,
        item_identifiers: Vec<String>,
    },
    Occurrence {
        topic: String,
        occurrence_type: String,
        scope: BTreeSet<String>,
        value: String,
        datatype: String,
        reifier: Option<String>,
        item_identifiers: Vec<String>,
    },
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    topic_count: u64,
    association_count: u64,
    identity_hash: &'a str,
    type_hash: &'a str,
    statement_hash: &'a str,
    reifier: Option<String>,
}

struct Labeller<'a, S: ConstructStore> {
    system: &'a TopicMapSystem<S>,
}

impl<'a, S: ConstructStore> Labeller<'a, S> {
    fn topic(&self, topic: TopicId) -> String {
        let store = self.system.store();
        IdentityKind::ALL
            .into_iter()
            .flat_map(|kind| {
                store
                    .identities(topic.id(), kind)
                    .into_iter()
                    .map(move |locator| format!("{}:{}", kind, locator.to_external_form()))
            })
            .min()
            .unwrap_or_else(|| format!("~{}", topic.id()))
    }

    fn topics(&self, topics: impl IntoIterator<Item = TopicId>) -> BTreeSet<String> {
        topics.into_iter().map(|t| self.topic(t)).collect()
    }

    fn reifier(&self, construct: ConstructRef) -> Result<Option<String>, ModelError> {
        Ok(self.system.reifier_of(construct)?.map(|t| self.topic(t)))
    }

    fn item_identifiers(&self, construct: ConstructRef) -> Vec<String> {
        self.system
            .store()
            .identities(construct.id(), IdentityKind::ItemIdentifier)
            .into_iter()
            .map(|l| l.to_external_form().to_string())
            .collect()
    }

    fn literal(literal: &Literal) -> (String, String) {
        (
            literal.value().to_string(),
            literal.datatype().to_external_form().to_string(),
        )
    }
}

impl TopicMapFingerprint {
    /// Compute the fingerprint of `topic_map`.
    pub fn compute<S: ConstructStore>(
        system: &TopicMapSystem<S>,
        topic_map: TopicMapId,
    ) -> Result<Self, FingerprintError> {
        let store = system.store();
        let labels = Labeller { system };
        let topics = system.get_topics(topic_map)?;
        let associations = system.get_associations(topic_map)?;

        // Identity rows
        let mut identities = BTreeSet::new();
        for &topic in &topics {
            let label = labels.topic(topic);
            for kind in IdentityKind::ALL {
                for locator in store.identities(topic.id(), kind) {
                    identities.insert((label.clone(), kind.to_string(), locator.to_external_form().to_string()));
                }
            }
        }

        // Topic types
        let mut types = BTreeSet::new();
        for &topic in &topics {
            let label = labels.topic(topic);
            for ty in system.get_types(topic)? {
                types.insert((label.clone(), labels.topic(ty)));
            }
        }

        // Statements, duplicates included
        let mut statements = Vec::new();
        for &topic in &topics {
            let label = labels.topic(topic);
            for occurrence in store.children_of::<OccurrenceId>(topic.id()) {
                let record = store.occurrence(occurrence)?;
                let (value, datatype) = Labeller::<S>::literal(&record.literal);
                statements.push(StatementEntry::Occurrence {
                    topic: label.clone(),
                    occurrence_type: labels.topic(record.typing.get()),
                    scope: labels.topics(record.scope.themes().iter().copied()),
                    value,
                    datatype,
                    reifier: labels.reifier(occurrence.into())?,
                    item_identifiers: labels.item_identifiers(occurrence.into()),
                });
            }
            for name in store.children_of::<NameId>(topic.id()) {
                let record = store.name(name)?;
                let mut variants = BTreeSet::new();
                for variant in store.children_of::<VariantId>(name.id()) {
                    let (value, datatype) = Labeller::<S>::literal(&store.variant(variant)?.literal);
                    variants.insert((labels.topics(system.get_scope(variant)?), value, datatype));
                }
                statements.push(StatementEntry::Name {
                    topic: label.clone(),
                    name_type: labels.topic(record.typing.get()),
                    scope: labels.topics(record.scope.themes().iter().copied()),
                    value: record.value.clone(),
                    variants,
                    reifier: labels.reifier(name.into())?,
                    item_identifiers: labels.item_identifiers(name.into()),
                });
            }
        }
        for &association in &associations {
            statements.push(association_entry(&labels, association)?);
        }

        statements.sort();

        let identity_hash = canonical_hash_hex(&identities)?;
        let type_hash = canonical_hash_hex(&types)?;
        let statement_hash = canonical_hash_hex(&statements)?;
        let topic_count = topics.len() as u64;
        let association_count = associations.len() as u64;
        let fingerprint_id = canonical_hash_hex(&FingerprintInput {
            topic_count,
            association_count,
            identity_hash: &identity_hash,
            type_hash: &type_hash,
            statement_hash: &statement_hash,
            reifier: labels.reifier(topic_map.into())?,
        })?;

        Ok(Self {
            fingerprint_id,
            topic_count,
            association_count,
            identity_hash,
            type_hash,
            statement_hash,
        })
    }
}

fn association_entry<S: ConstructStore>(
    labels: &Labeller<'_, S>,
    association: AssociationId,
) -> Result<StatementEntry, ModelError> {
    let store = labels.system.store();
    let record = store.association(association)?;
    let mut roles = BTreeSet::new();
    for role in store.children_of::<RoleId>(association.id()) {
        let role_record = store.role(role)?;
        roles.insert((labels.topic(role_record.typing.get()), labels.topic(role_record.player)));
    }
    Ok(StatementEntry::Association {
        association_type: labels.topic(record.typing.get()),
        scope: labels.topics(record.scope.themes().iter().copied()),
        roles,
        reifier: labels.reifier(association.into())?,
        item_identifiers: labels.item_identifiers(association.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::TopicMapSystemFactory;

    fn make_map(sys: &mut TopicMapSystem, iri: &str) -> TopicMapId {
        let loc = sys.create_locator(iri).unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        let sid = sys.create_locator("http://psi.example.org/person").unwrap();
        let person = sys.create_topic_by_subject_identifier(tm, &sid).unwrap();
        sys.create_name(person, Some(person), "Person", &[]).unwrap();
        tm
    }

    #[test]
    fn test_fingerprint_determinism() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let tm = make_map(&mut sys, "http://example.org/a");
        let first = TopicMapFingerprint::compute(&sys, tm).unwrap();
        let second = TopicMapFingerprint::compute(&sys, tm).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.topic_count, 1);
    }

    #[test]
    fn test_fingerprint_ignores_ids() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let a = make_map(&mut sys, "http://example.org/a");
        let b = make_map(&mut sys, "http://example.org/b");
        assert_eq!(
            TopicMapFingerprint::compute(&sys, a).unwrap().fingerprint_id,
            TopicMapFingerprint::compute(&sys, b).unwrap().fingerprint_id
        );
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let tm = make_map(&mut sys, "http://example.org/a");
        let before = TopicMapFingerprint::compute(&sys, tm).unwrap();
        sys.create_topic(tm).unwrap();
        let after = TopicMapFingerprint::compute(&sys, tm).unwrap();
        assert_ne!(before.fingerprint_id, after.fingerprint_id);
    }
}
