//! Topic map merge tests: copying one map into another.

mod common;

use common::{loc, make_map, make_system, make_system_without_automerge, psi_topic};
use topicmap_kernel::{ConstructRef, TopicMapFingerprint, TopicMapId, TopicMapSystem};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn fingerprint(sys: &TopicMapSystem, tm: TopicMapId) -> TopicMapFingerprint {
    TopicMapFingerprint::compute(sys, tm).unwrap()
}

/// Puccini composed Tosca, with a name, a variant and a birth year.
fn build_opera_map(sys: &mut TopicMapSystem, iri: &str) -> TopicMapId {
    let tm = make_map(sys, iri);
    let puccini = psi_topic(sys, tm, "puccini");
    let tosca = psi_topic(sys, tm, "tosca");
    let composer = psi_topic(sys, tm, "composer");
    let work = psi_topic(sys, tm, "work");
    let composed_by = psi_topic(sys, tm, "composed-by");
    let born = psi_topic(sys, tm, "born");
    let sort = psi_topic(sys, tm, "sort");

    sys.add_type(puccini, composer).unwrap();
    let name = sys.create_name(puccini, None, "Giacomo Puccini", &[]).unwrap();
    sys.create_variant(name, "puccini, giacomo", &[sort]).unwrap();
    sys.create_occurrence(puccini, born, 1858i32, &[]).unwrap();
    let association = sys.create_association(tm, composed_by, &[]).unwrap();
    sys.create_role(association, composer, puccini).unwrap();
    sys.create_role(association, work, tosca).unwrap();
    let iid = loc(sys, &format!("{iri}#composed-by-1"));
    sys.add_item_identifier(association, &iid).unwrap();
    tm
}

// ─────────────────────────────────────────────────────────────────────────────
// Copying
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_merge_into_empty_map_reproduces_content() {
    let mut sys = make_system();
    let source = build_opera_map(&mut sys, "http://example.org/source");
    let target = make_map(&mut sys, "http://example.org/target");

    sys.merge_in(target, source).unwrap();

    let copied = fingerprint(&sys, target);
    let original = fingerprint(&sys, source);
    assert_eq!(copied.topic_count, original.topic_count);
    assert_eq!(copied.association_count, 1);
    assert_eq!(copied.type_hash, original.type_hash);
    assert_eq!(copied.identity_hash, original.identity_hash);
    assert_eq!(copied.statement_hash, original.statement_hash);
}

#[test]
fn test_source_is_never_modified() {
    let mut sys = make_system();
    let source = build_opera_map(&mut sys, "http://example.org/source");
    let target = build_opera_map(&mut sys, "http://example.org/target");
    let before = fingerprint(&sys, source);

    sys.merge_in(target, source).unwrap();

    assert_eq!(fingerprint(&sys, source), before);
}

#[test]
fn test_merge_twice_is_idempotent() {
    let mut sys = make_system();
    let source = build_opera_map(&mut sys, "http://example.org/source");
    let target = make_map(&mut sys, "http://example.org/target");

    sys.merge_in(target, source).unwrap();
    let once = fingerprint(&sys, target);
    sys.merge_in(target, source).unwrap();
    let twice = fingerprint(&sys, target);

    assert_eq!(once, twice);
    assert_eq!(sys.get_associations(target).unwrap().len(), 1);
}

#[test]
fn test_merge_copies_statement_item_identifiers() {
    let mut sys = make_system();
    let source = build_opera_map(&mut sys, "http://example.org/source");
    let target = make_map(&mut sys, "http://example.org/target");

    sys.merge_in(target, source).unwrap();

    let iid = loc(&sys, "http://example.org/source#composed-by-1");
    let owner = sys.get_construct_by_item_identifier(target, &iid).unwrap();
    let association = sys.get_associations(target).unwrap()[0];
    assert_eq!(owner, Some(ConstructRef::Association(association)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Same-Subject Topics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_item_identifier_matches_subject_identifier() {
    let mut sys = make_system();
    let iri = "http://example.org/puccini";
    let target = make_map(&mut sys, "http://example.org/target");
    let sid = loc(&sys, iri);
    let existing = sys.create_topic_by_subject_identifier(target, &sid).unwrap();
    sys.create_name(existing, None, "Puccini", &[]).unwrap();

    let source = make_map(&mut sys, "http://example.org/source");
    let incoming = sys.create_topic_by_item_identifier(source, &sid).unwrap();
    sys.create_name(incoming, None, "Puccini", &[]).unwrap();

    sys.merge_in(target, source).unwrap();

    assert_eq!(sys.get_topic_by_subject_identifier(target, &sid).unwrap(), Some(existing));
    assert_eq!(sys.get_item_identifiers(existing).unwrap(), vec![sid.clone()]);
    assert_eq!(sys.get_names(existing, None).unwrap().len(), 1);
}

#[test]
fn test_source_topic_matching_two_targets_merges_them() {
    let mut sys = make_system_without_automerge();
    let target = make_map(&mut sys, "http://example.org/target");
    let first = psi_topic(&mut sys, target, "puccini");
    let second = psi_topic(&mut sys, target, "giacomo-puccini");

    let source = make_map(&mut sys, "http://example.org/source");
    let bridge = psi_topic(&mut sys, source, "puccini");
    let alias = loc(&sys, "http://psi.example.org/giacomo-puccini");
    sys.add_subject_identifier(bridge, &alias).unwrap();

    sys.merge_in(target, source).unwrap();

    let topics = sys.get_topics(target).unwrap();
    assert_eq!(topics.len(), 1);
    assert!(sys.exists(first) != sys.exists(second));
    assert_eq!(sys.get_subject_identifiers(topics[0]).unwrap().len(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Reification
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_map_reifier_is_adopted() {
    let mut sys = make_system();
    let source = make_map(&mut sys, "http://example.org/source");
    let reifier = psi_topic(&mut sys, source, "opera-map");
    sys.set_reifier(source, Some(reifier)).unwrap();
    let target = make_map(&mut sys, "http://example.org/target");

    sys.merge_in(target, source).unwrap();

    let sid = loc(&sys, "http://psi.example.org/opera-map");
    let copied = sys.get_topic_by_subject_identifier(target, &sid).unwrap().unwrap();
    assert_eq!(sys.get_reifier(target).unwrap(), Some(copied));
    assert_eq!(sys.get_reifier(source).unwrap(), Some(reifier));
}

#[test]
fn test_map_reifiers_are_merged() {
    let mut sys = make_system();
    let source = make_map(&mut sys, "http://example.org/source");
    let source_reifier = psi_topic(&mut sys, source, "source-map");
    sys.set_reifier(source, Some(source_reifier)).unwrap();
    let target = make_map(&mut sys, "http://example.org/target");
    let target_reifier = psi_topic(&mut sys, target, "target-map");
    sys.set_reifier(target, Some(target_reifier)).unwrap();

    sys.merge_in(target, source).unwrap();

    let sid = loc(&sys, "http://psi.example.org/source-map");
    assert_eq!(sys.get_topic_by_subject_identifier(target, &sid).unwrap(), Some(target_reifier));
    assert_eq!(sys.get_reifier(target).unwrap(), Some(target_reifier));
    assert_eq!(sys.get_topics(target).unwrap(), vec![target_reifier]);
}

#[test]
fn test_statement_reifiers_are_merged() {
    let mut sys = make_system();
    let target = make_map(&mut sys, "http://example.org/target");
    let topic = psi_topic(&mut sys, target, "puccini");
    let name = sys.create_name(topic, None, "Puccini", &[]).unwrap();
    let reifier_a = psi_topic(&mut sys, target, "name-reifier-a");
    sys.set_reifier(name, Some(reifier_a)).unwrap();

    let source = make_map(&mut sys, "http://example.org/source");
    let incoming = psi_topic(&mut sys, source, "puccini");
    let incoming_name = sys.create_name(incoming, None, "Puccini", &[]).unwrap();
    let reifier_b = psi_topic(&mut sys, source, "name-reifier-b");
    sys.set_reifier(incoming_name, Some(reifier_b)).unwrap();

    sys.merge_in(target, source).unwrap();

    let sid_a = loc(&sys, "http://psi.example.org/name-reifier-a");
    let sid_b = loc(&sys, "http://psi.example.org/name-reifier-b");
    let merged = sys.get_topic_by_subject_identifier(target, &sid_a).unwrap();
    assert_eq!(sys.get_topic_by_subject_identifier(target, &sid_b).unwrap(), merged);
    assert_eq!(sys.get_reifier(name).unwrap(), merged);
    assert_eq!(sys.get_reified(merged.unwrap()).unwrap(), Some(ConstructRef::Name(name)));
}
