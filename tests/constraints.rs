//! Model constraint tests.

mod common;

use common::{loc, make_map, make_system, psi_topic};
use topicmap_kernel::{ConstructRef, ModelError, SystemError};

#[test]
fn test_cross_map_arguments_rejected() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/a");
    let other = make_map(&mut sys, "http://example.org/b");
    let topic = sys.create_topic(tm).unwrap();
    let foreign = sys.create_topic(other).unwrap();

    let err = sys.create_name(topic, Some(foreign), "N", &[]).unwrap_err();
    assert_eq!(err.reporter(), Some(ConstructRef::Topic(topic)));
    assert!(sys.create_occurrence(topic, topic, "x", &[foreign]).is_err());
    assert!(sys.create_association(tm, foreign, &[]).is_err());
    assert!(sys.add_type(topic, foreign).is_err());

    let association = sys.create_association(tm, topic, &[]).unwrap();
    assert!(sys.create_role(association, topic, foreign).is_err());
    let name = sys.create_name(topic, None, "N", &[]).unwrap();
    assert!(sys.set_reifier(name, Some(foreign)).is_err());
    assert!(sys.add_theme(name, foreign).is_err());
    assert!(sys.get_scope(name).unwrap().is_empty());
}

#[test]
fn test_reifier_reifies_one_construct() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let topic = sys.create_topic(tm).unwrap();
    let reifier = sys.create_topic(tm).unwrap();
    let first = sys.create_name(topic, None, "A", &[]).unwrap();
    let second = sys.create_name(topic, None, "B", &[]).unwrap();

    sys.set_reifier(first, Some(reifier)).unwrap();
    sys.set_reifier(first, Some(reifier)).unwrap();
    let err = sys.set_reifier(second, Some(reifier)).unwrap_err();
    assert!(err.is_model_constraint());
    assert_eq!(err.reporter(), Some(ConstructRef::Name(second)));
    assert_eq!(sys.get_reifier(second).unwrap(), None);
}

#[test]
fn test_variant_scope_must_extend_name_scope() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let topic = sys.create_topic(tm).unwrap();
    let italian = psi_topic(&mut sys, tm, "italian");
    let sort = psi_topic(&mut sys, tm, "sort");
    let name = sys.create_name(topic, None, "Puccini", &[italian]).unwrap();

    assert!(sys.create_variant(name, "v", &[]).unwrap_err().is_model_constraint());
    assert!(sys.create_variant(name, "v", &[italian]).unwrap_err().is_model_constraint());
    assert!(sys.create_variant(name, "v", &[italian, italian]).is_err());

    let variant = sys.create_variant(name, "v", &[italian, sort]).unwrap();
    assert_eq!(sys.get_scope(variant).unwrap(), vec![italian, sort]);
}

#[test]
fn test_variant_keeps_an_own_theme() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let topic = sys.create_topic(tm).unwrap();
    let sort = psi_topic(&mut sys, tm, "sort");
    let display = psi_topic(&mut sys, tm, "display");
    let name = sys.create_name(topic, None, "Puccini", &[]).unwrap();
    let variant = sys.create_variant(name, "puccini", &[sort, display]).unwrap();

    sys.remove_theme(variant, display).unwrap();
    let err = sys.remove_theme(variant, sort).unwrap_err();
    assert_eq!(err.reporter(), Some(ConstructRef::Variant(variant)));
    assert_eq!(sys.get_scope(variant).unwrap(), vec![sort]);
}

#[test]
fn test_name_theme_cannot_swallow_variant_scope() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let topic = sys.create_topic(tm).unwrap();
    let sort = psi_topic(&mut sys, tm, "sort");
    let display = psi_topic(&mut sys, tm, "display");
    let name = sys.create_name(topic, None, "Puccini", &[]).unwrap();
    sys.create_variant(name, "puccini", &[sort]).unwrap();
    sys.create_variant(name, "PUCCINI", &[sort, display]).unwrap();

    let err = sys.add_theme(name, sort).unwrap_err();
    assert!(matches!(err, ModelError::ModelConstraint { .. }));
    assert_eq!(err.reporter(), Some(ConstructRef::Name(name)));
    assert!(sys.get_scope(name).unwrap().is_empty());

    sys.add_theme(name, display).unwrap();
    assert_eq!(sys.get_scope(name).unwrap(), vec![display]);
}

#[test]
fn test_variant_effective_scope_includes_name_themes() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let topic = sys.create_topic(tm).unwrap();
    let italian = psi_topic(&mut sys, tm, "italian");
    let sort = psi_topic(&mut sys, tm, "sort");
    let name = sys.create_name(topic, None, "Puccini", &[]).unwrap();
    let variant = sys.create_variant(name, "puccini", &[sort]).unwrap();

    sys.add_theme(name, italian).unwrap();
    let scope = sys.get_scope(variant).unwrap();
    assert_eq!(scope.len(), 2);
    assert!(scope.contains(&italian));
    assert!(scope.contains(&sort));
}

#[test]
fn test_topic_in_use_cannot_be_removed() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let subject = sys.create_topic(tm).unwrap();
    let ty = sys.create_topic(tm).unwrap();
    let theme = sys.create_topic(tm).unwrap();
    let player = sys.create_topic(tm).unwrap();
    let reifier = sys.create_topic(tm).unwrap();

    sys.add_type(subject, ty).unwrap();
    let name = sys.create_name(subject, None, "N", &[theme]).unwrap();
    let association = sys.create_association(tm, subject, &[]).unwrap();
    sys.create_role(association, subject, player).unwrap();
    sys.set_reifier(name, Some(reifier)).unwrap();

    for topic in [ty, theme, player, reifier] {
        assert!(matches!(sys.remove(topic), Err(ModelError::TopicInUse { .. })));
        assert!(sys.exists(topic));
    }

    sys.remove(association).unwrap();
    sys.remove(player).unwrap();
    assert!(!sys.exists(player));
}

#[test]
fn test_topic_map_locators_are_unique() {
    let mut sys = make_system();
    make_map(&mut sys, "http://example.org/map");
    let locator = loc(&sys, "http://example.org/map");
    assert!(matches!(
        sys.create_topic_map(&locator),
        Err(SystemError::TopicMapExists(_))
    ));
}

#[test]
fn test_failed_operation_leaves_no_trace() {
    let mut sys = make_system();
    let tm = make_map(&mut sys, "http://example.org/map");
    let other = make_map(&mut sys, "http://example.org/other");
    let topic = sys.create_topic(tm).unwrap();
    let foreign = sys.create_topic(other).unwrap();
    let topics = sys.get_topics(tm).unwrap();

    assert!(sys.create_name(topic, None, "N", &[foreign]).is_err());
    assert!(sys.get_names(topic, None).unwrap().is_empty());
    assert_eq!(sys.get_topics(tm).unwrap(), topics);
}
