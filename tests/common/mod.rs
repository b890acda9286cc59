//! Shared helpers for integration tests.

#![allow(dead_code)]

use topicmap_kernel::{
    Locator, TopicId, TopicMapId, TopicMapSystem, TopicMapSystemFactory, AUTOMERGE,
};

/// Route kernel logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn make_system() -> TopicMapSystem {
    init_tracing();
    TopicMapSystemFactory::new_instance().new_topic_map_system()
}

pub fn make_system_without_automerge() -> TopicMapSystem {
    init_tracing();
    let mut factory = TopicMapSystemFactory::new_instance();
    factory.set_feature(AUTOMERGE, false).unwrap();
    factory.new_topic_map_system()
}

pub fn loc(sys: &TopicMapSystem, iri: &str) -> Locator {
    sys.create_locator(iri).unwrap()
}

pub fn make_map(sys: &mut TopicMapSystem, iri: &str) -> TopicMapId {
    let locator = loc(sys, iri);
    sys.create_topic_map(&locator).unwrap()
}

/// Topic identified by `http://psi.example.org/<name>`.
pub fn psi_topic(sys: &mut TopicMapSystem, tm: TopicMapId, name: &str) -> TopicId {
    let sid = loc(sys, &format!("http://psi.example.org/{name}"));
    sys.create_topic_by_subject_identifier(tm, &sid).unwrap()
}
