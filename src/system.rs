//! Topic map systems and their factory.
//!
//! A [`TopicMapSystem`] owns a construct store and any number of topic maps,
//! each registered under a unique IRI. Its feature flags are fixed when the
//! [`TopicMapSystemFactory`] creates it.
//!
//! ## Configuration
//!
//! ```text
//! {
//!   "features": { "http://tmapi.org/features/automerge": false },
//!   "auto_identifier_base": "urn:uuid:"
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, Result, SystemError};
use crate::store::{ConstructStore, InMemoryConstructStore, StoreExt};
use crate::types::{
    Construct, ConstructKind, FeatureSet, Locator, LocatorError, Record, Reification,
    TopicMapId, TopicMapRecord,
};

/// Default prefix of generated item identifiers.
pub const DEFAULT_AUTO_IDENTIFIER_BASE: &str = "urn:uuid:";

fn default_auto_identifier_base() -> String {
    DEFAULT_AUTO_IDENTIFIER_BASE.to_string()
}

/// Serializable system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Feature overrides keyed by feature IRI.
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
    /// Prefix of the item identifier given to topics created without one.
    #[serde(default = "default_auto_identifier_base")]
    pub auto_identifier_base: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            features: BTreeMap::new(),
            auto_identifier_base: default_auto_identifier_base(),
        }
    }
}

impl SystemConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, SystemError> {
        serde_json::from_str(json).map_err(|e| SystemError::Config(e.to_string()))
    }
}

/// Builds [`TopicMapSystem`]s with a chosen feature set.
#[derive(Debug, Clone, Default)]
pub struct TopicMapSystemFactory {
    features: FeatureSet,
    config: SystemConfig,
}

impl TopicMapSystemFactory {
    /// Create a factory with default features.
    pub fn new_instance() -> Self {
        Self::default()
    }

    /// Create a factory from a configuration, validating every feature override.
    pub fn with_config(config: SystemConfig) -> Result<Self, SystemError> {
        let mut factory = Self::default();
        for (name, enabled) in &config.features {
            factory.set_feature(name, *enabled)?;
        }
        let probe = format!("{}{}", config.auto_identifier_base, Uuid::nil());
        Locator::parse(&probe)?;
        factory.config = config;
        Ok(factory)
    }

    /// Create a factory from a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SystemError> {
        Self::with_config(SystemConfig::from_json(json)?)
    }

    /// Current value of a feature.
    pub fn get_feature(&self, name: &str) -> Result<bool, SystemError> {
        self.features.get(name)
    }

    /// Whether a feature is supported by this implementation.
    pub fn has_feature(&self, name: &str) -> bool {
        self.features.is_supported(name).unwrap_or(false)
    }

    /// Switch a feature for systems created afterwards.
    pub fn set_feature(&mut self, name: &str, enabled: bool) -> Result<(), SystemError> {
        self.features.set(name, enabled)?;
        self.config.features.insert(name.to_string(), enabled);
        Ok(())
    }

    /// Effective configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Create a system backed by an in-memory store.
    pub fn new_topic_map_system(&self) -> TopicMapSystem {
        self.new_topic_map_system_with_store(InMemoryConstructStore::new())
    }

    /// Create a system backed by `store`.
    pub fn new_topic_map_system_with_store<S: ConstructStore>(&self, store: S) -> TopicMapSystem<S> {
        tracing::debug!(
            automerge = self.features.automerge(),
            auto_identifier_base = %self.config.auto_identifier_base,
            "Creating topic map system"
        );
        TopicMapSystem {
            store,
            features: self.features.clone(),
            config: self.config.clone(),
        }
    }
}

/// Owner of a construct store and the topic maps inside it.
#[derive(Debug, Clone)]
pub struct TopicMapSystem<S: ConstructStore = InMemoryConstructStore> {
    pub(crate) store: S,
    features: FeatureSet,
    config: SystemConfig,
}

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Read-only access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Features frozen at creation.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Value of a feature.
    pub fn get_feature(&self, name: &str) -> Result<bool, SystemError> {
        self.features.get(name)
    }

    /// Configuration this system was created with.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Parse an absolute IRI.
    pub fn create_locator(&self, reference: &str) -> Result<Locator, LocatorError> {
        Locator::parse(reference)
    }

    /// Register a new, empty topic map under `locator`.
    pub fn create_topic_map(&mut self, locator: &Locator) -> Result<TopicMapId, SystemError> {
        if self.get_topic_map(locator).is_some() {
            return Err(SystemError::TopicMapExists(locator.clone()));
        }
        let id = self.store.allocate_id();
        self.store.insert(
            id,
            Record::TopicMap(TopicMapRecord {
                locator: locator.clone(),
                reification: Reification::default(),
                title: None,
                base_address: None,
            }),
        );
        tracing::info!(topic_map = %locator, id = %id, "Created topic map");
        Ok(TopicMapId::from_id(id))
    }

    /// Topic map registered under `locator`.
    pub fn get_topic_map(&self, locator: &Locator) -> Option<TopicMapId> {
        self.store.topic_maps().into_iter().find(|tm| {
            self.store
                .topic_map_record(*tm)
                .map(|record| &record.locator == locator)
                .unwrap_or(false)
        })
    }

    /// IRIs of all registered topic maps, in IRI order.
    pub fn get_locators(&self) -> Vec<Locator> {
        let locators: BTreeSet<Locator> = self
            .store
            .topic_maps()
            .into_iter()
            .filter_map(|tm| self.store.topic_map_record(tm).ok().map(|r| r.locator.clone()))
            .collect();
        locators.into_iter().collect()
    }

    /// IRI a topic map is registered under.
    pub fn get_locator(&self, topic_map: TopicMapId) -> Result<Locator> {
        Ok(self.store.topic_map_record(topic_map)?.locator.clone())
    }

    /// Delete a topic map with everything it contains.
    pub fn remove_topic_map(&mut self, topic_map: TopicMapId) -> Result<()> {
        self.store.topic_map_record(topic_map)?;
        let mut removed = 0usize;
        for kind in [
            ConstructKind::Variant,
            ConstructKind::Name,
            ConstructKind::Occurrence,
            ConstructKind::Role,
            ConstructKind::Association,
            ConstructKind::Topic,
        ] {
            for id in self.store.filter(topic_map, kind) {
                self.store.delete(id);
                removed += 1;
            }
        }
        self.store.delete(topic_map.id());
        tracing::info!(topic_map = %topic_map, removed, "Removed topic map");
        Ok(())
    }

    /// Whether identity collisions between topics merge them.
    pub(crate) fn automerge(&self) -> bool {
        self.features.automerge()
    }

    /// Fresh item identifier for a topic created without one.
    pub(crate) fn generate_item_identifier(&self) -> Result<Locator> {
        let reference = format!("{}{}", self.config.auto_identifier_base, Uuid::new_v4());
        Locator::parse(&reference).map_err(ModelError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::feature::{AUTOMERGE, READ_ONLY};

    #[test]
    fn test_topic_map_registry() {
        let mut sys = TopicMapSystemFactory::new_instance().new_topic_map_system();
        let loc = sys.create_locator("http://example.org/map").unwrap();
        let tm = sys.create_topic_map(&loc).unwrap();
        assert_eq!(sys.get_topic_map(&loc), Some(tm));
        assert_eq!(sys.get_locator(tm).unwrap(), loc);
        assert!(matches!(sys.create_topic_map(&loc), Err(SystemError::TopicMapExists(_))));
        assert_eq!(sys.get_locators(), vec![loc.clone()]);

        sys.remove_topic_map(tm).unwrap();
        assert_eq!(sys.get_topic_map(&loc), None);
        assert!(sys.get_locators().is_empty());
    }

    #[test]
    fn test_features_frozen_at_creation() {
        let mut factory = TopicMapSystemFactory::new_instance();
        factory.set_feature(AUTOMERGE, false).unwrap();
        let sys = factory.new_topic_map_system();
        factory.set_feature(AUTOMERGE, true).unwrap();
        assert!(!sys.get_feature(AUTOMERGE).unwrap());
        assert!(factory.has_feature(AUTOMERGE));
        assert!(!factory.has_feature(READ_ONLY));
    }

    #[test]
    fn test_config_from_json() {
        let factory = TopicMapSystemFactory::from_json(
            r#"{"features": {"http://tmapi.org/features/automerge": false}}"#,
        )
        .unwrap();
        assert!(!factory.get_feature(AUTOMERGE).unwrap());
        assert_eq!(factory.config().auto_identifier_base, DEFAULT_AUTO_IDENTIFIER_BASE);
    }

    #[test]
    fn test_config_rejects_unsupported_feature() {
        let result = TopicMapSystemFactory::from_json(
            r#"{"features": {"http://tmapi.org/features/readOnly": true}}"#,
        );
        assert!(matches!(result, Err(SystemError::FeatureNotSupported(_))));
    }

    #[test]
    fn test_config_rejects_bad_identifier_base() {
        let result = TopicMapSystemFactory::from_json(r#"{"auto_identifier_base": "relative/"}"#);
        assert!(matches!(result, Err(SystemError::Locator(_))));
    }
}
