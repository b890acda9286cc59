//! Feature strings.
//!
//! Features are booleans keyed by well-known IRIs. A feature is either
//! supported (it may be switched on or off) or merely recognized (it is
//! pinned to its default value).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SystemError;

/// Common prefix of all feature strings.
pub const FEATURE_BASE: &str = "http://tmapi.org/features/";

/// Identity collisions between topics merge them instead of failing.
pub const AUTOMERGE: &str = "http://tmapi.org/features/automerge";

/// Topics with equal names in equal scope merge.
pub const MERGE_BY_TOPIC_NAME: &str = "http://tmapi.org/features/merge/byTopicName";

/// The system rejects every mutation.
pub const READ_ONLY: &str = "http://tmapi.org/features/readOnly";

/// Topic types are represented as associations.
pub const TYPE_INSTANCE_ASSOCIATIONS: &str = "http://tmapi.org/features/type-instance-associations";

/// Description of a recognized feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    /// Feature IRI.
    pub name: &'static str,
    /// Value when never set.
    pub default: bool,
    /// Whether the value may differ from the default.
    pub supported: bool,
}

/// Every feature this engine recognizes.
pub static RECOGNIZED_FEATURES: [FeatureDescriptor; 4] = [
    FeatureDescriptor { name: AUTOMERGE, default: true, supported: true },
    FeatureDescriptor { name: MERGE_BY_TOPIC_NAME, default: false, supported: false },
    FeatureDescriptor { name: READ_ONLY, default: false, supported: false },
    FeatureDescriptor { name: TYPE_INSTANCE_ASSOCIATIONS, default: false, supported: false },
];

fn descriptor(name: &str) -> Option<&'static FeatureDescriptor> {
    RECOGNIZED_FEATURES.iter().find(|d| d.name == name)
}

/// Current values of all recognized features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    values: BTreeMap<String, bool>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            values: RECOGNIZED_FEATURES
                .iter()
                .map(|d| (d.name.to_string(), d.default))
                .collect(),
        }
    }
}

impl FeatureSet {
    /// Value of a feature.
    pub fn get(&self, name: &str) -> Result<bool, SystemError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| SystemError::FeatureNotRecognized(name.to_string()))
    }

    /// Whether `name` is supported (may be switched).
    pub fn is_supported(&self, name: &str) -> Result<bool, SystemError> {
        descriptor(name)
            .map(|d| d.supported)
            .ok_or_else(|| SystemError::FeatureNotRecognized(name.to_string()))
    }

    /// Change a feature.
    ///
    /// Setting an unsupported feature to the value it already has is accepted.
    pub fn set(&mut self, name: &str, enabled: bool) -> Result<(), SystemError> {
        let descriptor =
            descriptor(name).ok_or_else(|| SystemError::FeatureNotRecognized(name.to_string()))?;
        let current = self.get(name)?;
        if !descriptor.supported && current != enabled {
            return Err(SystemError::FeatureNotSupported(name.to_string()));
        }
        self.values.insert(name.to_string(), enabled);
        Ok(())
    }

    /// Shorthand for the automerge flag.
    pub fn automerge(&self) -> bool {
        self.values.get(AUTOMERGE).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let features = FeatureSet::default();
        assert!(features.get(AUTOMERGE).unwrap());
        assert!(!features.get(READ_ONLY).unwrap());
        assert!(features.automerge());
    }

    #[test]
    fn test_unsupported_feature_keeps_default() {
        let mut features = FeatureSet::default();
        assert!(features.set(READ_ONLY, false).is_ok());
        assert!(matches!(
            features.set(READ_ONLY, true),
            Err(SystemError::FeatureNotSupported(_))
        ));
    }

    #[test]
    fn test_unknown_feature() {
        let mut features = FeatureSet::default();
        let unknown = format!("{FEATURE_BASE}no-such-feature");
        assert!(matches!(features.get(&unknown), Err(SystemError::FeatureNotRecognized(_))));
        assert!(matches!(
            features.set(&unknown, true),
            Err(SystemError::FeatureNotRecognized(_))
        ));
    }

    #[test]
    fn test_automerge_toggle() {
        let mut features = FeatureSet::default();
        features.set(AUTOMERGE, false).unwrap();
        assert!(!features.automerge());
    }
}
