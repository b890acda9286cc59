//! Error taxonomy.
//!
//! - [`ModelError`]: a mutation would break a Topic Maps Data Model
//!   invariant. Always attributable to a reporting construct.
//! - [`SystemError`]: configuration and topic map registry failures raised
//!   by the factory and system layer.

use crate::types::{ConstructId, ConstructRef, Locator, LocatorError, TopicId};

/// Result alias used throughout the engine.
pub type Result<T, E = ModelError> = std::result::Result<T, E>;

/// Model constraint violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Generic constraint violation.
    #[error("Model constraint violated by {reporter}: {message}")]
    ModelConstraint {
        /// Construct on which the mutation was attempted.
        reporter: ConstructRef,
        /// What went wrong.
        message: String,
    },
    /// Two constructs would share an identifier.
    ///
    /// Carries the current owner so callers can decide to merge instead.
    #[error("Identity constraint violated by {reporter}: {locator} is already held by {existing}")]
    IdentityConstraint {
        /// Construct that tried to take the identifier.
        reporter: ConstructRef,
        /// Construct that holds it.
        existing: ConstructRef,
        /// The colliding identifier.
        locator: Locator,
    },
    /// A topic cannot be removed while it is referenced.
    #[error("Topic {reporter} is in use: {message}")]
    TopicInUse {
        /// Topic that was to be removed.
        reporter: TopicId,
        /// Which usage blocks the removal.
        message: String,
    },
    /// The handle does not address a live construct of the expected kind.
    #[error("Construct not found: {0}")]
    NotFound(ConstructId),
    /// An identifier string is not an absolute IRI.
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

impl ModelError {
    /// Create a model constraint error.
    pub fn constraint(reporter: impl Into<ConstructRef>, message: impl Into<String>) -> Self {
        Self::ModelConstraint {
            reporter: reporter.into(),
            message: message.into(),
        }
    }

    /// True for constraint violations, including identity constraints.
    pub fn is_model_constraint(&self) -> bool {
        matches!(self, Self::ModelConstraint { .. } | Self::IdentityConstraint { .. })
    }

    /// The construct that reported the violation.
    pub fn reporter(&self) -> Option<ConstructRef> {
        match self {
            Self::ModelConstraint { reporter, .. } | Self::IdentityConstraint { reporter, .. } => {
                Some(*reporter)
            }
            Self::TopicInUse { reporter, .. } => Some((*reporter).into()),
            Self::NotFound(_) | Self::Locator(_) => None,
        }
    }
}

/// Factory and system layer errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SystemError {
    /// A topic map with this IRI is already registered.
    #[error("Topic map already exists: {0}")]
    TopicMapExists(Locator),
    /// The feature string is unknown.
    #[error("Feature not recognized: {0}")]
    FeatureNotRecognized(String),
    /// The feature is recognized but cannot take the requested value.
    #[error("Feature not supported: {0}")]
    FeatureNotSupported(String),
    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Invalid IRI.
    #[error(transparent)]
    Locator(#[from] LocatorError),
    /// Model constraint raised while manipulating a topic map.
    #[error(transparent)]
    Model(#[from] ModelError),
}
