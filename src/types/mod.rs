//! Core types for the topic map kernel.

pub mod locator;
pub mod id;
pub mod literal;
pub mod record;
pub mod feature;

pub use locator::{Locator, LocatorError};
pub use id::{
    AssociationId, Construct, ConstructId, ConstructKind, ConstructRef, DatatypeAware,
    IdentityKind, NameId, OccurrenceId, Reifiable, RoleId, Scoped, TopicId, TopicMapId, Typed,
    VariantId,
};
pub use literal::{xsd, Literal, LiteralError};
pub use record::{
    AssociationRecord, HasReifier, HasScope, HasType, NameRecord, OccurrenceRecord, Record,
    Reification, RoleRecord, Scope, TopicMapRecord, TopicRecord, Typing, VariantRecord,
};
pub use feature::{FeatureDescriptor, FeatureSet};
