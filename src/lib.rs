//! # topicmap-kernel
//!
//! Identity resolution and merging for the Topic Maps Data Model.
//!
//! The kernel answers one question:
//!
//! > When do two constructs stand for the **same thing**, and what is left after they are merged?
//!
//! ## Core Contract
//!
//! 1. Every identifier (item identifier, subject identifier, subject locator) has at most one owner per topic map
//! 2. Topics sharing an identifier are merged, or the collision is reported, depending on the `automerge` feature
//! 3. After any merge no two statements of a parent carry the same signature
//!
//! ## Architecture
//!
//! ```text
//! TopicMapSystemFactory → TopicMapSystem ─┬─ graph     (create / read / update / remove)
//!                              │           ├─ identity  (identifier table, collision handling)
//!                              │           ├─ merge     (worklist topic merge, duplicate collapse)
//!                              │           ├─ copy      (merge one topic map into another)
//!                              │           └─ index     (type-instance, scoped, literal lookups)
//!                              ↓
//!                        ConstructStore (in memory)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Ids are allocated in ascending order and never reused
//! - Every traversal visits constructs in id order
//! - When duplicates collapse, the statement already in place is kept and the moved or re-pointed one is removed

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod error;
pub mod canonical;
pub mod signature;
pub mod system;
pub mod graph;
pub mod identity;
pub mod merge;
pub mod copy;
pub mod index;
pub mod transaction;
pub mod snapshot;

mod constraint;

// Re-exports
pub use types::{
    AssociationId, Construct, ConstructId, ConstructKind, ConstructRef, DatatypeAware,
    IdentityKind, Literal, LiteralError, Locator, LocatorError, NameId, OccurrenceId, Reifiable,
    RoleId, Scoped, TopicId, TopicMapId, Typed, VariantId,
};
pub use types::literal::xsd;
pub use types::feature::{AUTOMERGE, MERGE_BY_TOPIC_NAME, READ_ONLY, TYPE_INSTANCE_ASSOCIATIONS};
pub use error::{ModelError, SystemError};
pub use store::{ConstructStore, InMemoryConstructStore, StoreExt};
pub use system::{SystemConfig, TopicMapSystem, TopicMapSystemFactory};
pub use graph::TOPIC_NAME_TYPE;
pub use signature::{
    AssociationSignature, NameSignature, OccurrenceSignature, RoleSignature, RolesSignature,
    ScopeSignature, VariantSignature,
};
pub use index::{LiteralIndex, ScopedIndex, TypeInstanceIndex};
pub use transaction::SharedTopicMapSystem;
pub use snapshot::{FingerprintError, TopicMapFingerprint};
