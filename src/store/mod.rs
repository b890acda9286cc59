//! Construct storage backends.
//!
//! The engine keeps all state in a [`ConstructStore`]: typed records keyed
//! by [`ConstructId`], a parent/child index, and the identity table that maps
//! (topic map, identity kind, address) to the single owning construct.

pub mod memory;

use crate::error::{ModelError, Result};
use crate::types::{
    AssociationId, AssociationRecord, Construct, ConstructId, ConstructKind, ConstructRef,
    IdentityKind, Locator, NameId, NameRecord, OccurrenceId, OccurrenceRecord, Record, RoleId,
    RoleRecord, TopicId, TopicMapId, TopicMapRecord, TopicRecord, VariantId, VariantRecord,
};

/// Key of a row in the identity table.
///
/// Uniqueness of this key is the identity constraint: one address, one
/// owner, per topic map and namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    /// Map the identifier belongs to.
    pub topic_map: TopicMapId,
    /// Namespace.
    pub kind: IdentityKind,
    /// External form of the locator.
    pub address: String,
}

impl IdentityKey {
    /// Create a key for `locator`.
    pub fn new(topic_map: TopicMapId, kind: IdentityKind, locator: &Locator) -> Self {
        Self {
            topic_map,
            kind,
            address: locator.to_external_form().to_string(),
        }
    }
}

/// Trait for construct storage backends.
///
/// Implementations must return ids in ascending order so that every
/// traversal in the engine is deterministic. Operations are synchronous and
/// infallible; a missing record is reported as `None`.
pub trait ConstructStore: Send + Sync {
    /// Allocate a fresh id. Ids are never reused.
    fn allocate_id(&mut self) -> ConstructId;

    /// Store a record under `id`.
    fn insert(&mut self, id: ConstructId, record: Record);

    /// Fetch a record.
    fn get(&self, id: ConstructId) -> Option<&Record>;

    /// Fetch a record for mutation. Callers must not change its parent here.
    fn get_mut(&mut self, id: ConstructId) -> Option<&mut Record>;

    /// Delete a record and every identity row it owns.
    fn delete(&mut self, id: ConstructId) -> Option<Record>;

    /// Move a record under a new parent. Returns false if the kinds do not fit.
    fn reparent(&mut self, id: ConstructId, parent: ConstructRef) -> bool;

    /// Children of a construct, in id order.
    fn children(&self, parent: ConstructId) -> Vec<ConstructRef>;

    /// All constructs of `kind` in a topic map, in id order.
    fn filter(&self, topic_map: TopicMapId, kind: ConstructKind) -> Vec<ConstructId>;

    /// All topic maps, in id order.
    fn topic_maps(&self) -> Vec<TopicMapId>;

    /// Owner of an identity row.
    fn lookup(&self, key: &IdentityKey) -> Option<ConstructRef>;

    /// Bind an identity row to `owner`, replacing any previous owner.
    fn bind(&mut self, key: IdentityKey, owner: ConstructRef, locator: Locator) -> Option<ConstructRef>;

    /// Delete an identity row.
    fn unbind(&mut self, key: &IdentityKey) -> Option<ConstructRef>;

    /// Locators of `kind` owned by a construct, in address order.
    fn identities(&self, owner: ConstructId, kind: IdentityKind) -> Vec<Locator>;
}

macro_rules! typed_accessors {
    ($($get:ident, $get_mut:ident, $handle:ty, $variant:ident, $record:ty;)*) => {$(
        #[doc = concat!("Fetch the `", stringify!($variant), "` record behind a handle.")]
        fn $get(&self, handle: $handle) -> Result<&$record> {
            match self.get(handle.id()) {
                Some(Record::$variant(r)) => Ok(r),
                _ => Err(ModelError::NotFound(handle.id())),
            }
        }

        #[doc = concat!("Fetch the `", stringify!($variant), "` record behind a handle for mutation.")]
        fn $get_mut(&mut self, handle: $handle) -> Result<&mut $record> {
            match self.get_mut(handle.id()) {
                Some(Record::$variant(r)) => Ok(r),
                _ => Err(ModelError::NotFound(handle.id())),
            }
        }
    )*};
}

/// Typed, error-reporting accessors on top of any [`ConstructStore`].
pub trait StoreExt: ConstructStore {
    /// Fetch any record, failing with `NotFound` if it is gone.
    fn record(&self, id: ConstructId) -> Result<&Record> {
        self.get(id).ok_or(ModelError::NotFound(id))
    }

    /// Fetch any record for mutation.
    fn record_mut(&mut self, id: ConstructId) -> Result<&mut Record> {
        self.get_mut(id).ok_or(ModelError::NotFound(id))
    }

    /// Fetch the record behind a typed handle, checking its kind.
    fn checked<C: Construct>(&self, handle: C) -> Result<&Record> {
        match self.get(handle.id()) {
            Some(record) if record.kind() == C::KIND => Ok(record),
            _ => Err(ModelError::NotFound(handle.id())),
        }
    }

    /// Whether the handle addresses a live construct of its kind.
    fn contains<C: Construct>(&self, handle: C) -> bool {
        self.checked(handle).is_ok()
    }

    /// Whether a tagged reference addresses a live construct of its kind.
    fn contains_ref(&self, construct: ConstructRef) -> bool {
        self.get(construct.id())
            .is_some_and(|record| record.kind() == construct.kind())
    }

    /// Resolve a bare id to a tagged reference.
    fn resolve_ref(&self, id: ConstructId) -> Option<ConstructRef> {
        self.get(id).map(|record| ConstructRef::new(record.kind(), id))
    }

    /// Owning topic map of any construct.
    fn owner_map<C: Construct>(&self, handle: C) -> Result<TopicMapId> {
        Ok(self.checked(handle)?.topic_map(handle.id()))
    }

    /// Children of `parent` narrowed to one handle type.
    fn children_of<C: Construct>(&self, parent: ConstructId) -> Vec<C> {
        self.children(parent)
            .into_iter()
            .filter_map(|child| child.downcast::<C>())
            .collect()
    }

    /// Constructs of one handle type in a topic map.
    fn all_of<C: Construct>(&self, topic_map: TopicMapId) -> Vec<C> {
        self.filter(topic_map, C::KIND)
            .into_iter()
            .map(C::from_id)
            .collect()
    }

    typed_accessors! {
        topic_map_record, topic_map_record_mut, TopicMapId, TopicMap, TopicMapRecord;
        topic, topic_mut, TopicId, Topic, TopicRecord;
        association, association_mut, AssociationId, Association, AssociationRecord;
        role, role_mut, RoleId, Role, RoleRecord;
        name, name_mut, NameId, Name, NameRecord;
        occurrence, occurrence_mut, OccurrenceId, Occurrence, OccurrenceRecord;
        variant, variant_mut, VariantId, Variant, VariantRecord;
    }
}

impl<S: ConstructStore + ?Sized> StoreExt for S {}

pub use memory::InMemoryConstructStore;
