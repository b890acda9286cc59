//! Stored construct records.
//!
//! Each record aggregates the capability slots its construct kind needs
//! instead of inheriting them:
//!
//! | Record | [`Typing`] | [`Scope`] | [`Reification`] |
//! |---|---|---|---|
//! | TopicMap | | | yes |
//! | Topic | | | |
//! | Association | yes | yes | yes |
//! | Role | yes | | yes |
//! | Name | yes | yes | yes |
//! | Occurrence | yes | yes | yes |
//! | Variant | | yes | yes |
//!
//! Identifiers (item identifiers, subject identifiers, subject locators)
//! are not part of the records; they live in the store's identity table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::id::{
    AssociationId, Construct, ConstructId, ConstructKind, ConstructRef, NameId, TopicId, TopicMapId,
};
use super::literal::Literal;
use super::locator::Locator;

/// The type slot of a typed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typing {
    topic: TopicId,
}

impl Typing {
    /// Create a type slot.
    pub fn new(topic: TopicId) -> Self {
        Self { topic }
    }

    /// The type topic.
    pub fn get(&self) -> TopicId {
        self.topic
    }

    /// Replace the type topic.
    pub fn set(&mut self, topic: TopicId) {
        self.topic = topic;
    }
}

/// The theme set of a scoped construct. Empty means unconstrained scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    themes: BTreeSet<TopicId>,
}

impl Scope {
    /// Create a scope from themes; duplicates collapse.
    pub fn new(themes: impl IntoIterator<Item = TopicId>) -> Self {
        Self {
            themes: themes.into_iter().collect(),
        }
    }

    /// The themes, in id order.
    pub fn themes(&self) -> &BTreeSet<TopicId> {
        &self.themes
    }

    /// Whether `theme` is part of the scope.
    pub fn contains(&self, theme: TopicId) -> bool {
        self.themes.contains(&theme)
    }

    /// Whether this is the unconstrained scope.
    pub fn is_unconstrained(&self) -> bool {
        self.themes.is_empty()
    }

    /// Add a theme. Returns false if it was already present.
    pub fn insert(&mut self, theme: TopicId) -> bool {
        self.themes.insert(theme)
    }

    /// Remove a theme. Returns false if it was absent.
    pub fn remove(&mut self, theme: TopicId) -> bool {
        self.themes.remove(&theme)
    }

    /// Swap `from` for `to`. Returns true if `from` was present.
    pub fn replace(&mut self, from: TopicId, to: TopicId) -> bool {
        if self.themes.remove(&from) {
            self.themes.insert(to);
            true
        } else {
            false
        }
    }
}

/// The reifier slot of a reifiable construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reification {
    reifier: Option<TopicId>,
}

impl Reification {
    /// The reifying topic, if any.
    pub fn get(&self) -> Option<TopicId> {
        self.reifier
    }

    /// Replace the reifier, returning the previous one.
    pub fn set(&mut self, reifier: Option<TopicId>) -> Option<TopicId> {
        std::mem::replace(&mut self.reifier, reifier)
    }
}

/// Capability: exactly one type topic.
pub trait HasType {
    /// The type slot.
    fn typing(&self) -> &Typing;
    /// Mutable type slot.
    fn typing_mut(&mut self) -> &mut Typing;
}

/// Capability: a set of themes.
pub trait HasScope {
    /// The scope slot.
    fn scope(&self) -> &Scope;
    /// Mutable scope slot.
    fn scope_mut(&mut self) -> &mut Scope;
}

/// Capability: an optional reifier.
pub trait HasReifier {
    /// The reifier slot.
    fn reification(&self) -> &Reification;
    /// Mutable reifier slot.
    fn reification_mut(&mut self) -> &mut Reification;
}

/// Topic map record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMapRecord {
    /// IRI under which the map is registered in its system.
    pub locator: Locator,
    /// Reifier slot.
    pub reification: Reification,
    /// Human readable title.
    pub title: Option<String>,
    /// Base address for resolving relative references.
    pub base_address: Option<Locator>,
}

/// Topic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Types this topic is an instance of.
    pub types: BTreeSet<TopicId>,
    /// Construct this topic reifies (inverse of the reifier slots).
    pub reified: Option<ConstructRef>,
}

/// Association record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Type slot.
    pub typing: Typing,
    /// Scope slot.
    pub scope: Scope,
    /// Reifier slot.
    pub reification: Reification,
}

/// Role record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Parent association.
    pub association: AssociationId,
    /// Type slot.
    pub typing: Typing,
    /// Topic playing the role.
    pub player: TopicId,
    /// Reifier slot.
    pub reification: Reification,
}

/// Name record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Parent topic.
    pub topic: TopicId,
    /// Type slot.
    pub typing: Typing,
    /// Scope slot.
    pub scope: Scope,
    /// Reifier slot.
    pub reification: Reification,
    /// Name string.
    pub value: String,
}

/// Occurrence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Parent topic.
    pub topic: TopicId,
    /// Type slot.
    pub typing: Typing,
    /// Scope slot.
    pub scope: Scope,
    /// Reifier slot.
    pub reification: Reification,
    /// Value and datatype.
    pub literal: Literal,
}

/// Variant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Owning map.
    pub topic_map: TopicMapId,
    /// Parent name.
    pub name: NameId,
    /// Own scope; the effective scope adds the parent name's themes.
    pub scope: Scope,
    /// Reifier slot.
    pub reification: Reification,
    /// Value and datatype.
    pub literal: Literal,
}

macro_rules! impl_has_type {
    ($($record:ty),*) => {$(
        impl HasType for $record {
            fn typing(&self) -> &Typing { &self.typing }
            fn typing_mut(&mut self) -> &mut Typing { &mut self.typing }
        }
    )*};
}

macro_rules! impl_has_scope {
    ($($record:ty),*) => {$(
        impl HasScope for $record {
            fn scope(&self) -> &Scope { &self.scope }
            fn scope_mut(&mut self) -> &mut Scope { &mut self.scope }
        }
    )*};
}

macro_rules! impl_has_reifier {
    ($($record:ty),*) => {$(
        impl HasReifier for $record {
            fn reification(&self) -> &Reification { &self.reification }
            fn reification_mut(&mut self) -> &mut Reification { &mut self.reification }
        }
    )*};
}

impl_has_type!(AssociationRecord, RoleRecord, NameRecord, OccurrenceRecord);
impl_has_scope!(AssociationRecord, NameRecord, OccurrenceRecord, VariantRecord);
impl_has_reifier!(
    TopicMapRecord,
    AssociationRecord,
    RoleRecord,
    NameRecord,
    OccurrenceRecord,
    VariantRecord
);

/// A stored construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// Topic map.
    TopicMap(TopicMapRecord),
    /// Topic.
    Topic(TopicRecord),
    /// Association.
    Association(AssociationRecord),
    /// Role.
    Role(RoleRecord),
    /// Name.
    Name(NameRecord),
    /// Occurrence.
    Occurrence(OccurrenceRecord),
    /// Variant.
    Variant(VariantRecord),
}

impl Record {
    /// Kind tag of the record.
    pub fn kind(&self) -> ConstructKind {
        match self {
            Record::TopicMap(_) => ConstructKind::TopicMap,
            Record::Topic(_) => ConstructKind::Topic,
            Record::Association(_) => ConstructKind::Association,
            Record::Role(_) => ConstructKind::Role,
            Record::Name(_) => ConstructKind::Name,
            Record::Occurrence(_) => ConstructKind::Occurrence,
            Record::Variant(_) => ConstructKind::Variant,
        }
    }

    /// Owning topic map. A topic map record needs its own id for this.
    pub fn topic_map(&self, own_id: ConstructId) -> TopicMapId {
        match self {
            Record::TopicMap(_) => TopicMapId::from_id(own_id),
            Record::Topic(r) => r.topic_map,
            Record::Association(r) => r.topic_map,
            Record::Role(r) => r.topic_map,
            Record::Name(r) => r.topic_map,
            Record::Occurrence(r) => r.topic_map,
            Record::Variant(r) => r.topic_map,
        }
    }

    /// Logical parent; `None` for topic maps.
    pub fn parent(&self) -> Option<ConstructRef> {
        match self {
            Record::TopicMap(_) => None,
            Record::Topic(r) => Some(r.topic_map.into()),
            Record::Association(r) => Some(r.topic_map.into()),
            Record::Role(r) => Some(r.association.into()),
            Record::Name(r) => Some(r.topic.into()),
            Record::Occurrence(r) => Some(r.topic.into()),
            Record::Variant(r) => Some(r.name.into()),
        }
    }

    /// Point the record at a new parent of the right kind.
    ///
    /// Returns false if `parent` has the wrong kind for this record.
    pub fn set_parent(&mut self, parent: ConstructRef) -> bool {
        match (self, parent) {
            (Record::Role(r), ConstructRef::Association(a)) => r.association = a,
            (Record::Name(r), ConstructRef::Topic(t)) => r.topic = t,
            (Record::Occurrence(r), ConstructRef::Topic(t)) => r.topic = t,
            (Record::Variant(r), ConstructRef::Name(n)) => r.name = n,
            _ => return false,
        }
        true
    }

    /// Type capability, if the kind has one.
    pub fn as_typed(&self) -> Option<&dyn HasType> {
        match self {
            Record::Association(r) => Some(r),
            Record::Role(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            _ => None,
        }
    }

    /// Mutable type capability.
    pub fn as_typed_mut(&mut self) -> Option<&mut dyn HasType> {
        match self {
            Record::Association(r) => Some(r),
            Record::Role(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            _ => None,
        }
    }

    /// Scope capability, if the kind has one.
    pub fn as_scoped(&self) -> Option<&dyn HasScope> {
        match self {
            Record::Association(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            Record::Variant(r) => Some(r),
            _ => None,
        }
    }

    /// Mutable scope capability.
    pub fn as_scoped_mut(&mut self) -> Option<&mut dyn HasScope> {
        match self {
            Record::Association(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            Record::Variant(r) => Some(r),
            _ => None,
        }
    }

    /// Reifier capability; every kind except topics has one.
    pub fn as_reifiable(&self) -> Option<&dyn HasReifier> {
        match self {
            Record::TopicMap(r) => Some(r),
            Record::Topic(_) => None,
            Record::Association(r) => Some(r),
            Record::Role(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            Record::Variant(r) => Some(r),
        }
    }

    /// Mutable reifier capability.
    pub fn as_reifiable_mut(&mut self) -> Option<&mut dyn HasReifier> {
        match self {
            Record::TopicMap(r) => Some(r),
            Record::Topic(_) => None,
            Record::Association(r) => Some(r),
            Record::Role(r) => Some(r),
            Record::Name(r) => Some(r),
            Record::Occurrence(r) => Some(r),
            Record::Variant(r) => Some(r),
        }
    }

    /// Literal of occurrences and variants.
    pub fn literal(&self) -> Option<&Literal> {
        match self {
            Record::Occurrence(r) => Some(&r.literal),
            Record::Variant(r) => Some(&r.literal),
            _ => None,
        }
    }

    /// Mutable literal of occurrences and variants.
    pub fn literal_mut(&mut self) -> Option<&mut Literal> {
        match self {
            Record::Occurrence(r) => Some(&mut r.literal),
            Record::Variant(r) => Some(&mut r.literal),
            _ => None,
        }
    }

    /// Whether `topic` is referenced as a type, theme, player or topic type.
    pub fn references(&self, topic: TopicId) -> bool {
        if let Record::Topic(r) = self {
            return r.types.contains(&topic);
        }
        if let Record::Role(r) = self {
            if r.player == topic {
                return true;
            }
        }
        self.as_typed().is_some_and(|t| t.typing().get() == topic)
            || self.as_scoped().is_some_and(|s| s.scope().contains(topic))
    }

    /// Swap every reference to `from` for `to`. Returns true if anything changed.
    pub fn replace_references(&mut self, from: TopicId, to: TopicId) -> bool {
        let mut changed = false;
        match self {
            Record::Topic(r) => {
                if r.types.remove(&from) {
                    r.types.insert(to);
                    changed = true;
                }
            }
            Record::Role(r) if r.player == from => {
                r.player = to;
                changed = true;
            }
            _ => {}
        }
        if let Some(typed) = self.as_typed_mut() {
            if typed.typing().get() == from {
                typed.typing_mut().set(to);
                changed = true;
            }
        }
        if let Some(scoped) = self.as_scoped_mut() {
            changed |= scoped.scope_mut().replace(from, to);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(raw: u64) -> TopicId {
        TopicId::from_id(ConstructId::new(raw))
    }

    fn make_name() -> Record {
        Record::Name(NameRecord {
            topic_map: TopicMapId::from_id(ConstructId::new(1)),
            topic: topic(2),
            typing: Typing::new(topic(3)),
            scope: Scope::new([topic(4)]),
            reification: Reification::default(),
            value: "Name".to_string(),
        })
    }

    #[test]
    fn test_capabilities_by_kind() {
        let name = make_name();
        assert!(name.as_typed().is_some());
        assert!(name.as_scoped().is_some());
        assert!(name.as_reifiable().is_some());

        let topic_record = Record::Topic(TopicRecord {
            topic_map: TopicMapId::from_id(ConstructId::new(1)),
            types: BTreeSet::new(),
            reified: None,
        });
        assert!(topic_record.as_typed().is_none());
        assert!(topic_record.as_reifiable().is_none());
    }

    #[test]
    fn test_scope_replace() {
        let mut scope = Scope::new([topic(1), topic(2)]);
        assert!(scope.replace(topic(1), topic(2)));
        assert_eq!(scope.themes().len(), 1);
        assert!(!scope.replace(topic(9), topic(3)));
    }

    #[test]
    fn test_references() {
        let name = make_name();
        assert!(name.references(topic(3)));
        assert!(name.references(topic(4)));
        assert!(!name.references(topic(2)));
    }

    #[test]
    fn test_replace_references() {
        let mut name = make_name();
        assert!(name.replace_references(topic(3), topic(7)));
        assert!(name.replace_references(topic(4), topic(8)));
        assert!(!name.replace_references(topic(2), topic(9)));
        assert!(name.references(topic(7)));
        assert!(name.references(topic(8)));
        assert!(!name.references(topic(3)));
    }

    #[test]
    fn test_set_parent_checks_kind() {
        let mut name = make_name();
        assert!(name.set_parent(topic(9).into()));
        assert_eq!(name.parent(), Some(topic(9).into()));
        assert!(!name.set_parent(TopicMapId::from_id(ConstructId::new(1)).into()));
    }
}
