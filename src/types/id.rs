//! Construct identifiers and typed handles.
//!
//! Every construct is addressed by a [`ConstructId`], allocated once and
//! never reused. The typed handles ([`TopicId`], [`NameId`], ...) wrap the
//! same id and let the compiler reject, say, a role where a topic is needed.
//! [`ConstructRef`] is the tagged form used wherever the kind is only known
//! at runtime (identity lookups, reified constructs, error reporters).

use serde::{Deserialize, Serialize};
use std::fmt;

/// System-wide identifier of a construct.
///
/// Ids are allocated monotonically by the store and never reused after the
/// construct has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstructId(u64);

impl ConstructId {
    /// Create a ConstructId from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parse a ConstructId from its decimal string form.
    pub fn from_str(s: &str) -> Result<Self, std::num::ParseIntError> {
        Ok(Self(s.parse()?))
    }
}

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The seven kinds of topic map constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstructKind {
    /// Root container.
    TopicMap,
    /// Subject proxy.
    Topic,
    /// Typed relationship between topics.
    Association,
    /// Participation of a topic in an association.
    Role,
    /// Topic name.
    Name,
    /// Topic occurrence.
    Occurrence,
    /// Alternative form of a name.
    Variant,
}

impl ConstructKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstructKind::TopicMap => "topic_map",
            ConstructKind::Topic => "topic",
            ConstructKind::Association => "association",
            ConstructKind::Role => "role",
            ConstructKind::Name => "name",
            ConstructKind::Occurrence => "occurrence",
            ConstructKind::Variant => "variant",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three identity namespaces of a topic map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdentityKind {
    /// Identifies the construct itself; allowed on every construct.
    ItemIdentifier,
    /// Identifies the subject indirectly; topics only.
    SubjectIdentifier,
    /// Identifies a subject that is an information resource; topics only.
    SubjectLocator,
}

impl IdentityKind {
    /// All kinds, in the order a topic merge moves them.
    pub const ALL: [IdentityKind; 3] = [
        IdentityKind::SubjectIdentifier,
        IdentityKind::SubjectLocator,
        IdentityKind::ItemIdentifier,
    ];

    /// The namespace whose collisions also signal "same subject" for topics.
    ///
    /// Item identifiers and subject identifiers cross-check each other;
    /// subject locators only collide with subject locators.
    pub fn counterpart(&self) -> Option<IdentityKind> {
        match self {
            IdentityKind::ItemIdentifier => Some(IdentityKind::SubjectIdentifier),
            IdentityKind::SubjectIdentifier => Some(IdentityKind::ItemIdentifier),
            IdentityKind::SubjectLocator => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::ItemIdentifier => "item_identifier",
            IdentityKind::SubjectIdentifier => "subject_identifier",
            IdentityKind::SubjectLocator => "subject_locator",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behaviour of the typed construct handles.
pub trait Construct: Copy + Eq + Ord + fmt::Debug + Into<ConstructRef> {
    /// Kind of construct this handle addresses.
    const KIND: ConstructKind;

    /// The underlying construct id.
    fn id(self) -> ConstructId;

    /// Wrap a raw id. The kind is checked when the handle is used.
    fn from_id(id: ConstructId) -> Self;
}

/// Constructs with exactly one type topic.
pub trait Typed: Construct {}

/// Constructs with a (possibly empty) set of themes.
pub trait Scoped: Construct {}

/// Constructs that can be reified by a topic.
pub trait Reifiable: Construct {}

/// Constructs carrying a (value, datatype) literal.
pub trait DatatypeAware: Reifiable + Scoped {}

macro_rules! construct_handle {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(ConstructId);

        impl Construct for $name {
            const KIND: ConstructKind = ConstructKind::$kind;

            fn id(self) -> ConstructId {
                self.0
            }

            fn from_id(id: ConstructId) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ConstructRef {
            fn from(handle: $name) -> Self {
                ConstructRef::$kind(handle)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", ConstructKind::$kind, self.0)
            }
        }
    };
}

construct_handle!(
    /// Handle to a topic map.
    TopicMapId => TopicMap
);
construct_handle!(
    /// Handle to a topic.
    TopicId => Topic
);
construct_handle!(
    /// Handle to an association.
    AssociationId => Association
);
construct_handle!(
    /// Handle to an association role.
    RoleId => Role
);
construct_handle!(
    /// Handle to a topic name.
    NameId => Name
);
construct_handle!(
    /// Handle to an occurrence.
    OccurrenceId => Occurrence
);
construct_handle!(
    /// Handle to a variant name.
    VariantId => Variant
);

impl Reifiable for TopicMapId {}
impl Typed for AssociationId {}
impl Scoped for AssociationId {}
impl Reifiable for AssociationId {}
impl Typed for RoleId {}
impl Reifiable for RoleId {}
impl Typed for NameId {}
impl Scoped for NameId {}
impl Reifiable for NameId {}
impl Typed for OccurrenceId {}
impl Scoped for OccurrenceId {}
impl Reifiable for OccurrenceId {}
impl DatatypeAware for OccurrenceId {}
impl Scoped for VariantId {}
impl Reifiable for VariantId {}
impl DatatypeAware for VariantId {}

/// A construct handle whose kind is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstructRef {
    /// A topic map.
    TopicMap(TopicMapId),
    /// A topic.
    Topic(TopicId),
    /// An association.
    Association(AssociationId),
    /// A role.
    Role(RoleId),
    /// A name.
    Name(NameId),
    /// An occurrence.
    Occurrence(OccurrenceId),
    /// A variant.
    Variant(VariantId),
}

impl ConstructRef {
    /// Build a reference from its two parts.
    pub fn new(kind: ConstructKind, id: ConstructId) -> Self {
        match kind {
            ConstructKind::TopicMap => ConstructRef::TopicMap(TopicMapId::from_id(id)),
            ConstructKind::Topic => ConstructRef::Topic(TopicId::from_id(id)),
            ConstructKind::Association => ConstructRef::Association(AssociationId::from_id(id)),
            ConstructKind::Role => ConstructRef::Role(RoleId::from_id(id)),
            ConstructKind::Name => ConstructRef::Name(NameId::from_id(id)),
            ConstructKind::Occurrence => ConstructRef::Occurrence(OccurrenceId::from_id(id)),
            ConstructKind::Variant => ConstructRef::Variant(VariantId::from_id(id)),
        }
    }

    /// The underlying construct id.
    pub fn id(&self) -> ConstructId {
        match self {
            ConstructRef::TopicMap(h) => h.id(),
            ConstructRef::Topic(h) => h.id(),
            ConstructRef::Association(h) => h.id(),
            ConstructRef::Role(h) => h.id(),
            ConstructRef::Name(h) => h.id(),
            ConstructRef::Occurrence(h) => h.id(),
            ConstructRef::Variant(h) => h.id(),
        }
    }

    /// The kind tag.
    pub fn kind(&self) -> ConstructKind {
        match self {
            ConstructRef::TopicMap(_) => ConstructKind::TopicMap,
            ConstructRef::Topic(_) => ConstructKind::Topic,
            ConstructRef::Association(_) => ConstructKind::Association,
            ConstructRef::Role(_) => ConstructKind::Role,
            ConstructRef::Name(_) => ConstructKind::Name,
            ConstructRef::Occurrence(_) => ConstructKind::Occurrence,
            ConstructRef::Variant(_) => ConstructKind::Variant,
        }
    }

    /// Narrow to a typed handle if the kind matches.
    pub fn downcast<C: Construct>(self) -> Option<C> {
        (self.kind() == C::KIND).then(|| C::from_id(self.id()))
    }

    /// Shorthand for `downcast::<TopicId>()`.
    pub fn as_topic(self) -> Option<TopicId> {
        self.downcast()
    }
}

impl fmt::Display for ConstructRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.id())
    }
}
