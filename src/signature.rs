//! Structural signatures of statements.
//!
//! A signature captures what a statement *says* and nothing about which
//! construct says it: item identifiers, reifiers and the construct id are
//! ignored. Two statements with the same parent and equal signatures are
//! duplicates and get collapsed into one.
//!
//! | Statement | Signature |
//! |---|---|
//! | Association | (type, scope, roles) |
//! | Role | (type, player) |
//! | Name | (type, scope, data) |
//! | Occurrence | (type, scope, data) |
//! | Variant | (effective scope, data) |
//!
//! Topics sign as their own id. Scopes and role sets are ordered sets, so
//! insertion order never matters.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::canonical::value_hash;
use crate::error::Result;
use crate::store::{ConstructStore, StoreExt};
use crate::types::{
    AssociationId, Construct, HasScope, HasType, Literal, NameId, OccurrenceId, RoleId, TopicId, VariantId,
};

/// Order-independent set of theme signatures.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeSignature(BTreeSet<TopicId>);

impl ScopeSignature {
    /// Sign a set of themes.
    pub fn new(themes: impl IntoIterator<Item = TopicId>) -> Self {
        Self(themes.into_iter().collect())
    }

    /// The themes.
    pub fn themes(&self) -> &BTreeSet<TopicId> {
        &self.0
    }
}

/// Hash pair of a value and its datatype. Names carry no datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DataSignature {
    datatype: Option<u64>,
    value: u64,
}

impl DataSignature {
    /// Sign a name value.
    pub fn name(value: &str) -> Self {
        Self { datatype: None, value: value_hash(value) }
    }

    /// Sign an occurrence or variant literal.
    pub fn literal(literal: &Literal) -> Self {
        Self {
            datatype: Some(value_hash(literal.datatype().to_external_form())),
            value: value_hash(literal.value()),
        }
    }
}

/// (type, player) of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoleSignature {
    /// Role type.
    pub role_type: TopicId,
    /// Role player.
    pub player: TopicId,
}

/// Role set of an association.
///
/// An association without roles signs as `Empty`, never as an empty set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RolesSignature {
    /// No roles at all.
    Empty,
    /// Distinct (type, player) pairs.
    Roles(BTreeSet<RoleSignature>),
}

impl RolesSignature {
    /// Sign a role collection.
    pub fn new(roles: impl IntoIterator<Item = RoleSignature>) -> Self {
        let roles: BTreeSet<_> = roles.into_iter().collect();
        if roles.is_empty() {
            Self::Empty
        } else {
            Self::Roles(roles)
        }
    }
}

/// Signature of an association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssociationSignature {
    /// Association type.
    pub association_type: TopicId,
    /// Scope.
    pub scope: ScopeSignature,
    /// Roles.
    pub roles: RolesSignature,
}

/// Signature of a name. Parent topic and variants are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NameSignature {
    /// Name type.
    pub name_type: TopicId,
    /// Scope.
    pub scope: ScopeSignature,
    /// Value.
    pub data: DataSignature,
}

/// Signature of an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OccurrenceSignature {
    /// Occurrence type.
    pub occurrence_type: TopicId,
    /// Scope.
    pub scope: ScopeSignature,
    /// Value and datatype.
    pub data: DataSignature,
}

/// Signature of a variant, over its effective scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VariantSignature {
    /// Own themes plus the parent name's themes.
    pub scope: ScopeSignature,
    /// Value and datatype.
    pub data: DataSignature,
}

/// Signature of a topic: its id.
pub fn topic_signature(topic: TopicId) -> TopicId {
    topic
}

/// Signature of the type of a typed record.
pub fn type_signature(typed: &dyn HasType) -> TopicId {
    topic_signature(typed.typing().get())
}

/// Signature of the scope of a scoped record.
pub fn scope_signature(scoped: &dyn HasScope) -> ScopeSignature {
    ScopeSignature::new(scoped.scope().themes().iter().copied().map(topic_signature))
}

/// Signature of a role.
pub fn role_signature<S: ConstructStore + ?Sized>(store: &S, role: RoleId) -> Result<RoleSignature> {
    let record = store.role(role)?;
    Ok(RoleSignature {
        role_type: type_signature(record),
        player: topic_signature(record.player),
    })
}

/// Signature of an association, including its roles.
pub fn association_signature<S: ConstructStore + ?Sized>(
    store: &S,
    association: AssociationId,
) -> Result<AssociationSignature> {
    let record = store.association(association)?;
    let roles = store
        .children_of::<RoleId>(association.id())
        .into_iter()
        .map(|role| role_signature(store, role))
        .collect::<Result<Vec<_>>>()?;
    Ok(AssociationSignature {
        association_type: type_signature(record),
        scope: scope_signature(record),
        roles: RolesSignature::new(roles),
    })
}

/// Signature of a name.
pub fn name_signature<S: ConstructStore + ?Sized>(store: &S, name: NameId) -> Result<NameSignature> {
    let record = store.name(name)?;
    Ok(NameSignature {
        name_type: type_signature(record),
        scope: scope_signature(record),
        data: DataSignature::name(&record.value),
    })
}

/// Signature of an occurrence.
pub fn occurrence_signature<S: ConstructStore + ?Sized>(
    store: &S,
    occurrence: OccurrenceId,
) -> Result<OccurrenceSignature> {
    let record = store.occurrence(occurrence)?;
    Ok(OccurrenceSignature {
        occurrence_type: type_signature(record),
        scope: scope_signature(record),
        data: DataSignature::literal(&record.literal),
    })
}

/// Own themes of a variant plus those of its parent name.
pub fn effective_scope<S: ConstructStore + ?Sized>(
    store: &S,
    variant: VariantId,
) -> Result<BTreeSet<TopicId>> {
    let record = store.variant(variant)?;
    let parent = store.name(record.name)?;
    Ok(record
        .scope
        .themes()
        .union(parent.scope.themes())
        .copied()
        .collect())
}

/// Signature of a variant.
pub fn variant_signature<S: ConstructStore + ?Sized>(
    store: &S,
    variant: VariantId,
) -> Result<VariantSignature> {
    let record = store.variant(variant)?;
    Ok(VariantSignature {
        scope: ScopeSignature::new(effective_scope(store, variant)?),
        data: DataSignature::literal(&record.literal),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{xsd, ConstructId};

    fn topic(raw: u64) -> TopicId {
        TopicId::from_id(ConstructId::new(raw))
    }

    #[test]
    fn test_scope_order_is_irrelevant() {
        assert_eq!(
            ScopeSignature::new([topic(1), topic(2)]),
            ScopeSignature::new([topic(2), topic(1), topic(2)])
        );
    }

    #[test]
    fn test_empty_roles_sign_as_empty() {
        assert_eq!(RolesSignature::new(Vec::new()), RolesSignature::Empty);
        let one = RoleSignature { role_type: topic(1), player: topic(2) };
        assert_ne!(RolesSignature::new([one]), RolesSignature::Empty);
    }

    #[test]
    fn test_data_signature_includes_datatype() {
        let as_string = DataSignature::literal(&Literal::string("42"));
        let as_int = DataSignature::literal(&Literal::new("42", xsd::int()));
        assert_ne!(as_string, as_int);
        assert_ne!(DataSignature::name("42"), as_string);
    }
}
