//! Roles, variants and the capability accessors shared by statements.

use crate::error::{ModelError, Result};
use crate::signature::effective_scope;
use crate::store::{ConstructStore, StoreExt};
use crate::system::TopicMapSystem;
use crate::types::{
    AssociationId, Construct, ConstructRef, DatatypeAware, Literal, NameId, Record, Reifiable,
    Reification, RoleId, RoleRecord, Scope, Scoped, TopicId, Typed, Typing, VariantId,
    VariantRecord,
};

impl<S: ConstructStore> TopicMapSystem<S> {
    /// Add a role to `association`.
    pub fn create_role(
        &mut self,
        association: AssociationId,
        role_type: TopicId,
        player: TopicId,
    ) -> Result<RoleId> {
        let topic_map = self.store.association(association)?.topic_map;
        self.check_same_map(association.into(), topic_map, role_type, "type")?;
        self.check_same_map(association.into(), topic_map, player, "player")?;
        let id = self.insert_record(Record::Role(RoleRecord {
            topic_map,
            association,
            typing: Typing::new(role_type),
            player,
            reification: Reification::default(),
        }));
        Ok(RoleId::from_id(id))
    }

    /// Roles of `association`, optionally only those of `role_type`.
    pub fn get_roles(&self, association: AssociationId, role_type: Option<TopicId>) -> Result<Vec<RoleId>> {
        self.store.association(association)?;
        let mut roles = self.store.children_of::<RoleId>(association.id());
        if let Some(ty) = role_type {
            roles.retain(|role| self.store.role(*role).is_ok_and(|r| r.typing.get() == ty));
        }
        Ok(roles)
    }

    /// Distinct role types of `association`, in id order.
    pub fn get_role_types(&self, association: AssociationId) -> Result<Vec<TopicId>> {
        let mut types = Vec::new();
        for role in self.get_roles(association, None)? {
            types.push(self.store.role(role)?.typing.get());
        }
        types.sort();
        types.dedup();
        Ok(types)
    }

    /// Topic playing `role`.
    pub fn get_player(&self, role: RoleId) -> Result<TopicId> {
        Ok(self.store.role(role)?.player)
    }

    /// Replace the player of `role`.
    pub fn set_player(&mut self, role: RoleId, player: TopicId) -> Result<()> {
        let topic_map = self.store.role(role)?.topic_map;
        self.check_same_map(role.into(), topic_map, player, "player")?;
        self.store.role_mut(role)?.player = player;
        Ok(())
    }

    /// String value of a name.
    pub fn get_value(&self, name: NameId) -> Result<String> {
        Ok(self.store.name(name)?.value.clone())
    }

    /// Replace the string value of a name.
    pub fn set_value(&mut self, name: NameId, value: impl Into<String>) -> Result<()> {
        self.store.name_mut(name)?.value = value.into();
        Ok(())
    }

    /// Add a variant to `name`.
    ///
    /// `scope` must add at least one theme to the name's own scope.
    pub fn create_variant(
        &mut self,
        name: NameId,
        value: impl Into<Literal>,
        scope: &[TopicId],
    ) -> Result<VariantId> {
        let topic_map = self.store.name(name)?.topic_map;
        self.check_themes(name.into(), topic_map, scope)?;
        self.check_variant_scope(name, scope)?;
        let id = self.insert_record(Record::Variant(VariantRecord {
            topic_map,
            name,
            scope: Scope::new(scope.iter().copied()),
            reification: Reification::default(),
            literal: value.into(),
        }));
        Ok(VariantId::from_id(id))
    }

    /// Variants of `name`.
    pub fn get_variants(&self, name: NameId) -> Result<Vec<VariantId>> {
        self.store.name(name)?;
        Ok(self.store.children_of(name.id()))
    }

    /// Value and datatype of an occurrence or variant.
    pub fn get_literal<C: DatatypeAware>(&self, construct: C) -> Result<Literal> {
        self.store
            .checked(construct)?
            .literal()
            .cloned()
            .ok_or(ModelError::NotFound(construct.id()))
    }

    /// Replace value and datatype of an occurrence or variant.
    pub fn set_literal<C: DatatypeAware>(&mut self, construct: C, value: impl Into<Literal>) -> Result<()> {
        self.store.checked(construct)?;
        let slot = self
            .store
            .record_mut(construct.id())?
            .literal_mut()
            .ok_or(ModelError::NotFound(construct.id()))?;
        *slot = value.into();
        Ok(())
    }

    /// Type of a typed construct.
    pub fn get_type<C: Typed>(&self, construct: C) -> Result<TopicId> {
        self.store
            .checked(construct)?
            .as_typed()
            .map(|t| t.typing().get())
            .ok_or(ModelError::NotFound(construct.id()))
    }

    /// Replace the type of a typed construct.
    pub fn set_type<C: Typed>(&mut self, construct: C, ty: TopicId) -> Result<()> {
        let topic_map = self.store.owner_map(construct)?;
        self.check_same_map(construct.into(), topic_map, ty, "type")?;
        self.store
            .record_mut(construct.id())?
            .as_typed_mut()
            .ok_or(ModelError::NotFound(construct.id()))?
            .typing_mut()
            .set(ty);
        Ok(())
    }

    /// Scope of a scoped construct, in id order.
    ///
    /// For variants this is the effective scope: own themes plus the
    /// parent name's themes.
    pub fn get_scope<C: Scoped>(&self, construct: C) -> Result<Vec<TopicId>> {
        let target: ConstructRef = construct.into();
        if let Some(variant) = target.downcast::<VariantId>() {
            return Ok(effective_scope(&self.store, variant)?.into_iter().collect());
        }
        self.store
            .checked(construct)?
            .as_scoped()
            .map(|s| s.scope().themes().iter().copied().collect())
            .ok_or(ModelError::NotFound(construct.id()))
    }

    /// Add a theme to a scoped construct.
    ///
    /// A name refuses a theme that some variant has as its only own theme.
    pub fn add_theme<C: Scoped>(&mut self, construct: C, theme: TopicId) -> Result<()> {
        let topic_map = self.store.owner_map(construct)?;
        self.check_same_map(construct.into(), topic_map, theme, "theme")?;
        let target: ConstructRef = construct.into();
        if let Some(name) = target.downcast::<NameId>() {
            self.check_name_theme(name, theme)?;
        }
        self.scope_mut(construct)?.insert(theme);
        Ok(())
    }

    /// Remove a theme from a scoped construct. Absent themes are ignored.
    ///
    /// A variant keeps at least one theme its name does not have.
    pub fn remove_theme<C: Scoped>(&mut self, construct: C, theme: TopicId) -> Result<()> {
        let target: ConstructRef = construct.into();
        if let Some(variant) = target.downcast::<VariantId>() {
            let record = self.store.variant(variant)?;
            let remaining: Vec<TopicId> = record
                .scope
                .themes()
                .iter()
                .copied()
                .filter(|t| *t != theme)
                .collect();
            self.check_variant_scope(record.name, &remaining)
                .map_err(|_| ModelError::constraint(variant, "removing the theme would leave the variant without own themes"))?;
        }
        self.scope_mut(construct)?.remove(theme);
        Ok(())
    }

    fn scope_mut<C: Scoped>(&mut self, construct: C) -> Result<&mut Scope> {
        Ok(self
            .store
            .record_mut(construct.id())?
            .as_scoped_mut()
            .ok_or(ModelError::NotFound(construct.id()))?
            .scope_mut())
    }

    /// Reifier of a reifiable construct.
    pub fn get_reifier<C: Reifiable>(&self, construct: C) -> Result<Option<TopicId>> {
        self.store.checked(construct)?;
        self.reifier_of(construct.into())
    }

    /// Set or clear the reifier of a construct.
    ///
    /// A topic that already reifies another construct is rejected.
    pub fn set_reifier<C: Reifiable>(&mut self, construct: C, reifier: Option<TopicId>) -> Result<()> {
        let topic_map = self.store.owner_map(construct)?;
        let target: ConstructRef = construct.into();
        if self.reifier_of(target)? == reifier {
            return Ok(());
        }
        if let Some(topic) = reifier {
            self.check_reifier(target, topic_map, topic)?;
        }
        self.attach_reifier(target, reifier)
    }
}
