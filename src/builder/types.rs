//! Builder for record types.

use crate::core::{
    configure_all, Accessor, Configure, Member, PropError, PropertyRegistry, TypeDef, TypeRef,
    Value,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Declares the members of a record type and finalizes it.
///
/// Finalizing binds every member that has a bind hook to `(type, name)` and
/// builds the type's property registry from its parent's.
///
/// # Example
///
/// ```rust
/// use propstate::builder::TypeBuilder;
/// use propstate::props::Property;
///
/// let base = TypeBuilder::new("Base")
///     .field("a", Property::new())
///     .field("b", Property::new())
///     .build()
///     .unwrap();
///
/// let sub = TypeBuilder::new("Sub")
///     .extends(&base)
///     .field("b", Property::read_only())
///     .field("c", Property::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(sub.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
/// assert_eq!(sub.field("b").unwrap().owner().unwrap(), sub.handle());
/// assert_eq!(sub.field("a").unwrap().owner().unwrap(), base.handle());
/// ```
#[derive(Debug)]
pub struct TypeBuilder {
    name: String,
    parent: Option<Arc<TypeDef>>,
    members: IndexMap<String, Member>,
}

impl TypeBuilder {
    /// Create a new builder for a type called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            members: IndexMap::new(),
        }
    }

    /// Inherit fields and constants from `parent`.
    pub fn extends(mut self, parent: &Arc<TypeDef>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare a field. Redeclaring a name replaces the earlier member.
    pub fn field<A: Accessor + 'static>(self, name: &str, accessor: A) -> Self {
        self.member(name, Member::field(accessor))
    }

    /// Declare a field whose accessor is also held elsewhere.
    pub fn shared_field(self, name: &str, accessor: Arc<dyn Accessor>) -> Self {
        self.member(name, Member::Field(accessor))
    }

    /// Declare a type-level constant.
    pub fn constant(self, name: &str, value: impl Into<Value>) -> Self {
        self.member(name, Member::Value(value.into()))
    }

    /// Declare any member; redeclaring a name replaces the earlier one.
    pub fn member(mut self, name: &str, member: Member) -> Self {
        self.members.insert(name.to_string(), member);
        self
    }

    /// Name the type will be finalized under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members declared so far, in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Whether a member called `name` has been declared.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Finalize with the default configuration step.
    pub fn build(self) -> Result<Arc<TypeDef>, PropError> {
        let handle = TypeRef::new(&self.name);
        let mut registry = self.inherited_registry();
        configure_all(&handle, &self.members, &mut registry)?;
        Ok(self.finish(handle, registry))
    }

    /// Finalize with custom configuration hooks.
    ///
    /// `hooks` decides what gets bound; the registry then records every
    /// field that ended up bound to the new type.
    pub fn build_with<C>(self, hooks: &mut C) -> Result<Arc<TypeDef>, PropError>
    where
        C: Configure + ?Sized,
    {
        let handle = TypeRef::new(&self.name);
        configure_all(&handle, &self.members, hooks)?;
        let mut registry = self.inherited_registry();
        for (name, member) in &self.members {
            registry.overlay(&handle, name, member);
        }
        Ok(self.finish(handle, registry))
    }

    fn inherited_registry(&self) -> PropertyRegistry {
        self.parent
            .as_ref()
            .map(|parent| PropertyRegistry::inherit(parent.registry()))
            .unwrap_or_default()
    }

    fn finish(self, handle: TypeRef, registry: PropertyRegistry) -> Arc<TypeDef> {
        tracing::debug!(
            type_name = %handle,
            parent = ?self.parent.as_ref().map(|parent| parent.name()),
            fields = registry.len(),
            "finalized type"
        );
        TypeDef::assemble(handle, self.parent, self.members, registry)
    }
}
