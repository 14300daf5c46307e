//! Declared members, accessors and the per-type property registry.

use super::binding::{bind, Binding, Configurable, FieldKey, TypeRef};
use super::error::PropError;
use super::record::Record;
use super::value::{ObjectRef, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Mediates get/set/delete of one named field on records.
///
/// The default methods implement the plain property contract against the
/// record's private slot: get fails while unset, set overwrites, delete
/// clears. Every operation fails with [`PropError::NotConfigured`] until the
/// accessor has been bound to a type.
pub trait Accessor: fmt::Debug + Send + Sync {
    /// The accessor's write-once binding to a field name and owning type.
    fn binding(&self) -> &Binding;

    fn name(&self) -> Result<&str, PropError> {
        self.binding().name()
    }

    fn owner(&self) -> Result<&TypeRef, PropError> {
        self.binding().owner()
    }

    /// Read the field from `record`.
    fn get(&self, record: &Record) -> Result<Value, PropError> {
        let key = self.binding().key()?;
        record.slot(key).cloned().ok_or_else(|| key.unset())
    }

    /// Write `value` into `record`.
    fn set(&self, record: &mut Record, value: Value) -> Result<(), PropError> {
        let key = self.binding().key()?;
        record.store(key.clone(), value);
        Ok(())
    }

    /// Clear the field; fails with [`PropError::Unset`] if it holds nothing.
    fn delete(&self, record: &mut Record) -> Result<(), PropError> {
        let key = self.binding().key()?;
        record.clear(key).map(drop).ok_or_else(|| key.unset())
    }
}

impl FieldKey {
    pub(crate) fn unset(&self) -> PropError {
        PropError::Unset {
            name: self.name().to_string(),
            owner: self.owner().name().to_string(),
        }
    }

    pub(crate) fn read_only(&self) -> PropError {
        PropError::ReadOnly {
            name: self.name().to_string(),
            owner: self.owner().name().to_string(),
        }
    }
}

/// A value declared at type level.
#[derive(Clone, Debug)]
pub enum Member {
    /// A field accessor; bound to the declaring type on finalization.
    Field(Arc<dyn Accessor>),
    /// Any other value. Objects with a bind hook are bound as well.
    Value(Value),
}

impl Member {
    /// Wrap an accessor as a field member.
    pub fn field<A: Accessor + 'static>(accessor: A) -> Self {
        Self::Field(Arc::new(accessor))
    }

    /// Wrap any value as a constant member.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    /// The registration hook this member exposes, if any.
    pub fn bind_hook(&self) -> Option<&dyn Configurable> {
        match self {
            Self::Field(accessor) => Some(accessor.binding()),
            Self::Value(Value::Object(object)) => object.bind_hook(),
            Self::Value(_) => None,
        }
    }

    /// The accessor of a field member.
    pub fn as_field(&self) -> Option<&Arc<dyn Accessor>> {
        match self {
            Self::Field(accessor) => Some(accessor),
            Self::Value(_) => None,
        }
    }

    /// The object held by a constant member, if it is one.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Value(value) => value.as_object(),
            Self::Field(_) => None,
        }
    }
}

/// Type-finalization hooks.
///
/// Both steps are optional overrides: the whole-type step defaults to
/// running the per-member step over every member, and the per-member step
/// defaults to [`bind`].
pub trait Configure {
    /// Configure every member of `owner`, in declaration order.
    fn configure_all(
        &mut self,
        owner: &TypeRef,
        members: &IndexMap<String, Member>,
    ) -> Result<(), PropError> {
        for (name, member) in members {
            self.configure_member(owner, name, member)?;
        }
        Ok(())
    }

    /// Configure one member. Returns whether it was bound.
    fn configure_member(
        &mut self,
        owner: &TypeRef,
        name: &str,
        member: &Member,
    ) -> Result<bool, PropError> {
        bind(owner, name, member)
    }
}

/// Configuration with no overrides: members are bound and nothing is
/// remembered.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl Configure for Plain {}

/// Run the whole-type configuration step for `owner`.
pub fn configure_all<C>(
    owner: &TypeRef,
    members: &IndexMap<String, Member>,
    hooks: &mut C,
) -> Result<(), PropError>
where
    C: Configure + ?Sized,
{
    hooks.configure_all(owner, members)
}

/// Per-type table of field name to accessor.
///
/// A subtype's registry starts as a copy of its parent's; the subtype's own
/// bound fields are then overlaid, replacing inherited entries of the same
/// name.
#[derive(Clone, Debug, Default)]
pub struct PropertyRegistry {
    fields: IndexMap<String, Arc<dyn Accessor>>,
}

impl PropertyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a copy of `parent`.
    pub fn inherit(parent: &PropertyRegistry) -> Self {
        parent.clone()
    }

    /// Accessor for the field `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Accessor>> {
        self.fields.get(name)
    }

    /// Whether a field called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in order: inherited first, then new ones.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field names with their accessors, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Accessor>)> {
        self.fields.iter().map(|(name, accessor)| (name.as_str(), accessor))
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PropertyRegistry {
    /// Apply one declared member on top of the inherited table.
    ///
    /// Fields bound to `owner` are recorded; any other member under `name`
    /// shadows whatever was inherited.
    pub(crate) fn overlay(&mut self, owner: &TypeRef, name: &str, member: &Member) {
        match member {
            Member::Field(accessor) if accessor.owner().is_ok_and(|bound| bound == owner) => {
                self.fields.insert(name.to_string(), Arc::clone(accessor));
            }
            _ => {
                self.fields.shift_remove(name);
            }
        }
    }
}

impl Configure for PropertyRegistry {
    fn configure_member(
        &mut self,
        owner: &TypeRef,
        name: &str,
        member: &Member,
    ) -> Result<bool, PropError> {
        let bound = bind(owner, name, member)?;
        self.overlay(owner, name, member);
        Ok(bound)
    }
}
