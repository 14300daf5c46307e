//! One-time name/owner binding.
//!
//! When a type is finalized every declared member is offered the chance to
//! learn its field name and owning type. A [`Binding`] records that pair and
//! refuses to be bound a second time.

use super::error::PropError;
use super::registry::Member;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Identity of a finalized type.
///
/// Two types with the same name are still distinct: identity is carried by
/// the uuid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    id: Uuid,
    name: String,
}

impl TypeRef {
    /// A fresh identity for a type called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    /// Unique identity of the type.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Declared type name; not unique.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Address of a field's per-instance storage slot.
///
/// Derived from the owning type and field name, so same-named fields on
/// unrelated types never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldKey {
    owner: TypeRef,
    name: String,
}

impl FieldKey {
    /// Type that declared the field.
    pub fn owner(&self) -> &TypeRef {
        &self.owner
    }

    /// Field name within the owning type.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// The bind hook: anything that wants to learn where it was declared.
pub trait Configurable {
    /// Record `(owner, name)`. Fails if already configured.
    fn configure(&self, owner: &TypeRef, name: &str) -> Result<(), PropError>;
}

/// Write-once `(owner, name)` cell shared by properties and states.
#[derive(Debug, Default)]
pub struct Binding {
    key: OnceLock<FieldKey>,
}

impl Binding {
    /// An unbound cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `(owner, name)` has been recorded.
    pub fn is_bound(&self) -> bool {
        self.key.get().is_some()
    }

    /// Slot address, or [`PropError::NotConfigured`] before binding.
    pub fn key(&self) -> Result<&FieldKey, PropError> {
        self.key.get().ok_or(PropError::NotConfigured)
    }

    /// Bound field name.
    pub fn name(&self) -> Result<&str, PropError> {
        self.key().map(FieldKey::name)
    }

    /// Bound owning type.
    pub fn owner(&self) -> Result<&TypeRef, PropError> {
        self.key().map(FieldKey::owner)
    }

    fn already_configured(existing: &FieldKey) -> PropError {
        PropError::AlreadyConfigured {
            name: existing.name.clone(),
            owner: existing.owner.name().to_string(),
        }
    }
}

impl Configurable for Binding {
    fn configure(&self, owner: &TypeRef, name: &str) -> Result<(), PropError> {
        if let Some(existing) = self.key.get() {
            return Err(Self::already_configured(existing));
        }
        let key = FieldKey {
            owner: owner.clone(),
            name: name.to_string(),
        };
        self.key.set(key).map_err(|_| match self.key.get() {
            Some(existing) => Self::already_configured(existing),
            None => PropError::NotConfigured,
        })?;
        tracing::trace!(owner = %owner, field = name, "bound field");
        Ok(())
    }
}

/// Field names must be non-empty identifiers.
fn validate_name(name: &str) -> Result<(), PropError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PropError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Offer `member` the chance to bind to `(owner, name)`.
///
/// The name is validated before the member is probed. Returns whether the
/// member had a bind hook and was bound.
pub fn bind(owner: &TypeRef, name: &str, member: &Member) -> Result<bool, PropError> {
    validate_name(name)?;
    match member.bind_hook() {
        Some(hook) => {
            hook.configure(owner, name)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;

    #[test]
    fn binding_starts_unconfigured() {
        let binding = Binding::new();
        assert!(!binding.is_bound());
        assert_eq!(binding.name(), Err(PropError::NotConfigured));
        assert_eq!(binding.owner(), Err(PropError::NotConfigured));
    }

    #[test]
    fn binding_records_owner_and_name() {
        let owner = TypeRef::new("Owner");
        let binding = Binding::new();
        binding.configure(&owner, "prop1").unwrap();

        assert_eq!(binding.name().unwrap(), "prop1");
        assert_eq!(binding.owner().unwrap(), &owner);
        assert_eq!(binding.key().unwrap().to_string(), "Owner.prop1");
    }

    #[test]
    fn second_binding_fails_and_keeps_first() {
        let owner = TypeRef::new("Owner");
        let binding = Binding::new();
        binding.configure(&owner, "prop1").unwrap();

        let err = binding.configure(&TypeRef::new("Other"), "prop2").unwrap_err();
        assert_eq!(
            err,
            PropError::AlreadyConfigured {
                name: "prop1".to_string(),
                owner: "Owner".to_string(),
            }
        );
        assert_eq!(binding.name().unwrap(), "prop1");
    }

    #[test]
    fn same_named_types_have_distinct_keys() {
        let a = TypeRef::new("Same");
        let b = TypeRef::new("Same");
        let first = Binding::new();
        let second = Binding::new();
        first.configure(&a, "x").unwrap();
        second.configure(&b, "x").unwrap();

        assert_ne!(first.key().unwrap(), second.key().unwrap());
    }

    #[test]
    fn type_refs_serialize_with_name_and_id() {
        let owner = TypeRef::new("Owner");
        let json = serde_json::to_value(&owner).unwrap();

        assert_eq!(json["name"], "Owner");
        assert_eq!(json["id"], owner.id().to_string());
    }

    #[test]
    fn plain_values_are_not_bound() {
        let owner = TypeRef::new("Owner");
        for value in [
            Value::Int(1),
            Value::Null,
            Value::List(vec![]),
            Value::from("str"),
        ] {
            assert!(!bind(&owner, "a", &Member::Value(value)).unwrap());
        }
    }

    #[test]
    fn names_are_validated_before_probing() {
        let owner = TypeRef::new("Owner");
        let member = Member::Value(Value::Int(1));

        for bad in ["", "1abc", "has space", "dash-ed"] {
            let err = bind(&owner, bad, &member).unwrap_err();
            assert_eq!(err.kind(), crate::core::ErrorKind::Configuration, "{bad:?}");
        }
        assert!(bind(&owner, "_private", &member).is_ok());
    }
}
