//! Finalized types and their instances.

use super::binding::{FieldKey, TypeRef};
use super::error::PropError;
use super::registry::{Accessor, Member, PropertyRegistry};
use super::value::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A finalized record type.
///
/// Produced by [`TypeBuilder::build`](crate::builder::TypeBuilder::build);
/// every declared member has already been offered its binding.
#[derive(Debug)]
pub struct TypeDef {
    handle: TypeRef,
    parent: Option<Arc<TypeDef>>,
    members: IndexMap<String, Member>,
    registry: PropertyRegistry,
}

impl TypeDef {
    pub(crate) fn assemble(
        handle: TypeRef,
        parent: Option<Arc<TypeDef>>,
        members: IndexMap<String, Member>,
        registry: PropertyRegistry,
    ) -> Arc<Self> {
        Arc::new(Self {
            handle,
            parent,
            members,
            registry,
        })
    }

    /// Identity of this type.
    pub fn handle(&self) -> &TypeRef {
        &self.handle
    }

    /// Declared type name.
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// The type this one extends, if any.
    pub fn parent(&self) -> Option<&Arc<TypeDef>> {
        self.parent.as_ref()
    }

    /// Members declared on this type itself, in declaration order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(name, member)| (name.as_str(), member))
    }

    /// Field table: inherited fields overlaid with this type's own.
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// Names of all fields, inherited ones first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Every field with its accessor, inherited ones first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<dyn Accessor>)> {
        self.registry.iter()
    }

    /// Class-level access: the accessor itself rather than a value.
    pub fn field(&self, name: &str) -> Option<&Arc<dyn Accessor>> {
        self.registry.get(name)
    }

    /// A non-field member, looked up through the parent chain.
    pub fn constant(&self, name: &str) -> Option<&Value> {
        match self.members.get(name) {
            Some(Member::Value(value)) => Some(value),
            Some(Member::Field(_)) => None,
            None => self.parent.as_ref().and_then(|parent| parent.constant(name)),
        }
    }

    /// Whether `other` is this type or one of its ancestors.
    pub fn is_subtype_of(&self, other: &TypeDef) -> bool {
        let mut current = Some(self);
        while let Some(def) = current {
            if def.handle == other.handle {
                return true;
            }
            current = def.parent.as_deref();
        }
        false
    }

    /// A new record with every field unset.
    pub fn instantiate(self: &Arc<Self>) -> Record {
        Record::new(self)
    }
}

/// Instance storage for a [`TypeDef`].
///
/// Field values live in private slots keyed by [`FieldKey`]; all writes are
/// routed through the type's accessors, so field rules cannot be bypassed
/// by writing a slot directly:
///
/// ```compile_fail
/// use propstate::builder::TypeBuilder;
/// use propstate::props::Property;
///
/// let def = TypeBuilder::new("Locked")
///     .field("id", Property::read_only())
///     .build()
///     .unwrap();
/// let key = def.field("id").unwrap().binding().key().unwrap().clone();
/// let mut record = def.instantiate();
/// record.store(key, propstate::Value::Int(1));
/// ```
#[derive(Clone, Debug)]
pub struct Record {
    def: Arc<TypeDef>,
    slots: HashMap<FieldKey, Value>,
}

impl Record {
    /// An empty record of type `def`.
    pub fn new(def: &Arc<TypeDef>) -> Self {
        Self {
            def: Arc::clone(def),
            slots: HashMap::new(),
        }
    }

    /// The record's type.
    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.def
    }

    /// Read a field, falling back to type-level constants.
    pub fn get(&self, name: &str) -> Result<Value, PropError> {
        if let Some(accessor) = self.def.field(name) {
            return accessor.get(self);
        }
        self.def
            .constant(name)
            .cloned()
            .ok_or_else(|| self.no_such_attribute(name))
    }

    /// Write a field through its accessor.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), PropError> {
        let accessor = self.accessor(name)?;
        accessor.set(self, value.into())
    }

    /// Clear a field through its accessor.
    pub fn delete(&mut self, name: &str) -> Result<(), PropError> {
        let accessor = self.accessor(name)?;
        accessor.delete(self)
    }

    /// Whether the field's slot currently holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.def
            .field(name)
            .and_then(|accessor| accessor.binding().key().ok())
            .is_some_and(|key| self.slots.contains_key(key))
    }

    /// Raw slot contents for `key`, bypassing accessor defaults.
    pub fn slot(&self, key: &FieldKey) -> Option<&Value> {
        self.slots.get(key)
    }

    pub(crate) fn store(&mut self, key: FieldKey, value: Value) -> Option<Value> {
        self.slots.insert(key, value)
    }

    pub(crate) fn clear(&mut self, key: &FieldKey) -> Option<Value> {
        self.slots.remove(key)
    }

    /// Every readable field by name. Unset fields are omitted.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.def
            .fields()
            .filter_map(|(name, accessor)| {
                accessor
                    .get(self)
                    .ok()
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    }

    fn accessor(&self, name: &str) -> Result<Arc<dyn Accessor>, PropError> {
        self.def
            .field(name)
            .cloned()
            .ok_or_else(|| self.no_such_attribute(name))
    }

    fn no_such_attribute(&self, name: &str) -> PropError {
        PropError::NoSuchAttribute {
            name: name.to_string(),
            owner: self.def.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TypeBuilder;
    use crate::core::ErrorKind;
    use crate::props::Property;

    fn point() -> Arc<TypeDef> {
        TypeBuilder::new("Point")
            .field("x", Property::new())
            .field("y", Property::new())
            .constant("dims", 2)
            .build()
            .unwrap()
    }

    #[test]
    fn get_set_delete_round_through_accessors() {
        let def = point();
        let mut record = def.instantiate();

        assert_eq!(record.get("x").unwrap_err().kind(), ErrorKind::Attribute);
        record.set("x", 3).unwrap();
        assert!(record.is_set("x"));
        assert_eq!(record.get("x").unwrap(), Value::Int(3));

        record.delete("x").unwrap();
        assert!(!record.is_set("x"));
        assert!(matches!(record.delete("x"), Err(PropError::Unset { .. })));
    }

    #[test]
    fn constants_are_readable_but_not_writable() {
        let def = point();
        let mut record = def.instantiate();

        assert_eq!(record.get("dims").unwrap(), Value::Int(2));
        assert!(matches!(
            record.set("dims", 3),
            Err(PropError::NoSuchAttribute { .. })
        ));
        assert!(matches!(
            record.get("z"),
            Err(PropError::NoSuchAttribute { ref name, ref owner }) if name == "z" && owner == "Point"
        ));
    }

    #[test]
    fn instances_do_not_share_slots() {
        let def = point();
        let mut a = def.instantiate();
        let b = def.instantiate();

        a.set("x", 1).unwrap();
        assert!(b.get("x").is_err());
    }

    #[test]
    fn subtypes_inherit_constants_and_fields() {
        let base = point();
        let sub = TypeBuilder::new("Point3")
            .extends(&base)
            .field("z", Property::new())
            .build()
            .unwrap();

        assert!(sub.is_subtype_of(&base));
        assert!(!base.is_subtype_of(&sub));
        assert_eq!(sub.field_names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
        assert_eq!(sub.constant("dims"), Some(&Value::Int(2)));
        assert_eq!(sub.parent().map(|p| p.name()), Some("Point"));
    }

    #[test]
    fn slots_are_written_only_through_accessors() {
        let def = TypeBuilder::new("Locked")
            .field("id", Property::read_only())
            .build()
            .unwrap();
        let key = def.field("id").unwrap().binding().key().unwrap().clone();
        let mut record = def.instantiate();

        record.set("id", 1).unwrap();
        assert!(record.set("id", 2).is_err());
        assert!(record.delete("id").is_err());
        assert_eq!(record.slot(&key), Some(&Value::Int(1)));
    }

    #[test]
    fn snapshot_skips_unset_fields() {
        let def = point();
        let mut record = def.instantiate();
        record.set("y", "up").unwrap();

        let snapshot = record.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["y"], Value::from("up"));
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"y":"up"}"#
        );
    }
}
