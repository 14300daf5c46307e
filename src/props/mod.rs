//! Field accessors and validators.
//!
//! A [`Property`] is declared on a type through the builder and bound to its
//! field name when the type is finalized. The rule it carries decides what
//! get/set/delete may do:
//!
//! | constructor       | set                          | delete        |
//! |-------------------|------------------------------|---------------|
//! | `new`             | overwrites                   | clears        |
//! | `read_only`       | once per instance            | never         |
//! | `undeletable`     | overwrites                   | never         |
//! | `unsettable`      | never                        | never         |
//! | `validated(v)`    | if `v` accepts the value     | clears        |
//! | `strict(t)`       | if the value has type `t`    | clears        |
//! | `computed(f)`     | never; get evaluates `f`     | never         |

pub mod validator;

pub use validator::{and_of, empty, is_in, none, not_of, of_type, or_of, Cmp, CmpOp, Validator};

use crate::core::{Accessor, Binding, FieldKey, PropError, Record, TypeRef, Value, ValueType};
use std::fmt;
use std::sync::Arc;

type ComputeFn = dyn Fn(&Record) -> Result<Value, PropError> + Send + Sync;

#[derive(Clone)]
enum Rule {
    Plain,
    ReadOnly,
    Undeletable,
    Unsettable,
    Validated(Validator),
    Strict(ValueType),
    Computed(Arc<ComputeFn>),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::ReadOnly => f.write_str("ReadOnly"),
            Self::Undeletable => f.write_str("Undeletable"),
            Self::Unsettable => f.write_str("Unsettable"),
            Self::Validated(validator) => f.debug_tuple("Validated").field(validator).finish(),
            Self::Strict(kind) => f.debug_tuple("Strict").field(kind).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Which contract a [`Property`] follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Plain,
    ReadOnly,
    Undeletable,
    Unsettable,
    Validated,
    Strict,
    Computed,
}

/// A self-configuring field accessor.
///
/// # Example
///
/// ```rust
/// use propstate::builder::TypeBuilder;
/// use propstate::props::{Cmp, Property};
/// use propstate::{ErrorKind, Value, ValueType};
///
/// let def = TypeBuilder::new("Account")
///     .field("id", Property::read_only())
///     .field("balance", Property::validated(Cmp::ge(0)))
///     .field("owner", Property::strict(ValueType::Str))
///     .build()
///     .unwrap();
///
/// let mut account = def.instantiate();
/// account.set("id", 7).unwrap();
/// account.set("balance", 0).unwrap();
///
/// assert_eq!(account.set("id", 8).unwrap_err().kind(), ErrorKind::Attribute);
/// assert_eq!(account.set("balance", -1).unwrap_err().kind(), ErrorKind::Value);
/// assert_eq!(account.set("owner", 1).unwrap_err().kind(), ErrorKind::Type);
/// assert_eq!(account.get("id").unwrap(), Value::Int(7));
/// ```
#[derive(Debug)]
pub struct Property {
    binding: Binding,
    rule: Rule,
    default: Option<Value>,
}

impl Default for Property {
    fn default() -> Self {
        Self::new()
    }
}

impl Property {
    fn with_rule(rule: Rule) -> Self {
        Self {
            binding: Binding::new(),
            rule,
            default: None,
        }
    }

    /// A plain read/write property.
    pub fn new() -> Self {
        Self::with_rule(Rule::Plain)
    }

    /// Settable once per instance; never deletable.
    pub fn read_only() -> Self {
        Self::with_rule(Rule::ReadOnly)
    }

    /// Settable any number of times; never deletable.
    pub fn undeletable() -> Self {
        Self::with_rule(Rule::Undeletable)
    }

    /// Never writable; reads come from [`with_default`](Self::with_default).
    pub fn unsettable() -> Self {
        Self::with_rule(Rule::Unsettable)
    }

    /// Accepts only values the validator approves; others fail with
    /// [`PropError::InvalidValue`].
    pub fn validated(validator: impl Into<Validator>) -> Self {
        Self::with_rule(Rule::Validated(validator.into()))
    }

    /// Values must have runtime type `kind`. Mismatches are type errors,
    /// never value errors.
    pub fn strict(kind: ValueType) -> Self {
        Self::with_rule(Rule::Strict(kind))
    }

    /// Evaluated against the owning record on every read.
    pub fn computed<F>(compute: F) -> Self
    where
        F: Fn(&Record) -> Result<Value, PropError> + Send + Sync + 'static,
    {
        Self::with_rule(Rule::Computed(Arc::new(compute)))
    }

    /// Value returned by get while the field is unset.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Which variant this property is.
    pub fn kind(&self) -> PropertyKind {
        match self.rule {
            Rule::Plain => PropertyKind::Plain,
            Rule::ReadOnly => PropertyKind::ReadOnly,
            Rule::Undeletable => PropertyKind::Undeletable,
            Rule::Unsettable => PropertyKind::Unsettable,
            Rule::Validated(_) => PropertyKind::Validated,
            Rule::Strict(_) => PropertyKind::Strict,
            Rule::Computed(_) => PropertyKind::Computed,
        }
    }

    /// The predicate applied on set. Strict properties report their type
    /// check.
    pub fn validator(&self) -> Option<Validator> {
        match &self.rule {
            Rule::Validated(validator) => Some(validator.clone()),
            Rule::Strict(kind) => Some(of_type(*kind)),
            _ => None,
        }
    }

    /// Required runtime type for strict properties.
    pub fn property_type(&self) -> Option<ValueType> {
        match self.rule {
            Rule::Strict(kind) => Some(kind),
            _ => None,
        }
    }

    /// Value read while the slot is unset.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl Accessor for Property {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn get(&self, record: &Record) -> Result<Value, PropError> {
        let key = self.binding.key()?;
        if let Rule::Computed(compute) = &self.rule {
            return compute(record);
        }
        record
            .slot(key)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| key.unset())
    }

    fn set(&self, record: &mut Record, value: Value) -> Result<(), PropError> {
        let key = self.binding.key()?;
        match &self.rule {
            Rule::Plain | Rule::Undeletable => {}
            Rule::ReadOnly => {
                if record.slot(key).is_some() {
                    return Err(key.read_only());
                }
            }
            Rule::Unsettable | Rule::Computed(_) => return Err(key.read_only()),
            Rule::Validated(validator) => {
                if !validator.test(&value) {
                    return Err(invalid_value(key, &value));
                }
            }
            Rule::Strict(kind) => {
                if !kind.matches(&value) {
                    return Err(wrong_type(key, *kind, &value));
                }
            }
        }
        record.store(key.clone(), value);
        Ok(())
    }

    fn delete(&self, record: &mut Record) -> Result<(), PropError> {
        let key = self.binding.key()?;
        match self.rule {
            Rule::Plain | Rule::Validated(_) | Rule::Strict(_) => {
                record.clear(key).map(drop).ok_or_else(|| key.unset())
            }
            Rule::ReadOnly | Rule::Undeletable | Rule::Unsettable | Rule::Computed(_) => {
                Err(key.read_only())
            }
        }
    }
}

impl Property {
    /// Bound name, or [`PropError::NotConfigured`].
    pub fn name(&self) -> Result<&str, PropError> {
        self.binding.name()
    }

    /// Bound owning type, or [`PropError::NotConfigured`].
    pub fn owner(&self) -> Result<&TypeRef, PropError> {
        self.binding.owner()
    }
}

fn invalid_value(key: &FieldKey, value: &Value) -> PropError {
    PropError::InvalidValue {
        name: key.name().to_string(),
        owner: key.owner().name().to_string(),
        value: value.to_string(),
    }
}

fn wrong_type(key: &FieldKey, kind: ValueType, value: &Value) -> PropError {
    PropError::WrongType {
        name: key.name().to_string(),
        owner: key.owner().name().to_string(),
        expected: kind.to_string(),
        found: value.type_name().to_string(),
    }
}
