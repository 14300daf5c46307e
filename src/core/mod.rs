//! Registration protocol and record model.
//!
//! This module contains the foundation everything else is built on:
//! - Dynamic field values via [`Value`] and user [`Object`]s
//! - One-time name/owner binding of declared members
//! - Per-type property registries and record storage
//!
//! A type is finalized exactly once; at that point every declared member is
//! offered its field name and owning type.

mod binding;
mod error;
mod record;
mod registry;
mod value;

pub use binding::{bind, Binding, Configurable, FieldKey, TypeRef};
pub use error::{ErrorKind, PropError};
pub use record::{Record, TypeDef};
pub use registry::{configure_all, Accessor, Configure, Member, Plain, PropertyRegistry};
pub use value::{Object, ObjectRef, Value, ValueType};
