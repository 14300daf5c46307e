//! Propstate: self-configuring properties, validators and named-state machines
//!
//! Types are declared through fluent builders and finalized once. At that
//! point every declared member that cares learns its field name and owning
//! type, so accessors, states and transitions never need to be told their
//! own names.
//!
//! # Core Concepts
//!
//! - **Properties**: Field accessors with read-only, validated, strict and
//!   computed variants
//! - **Validators**: Composable predicates combined with `&`, `|` and `!`
//! - **Checks**: Flattening expression trees of constants and probes
//! - **Machines**: Named states, transition tables and a validated
//!   `current_state` field
//! - **History**: Opt-in, caller-owned log of fired transitions
//!
//! # Example
//!
//! ```rust
//! use propstate::builder::TypeBuilder;
//! use propstate::props::{Cmp, Property};
//! use propstate::{ErrorKind, Value, ValueType};
//!
//! let account = TypeBuilder::new("Account")
//!     .field("id", Property::read_only())
//!     .field("balance", Property::validated(Cmp::ge(0)).with_default(0))
//!     .field("owner", Property::strict(ValueType::Str))
//!     .build()
//!     .unwrap();
//!
//! let mut record = account.instantiate();
//! record.set("id", 7).unwrap();
//! assert_eq!(record.set("id", 8).unwrap_err().kind(), ErrorKind::Attribute);
//!
//! assert_eq!(record.get("balance").unwrap(), Value::Int(0));
//! assert_eq!(record.set("balance", -1).unwrap_err().kind(), ErrorKind::Value);
//! assert_eq!(record.set("owner", 1).unwrap_err().kind(), ErrorKind::Type);
//! ```

pub mod builder;
pub mod check;
pub mod core;
pub mod machine;
pub mod props;

// Re-export commonly used types
pub use crate::builder::{MachineBuilder, TransitionBuilder, TypeBuilder};
pub use crate::check::{Check, Reducer};
pub use crate::core::{ErrorKind, Object, ObjectRef, PropError, Record, TypeDef, Value, ValueType};
pub use crate::machine::{Machine, MachineType, State, StateHistory, Transition};
pub use crate::props::{Cmp, Property, Validator};
