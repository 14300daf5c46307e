//! Errors raised by the registration protocol, properties, checks and machines.

use serde::Serialize;
use thiserror::Error;

/// Broad classification of a [`PropError`].
///
/// Callers that need to tell "wrong shape" from "wrong kind" branch on this
/// rather than matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Rebinding an accessor or malformed registration arguments.
    Configuration,
    /// Reading an unset field, or writing/deleting a protected one.
    Attribute,
    /// A predicate rejected a value.
    Value,
    /// A value had the wrong runtime type.
    Type,
    /// The current state has no mapping under the invoked transition.
    Transition,
    /// A malformed transition table or check tree.
    Structural,
}

/// Errors produced anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropError {
    /// An accessor was bound a second time.
    #[error("'{name}' is already configured on type '{owner}'")]
    AlreadyConfigured { name: String, owner: String },

    /// Name is empty, starts with a digit or contains non-identifier
    /// characters.
    #[error("attribute name must be a non-empty identifier, got '{name}'")]
    InvalidName { name: String },

    /// A user member used a name the builder manages itself.
    #[error("'{name}' is reserved on type '{owner}'")]
    ReservedName { name: String, owner: String },

    /// The accessor was used before its type was finalized.
    #[error("property not configured")]
    NotConfigured,

    #[error("'{owner}' has no attribute '{name}'")]
    NoSuchAttribute { name: String, owner: String },

    #[error("attribute '{name}' of '{owner}' has no value")]
    Unset { name: String, owner: String },

    /// Second write to a read-only field, or any write to an unsettable one.
    #[error("attribute '{name}' of '{owner}' is read-only")]
    ReadOnly { name: String, owner: String },

    /// The field's validator rejected the value.
    #[error("value {value} is not valid for property '{name}' on '{owner}'")]
    InvalidValue {
        name: String,
        owner: String,
        value: String,
    },

    #[error("property '{name}' on '{owner}' must be {expected}, got {found}")]
    WrongType {
        name: String,
        owner: String,
        expected: String,
        found: String,
    },

    /// A reducer met operands it cannot combine.
    #[error("unsupported operands for '{op}': {lhs} and {rhs}")]
    UnsupportedOperands {
        op: &'static str,
        lhs: String,
        rhs: String,
    },

    #[error("there is no transition '{transition}' from state {state}")]
    IllegalTransition { transition: String, state: String },

    /// A state appears as a source more than once in one transition.
    #[error("state {state} is already defined for transition")]
    DuplicateSource { state: String },

    #[error("compound check requires at least 2 checks, got {found}")]
    TooFewChecks { found: usize },

    /// The state belongs to another machine, or to none.
    #[error("state {state} is not declared on machine '{machine}'")]
    ForeignState { state: String, machine: String },
}

impl PropError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyConfigured { .. } | Self::InvalidName { .. } | Self::ReservedName { .. } => {
                ErrorKind::Configuration
            }
            Self::NotConfigured
            | Self::NoSuchAttribute { .. }
            | Self::Unset { .. }
            | Self::ReadOnly { .. } => ErrorKind::Attribute,
            Self::InvalidValue { .. } => ErrorKind::Value,
            Self::WrongType { .. } | Self::UnsupportedOperands { .. } => ErrorKind::Type,
            Self::IllegalTransition { .. } => ErrorKind::Transition,
            Self::DuplicateSource { .. } | Self::TooFewChecks { .. } | Self::ForeignState { .. } => {
                ErrorKind::Structural
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let rebind = PropError::AlreadyConfigured {
            name: "a".to_string(),
            owner: "Owner".to_string(),
        };
        assert_eq!(rebind.kind(), ErrorKind::Configuration);
        assert_eq!(PropError::NotConfigured.kind(), ErrorKind::Attribute);
        assert_eq!(
            PropError::TooFewChecks { found: 1 }.kind(),
            ErrorKind::Structural
        );
    }

    #[test]
    fn wrong_type_and_invalid_value_are_distinct_kinds() {
        let wrong_type = PropError::WrongType {
            name: "i".to_string(),
            owner: "C".to_string(),
            expected: "int".to_string(),
            found: "float".to_string(),
        };
        let invalid = PropError::InvalidValue {
            name: "i".to_string(),
            owner: "C".to_string(),
            value: "-1".to_string(),
        };
        assert_eq!(wrong_type.kind(), ErrorKind::Type);
        assert_eq!(invalid.kind(), ErrorKind::Value);
    }

    #[test]
    fn messages_name_field_and_owner() {
        let err = PropError::ReadOnly {
            name: "p".to_string(),
            owner: "C".to_string(),
        };
        assert_eq!(err.to_string(), "attribute 'p' of 'C' is read-only");

        let err = PropError::IllegalTransition {
            transition: "advance".to_string(),
            state: "Light::red".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "there is no transition 'advance' from state Light::red"
        );
    }
}
