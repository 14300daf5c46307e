//! Builder for constructing machine types.

use crate::builder::types::TypeBuilder;
use crate::core::{bind, Accessor, Configure, Member, PropError, TypeRef, Value};
use crate::machine::{MachineType, State, Transition, CURRENT_STATE};
use crate::props::Property;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Builder for machine types with a fluent API.
///
/// States and transitions are ordinary members: states are stamped with
/// their field name and the machine type on [`build`](Self::build),
/// transitions are recorded under their field name. The `current_state`
/// field is added automatically and only accepts the machine's own states.
///
/// # Example
///
/// ```rust
/// use propstate::builder::MachineBuilder;
/// use propstate::machine::{State, Transition};
///
/// let (open, closed) = (State::new(), State::new());
/// let door = MachineBuilder::new("Door")
///     .state("open", &open)
///     .state("closed", &closed)
///     .transition(
///         "toggle",
///         Transition::builder().map(&open, &closed).map(&closed, &open).build().unwrap(),
///     )
///     .initial(&closed)
///     .build()
///     .unwrap();
///
/// assert_eq!(door.initial_state(), Some(&closed));
/// assert_eq!(open.to_string(), "Door::open");
/// ```
#[derive(Debug)]
pub struct MachineBuilder {
    types: TypeBuilder,
    initial: Option<Arc<State>>,
}

impl MachineBuilder {
    /// Create a new builder for a machine type called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            types: TypeBuilder::new(name),
            initial: None,
        }
    }

    /// Inherit fields and constants from `parent`. States and transitions
    /// stay with the type that declared them.
    pub fn extends(mut self, parent: &Arc<MachineType>) -> Self {
        self.types = self.types.extends(parent.type_def());
        self
    }

    /// Declare `state` under `name`. It is stamped with the name on build.
    pub fn state(mut self, name: &str, state: &Arc<State>) -> Self {
        self.types = self.types.constant(name, Arc::clone(state));
        self
    }

    /// Declare a transition under `name`.
    pub fn transition(mut self, name: &str, transition: Transition) -> Self {
        self.types = self.types.constant(name, Arc::new(transition));
        self
    }

    /// Declare an extra field alongside `current_state`.
    pub fn field<A: Accessor + 'static>(mut self, name: &str, accessor: A) -> Self {
        self.types = self.types.field(name, accessor);
        self
    }

    /// Declare a field whose accessor is also held elsewhere.
    pub fn shared_field(mut self, name: &str, accessor: Arc<dyn Accessor>) -> Self {
        self.types = self.types.shared_field(name, accessor);
        self
    }

    /// Declare a type-level constant.
    pub fn constant(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.types = self.types.constant(name, value);
        self
    }

    /// Declare any member; redeclaring a name replaces the earlier one.
    pub fn member(mut self, name: &str, member: Member) -> Self {
        self.types = self.types.member(name, member);
        self
    }

    /// Override the initial state. Must be one of this machine's own states.
    pub fn initial(mut self, state: &Arc<State>) -> Self {
        self.initial = Some(Arc::clone(state));
        self
    }

    /// Finalize the machine type.
    ///
    /// Without an explicit [`initial`](Self::initial) state the
    /// earliest-created own state is used; a machine without states starts
    /// with no current state.
    pub fn build(self) -> Result<Arc<MachineType>, PropError> {
        let name = self.types.name().to_string();
        if self.types.contains(CURRENT_STATE) {
            return Err(PropError::ReservedName {
                name: CURRENT_STATE.to_string(),
                owner: name,
            });
        }

        let own_states: HashSet<Uuid> = self
            .types
            .members()
            .filter_map(|(_, member)| member.as_object()?.downcast_ref::<State>())
            .map(State::id)
            .collect();
        if let Some(state) = &self.initial {
            if !own_states.contains(&state.id()) {
                return Err(PropError::ForeignState {
                    state: state.to_string(),
                    machine: name,
                });
            }
        }
        let current_state = Property::validated(move |value: &Value| {
            value
                .as_object()
                .and_then(|object| object.downcast_ref::<State>())
                .is_some_and(|state| own_states.contains(&state.id()))
        });

        let mut hooks = MachineHooks::default();
        let def = self
            .types
            .field(CURRENT_STATE, current_state)
            .build_with(&mut hooks)?;

        let initial = self.initial.or_else(|| {
            hooks
                .states
                .values()
                .min_by_key(|state| state.order())
                .cloned()
        });

        tracing::debug!(
            machine = %name,
            states = hooks.states.len(),
            transitions = hooks.transitions.len(),
            initial = ?initial.as_ref().map(|state| state.to_string()),
            "finalized machine type"
        );
        Ok(MachineType::assemble(
            def,
            hooks.states,
            hooks.transitions,
            initial,
        ))
    }
}

/// Registry step for machine types: binds every member and remembers
/// states and transitions by field name.
#[derive(Debug, Default)]
struct MachineHooks {
    states: IndexMap<String, Arc<State>>,
    transitions: IndexMap<String, Arc<Transition>>,
}

impl Configure for MachineHooks {
    fn configure_member(
        &mut self,
        owner: &TypeRef,
        name: &str,
        member: &Member,
    ) -> Result<bool, PropError> {
        let bound = bind(owner, name, member)?;
        if let Some(object) = member.as_object() {
            if let Some(state) = object.downcast::<State>() {
                self.states.insert(name.to_string(), state);
            } else if let Some(transition) = object.downcast::<Transition>() {
                self.transitions.insert(name.to_string(), transition);
            }
        }
        Ok(bound)
    }
}
