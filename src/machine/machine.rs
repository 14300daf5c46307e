//! Machine types, instances and transition invokers.

use super::history::{StateHistory, StateTransition};
use super::state::State;
use super::transition::Transition;
use crate::builder::MachineBuilder;
use crate::core::{PropError, Record, TypeDef, TypeRef, Value};
use chrono::Utc;
use indexmap::IndexMap;
use std::sync::Arc;

/// Field holding a machine instance's current state.
pub const CURRENT_STATE: &str = "current_state";

/// A finalized machine type.
///
/// Holds the states and transitions declared on the type itself, plus the
/// record type whose `current_state` field only accepts those states.
#[derive(Debug)]
pub struct MachineType {
    def: Arc<TypeDef>,
    states: IndexMap<String, Arc<State>>,
    transitions: IndexMap<String, Arc<Transition>>,
    initial: Option<Arc<State>>,
}

impl MachineType {
    pub(crate) fn assemble(
        def: Arc<TypeDef>,
        states: IndexMap<String, Arc<State>>,
        transitions: IndexMap<String, Arc<Transition>>,
        initial: Option<Arc<State>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            def,
            states,
            transitions,
            initial,
        })
    }

    /// Start declaring a machine type called `name`.
    pub fn builder(name: &str) -> MachineBuilder {
        MachineBuilder::new(name)
    }

    /// Declared machine name.
    pub fn name(&self) -> &str {
        self.def.name()
    }

    /// Identity of the machine type.
    pub fn handle(&self) -> &TypeRef {
        self.def.handle()
    }

    /// Underlying record type, including `current_state`.
    pub fn type_def(&self) -> &Arc<TypeDef> {
        &self.def
    }

    /// Own state declared as `name`.
    pub fn lookup_state(&self, name: &str) -> Option<&Arc<State>> {
        self.states.get(name)
    }

    /// Transition declared as `name`.
    pub fn lookup_transition(&self, name: &str) -> Option<&Arc<Transition>> {
        self.transitions.get(name)
    }

    /// Own states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (&str, &Arc<State>)> {
        self.states.iter().map(|(name, state)| (name.as_str(), state))
    }

    /// Declared transitions in declaration order.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, &Arc<Transition>)> {
        self.transitions
            .iter()
            .map(|(name, transition)| (name.as_str(), transition))
    }

    /// State new instances start in, if the machine has states.
    pub fn initial_state(&self) -> Option<&Arc<State>> {
        self.initial.as_ref()
    }

    /// Whether `state` is one of this type's own states.
    pub fn has_state(&self, state: &State) -> bool {
        self.states.values().any(|own| own.id() == state.id())
    }

    /// A new instance in the initial state.
    pub fn instantiate(self: &Arc<Self>) -> Result<Machine, PropError> {
        Machine::new(self)
    }
}

/// A machine instance.
///
/// # Example
///
/// ```rust
/// use propstate::machine::{MachineType, State, Transition};
/// use propstate::ErrorKind;
///
/// let (red, green) = (State::new(), State::new());
/// let kind = MachineType::builder("Light")
///     .state("red", &red)
///     .state("green", &green)
///     .transition("go", Transition::new([(red.clone(), green.clone())]).unwrap())
///     .build()
///     .unwrap();
///
/// let mut light = kind.instantiate().unwrap();
/// assert_eq!(light.current_state(), Some(red.clone()));
///
/// assert_eq!(light.fire("go").unwrap(), green);
/// assert_eq!(light.fire("go").unwrap_err().kind(), ErrorKind::Transition);
/// ```
#[derive(Clone, Debug)]
pub struct Machine {
    kind: Arc<MachineType>,
    record: Record,
}

impl Machine {
    /// A new instance in the type's initial state.
    pub fn new(kind: &Arc<MachineType>) -> Result<Self, PropError> {
        let mut machine = Self {
            kind: Arc::clone(kind),
            record: kind.def.instantiate(),
        };
        if let Some(initial) = kind.initial_state() {
            machine.set_state(initial)?;
        }
        Ok(machine)
    }

    /// The type this instance was created from.
    pub fn machine_type(&self) -> &Arc<MachineType> {
        &self.kind
    }

    /// `None` until a state has been assigned.
    pub fn current_state(&self) -> Option<Arc<State>> {
        self.record
            .get(CURRENT_STATE)
            .ok()?
            .as_object()?
            .downcast::<State>()
    }

    /// Assign the current state directly. Only the type's own states are
    /// accepted.
    pub fn set_state(&mut self, state: &Arc<State>) -> Result<(), PropError> {
        self.record.set(CURRENT_STATE, Value::from(Arc::clone(state)))
    }

    /// Invoker for the transition declared as `name`.
    pub fn transitioner(&mut self, name: &str) -> Result<Transitioner<'_>, PropError> {
        let transition = self
            .kind
            .lookup_transition(name)
            .cloned()
            .ok_or_else(|| PropError::NoSuchAttribute {
                name: name.to_string(),
                owner: self.kind.name().to_string(),
            })?;
        Ok(Transitioner {
            machine: self,
            name: name.to_string(),
            transition,
        })
    }

    /// Invoke the transition declared as `name`.
    pub fn fire(&mut self, name: &str) -> Result<Arc<State>, PropError> {
        self.transitioner(name)?.invoke()
    }

    /// Invoke the transition declared as `name`, appending it to `history`
    /// on success.
    pub fn fire_recorded(
        &mut self,
        name: &str,
        history: &mut StateHistory,
    ) -> Result<Arc<State>, PropError> {
        self.transitioner(name)?.invoke_recorded(history)
    }

    /// Names of the declared transitions, in declaration order.
    pub fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.kind.transitions.keys().map(String::as_str)
    }

    /// The instance's field storage.
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Mutable field storage; writes still go through the field accessors.
    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// One transition bound to one machine instance.
#[derive(Debug)]
pub struct Transitioner<'m> {
    machine: &'m mut Machine,
    name: String,
    transition: Arc<Transition>,
}

impl Transitioner<'_> {
    /// Field name the transition was declared under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound transition's source-to-destination map.
    pub fn transition(&self) -> &Arc<Transition> {
        &self.transition
    }

    /// Where invoking would lead from the current state.
    pub fn next_state(&self) -> Option<Arc<State>> {
        let current = self.machine.current_state()?;
        self.transition.next_state_from(&current)
    }

    /// Move the machine to the destination of its current state.
    ///
    /// Fails with [`PropError::IllegalTransition`] when the current state is
    /// not a source of this transition.
    pub fn invoke(self) -> Result<Arc<State>, PropError> {
        self.advance().map(|(_, _, next)| next)
    }

    /// Like [`invoke`](Self::invoke), appending the move to `history` on
    /// success.
    pub fn invoke_recorded(self, history: &mut StateHistory) -> Result<Arc<State>, PropError> {
        let (name, from, next) = self.advance()?;
        history.record(StateTransition {
            transition: name,
            from: from.to_string(),
            to: next.to_string(),
            timestamp: Utc::now(),
        });
        Ok(next)
    }

    fn advance(self) -> Result<(String, Arc<State>, Arc<State>), PropError> {
        let Some(from) = self.machine.current_state() else {
            return Err(PropError::IllegalTransition {
                transition: self.name,
                state: "None".to_string(),
            });
        };
        let Some(next) = self.transition.next_state_from(&from) else {
            return Err(PropError::IllegalTransition {
                transition: self.name,
                state: from.to_string(),
            });
        };

        self.machine.set_state(&next)?;
        tracing::debug!(
            machine = self.machine.kind.name(),
            transition = %self.name,
            from = %from,
            to = %next,
            "fired transition"
        );
        Ok((self.name, from, next))
    }
}
