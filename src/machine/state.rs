//! Machine states and their declaration order.

use crate::core::{Binding, Configurable, Object, PropError, TypeRef};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Monotonically increasing declaration counter.
///
/// The earliest-declared state of a machine becomes its default initial
/// state, so states remember the tick they were created at.
#[derive(Debug, Default)]
pub struct OrderCounter {
    next: AtomicU64,
}

impl OrderCounter {
    /// A counter starting at zero.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Take the next tick.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

static DECLARATION_ORDER: OrderCounter = OrderCounter::new();

/// A named state, owned by exactly one machine type.
///
/// States are identities: two states are equal only if they are the same
/// state, whatever their names.
///
/// # Example
///
/// ```rust
/// use propstate::machine::State;
///
/// let a = State::new();
/// let b = State::new();
///
/// assert!(a.order() < b.order());
/// assert_ne!(a, b);
/// assert_eq!(a.to_string(), "UNASSIGNED::UNKNOWN");
/// ```
#[derive(Debug)]
pub struct State {
    id: Uuid,
    order: u64,
    binding: Binding,
}

impl State {
    /// A fresh state ordered by the process-wide counter.
    pub fn new() -> Arc<Self> {
        Self::with_counter(&DECLARATION_ORDER)
    }

    /// A fresh state ordered by `counter`.
    pub fn with_counter(counter: &OrderCounter) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            order: counter.next(),
            binding: Binding::new(),
        })
    }

    /// Unique identity of the state.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Tick the state was created at; lower is earlier.
    pub fn order(&self) -> u64 {
        self.order
    }

    /// Field name the state was declared under.
    pub fn name(&self) -> Result<&str, PropError> {
        self.binding.name()
    }

    /// The machine type that declared this state.
    pub fn machine(&self) -> Result<&TypeRef, PropError> {
        self.binding.owner()
    }

    /// Whether the state has been declared on a machine.
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.binding.key() {
            Ok(key) => write!(f, "{}::{}", key.owner(), key.name()),
            Err(_) => f.write_str("UNASSIGNED::UNKNOWN"),
        }
    }
}

impl Object for State {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn bind_hook(&self) -> Option<&dyn Configurable> {
        Some(&self.binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{bind, ErrorKind, Member, Value};

    #[test]
    fn counter_is_monotonic() {
        let counter = OrderCounter::new();
        let a = State::with_counter(&counter);
        let b = State::with_counter(&counter);
        let c = State::with_counter(&counter);

        assert_eq!((a.order(), b.order(), c.order()), (0, 1, 2));
    }

    #[test]
    fn states_are_identities() {
        let a = State::new();
        let b = State::new();

        assert_eq!(a, Arc::clone(&a));
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn unbound_state() {
        let state = State::new();

        assert!(!state.is_bound());
        assert_eq!(state.name(), Err(PropError::NotConfigured));
        assert_eq!(state.machine(), Err(PropError::NotConfigured));
        assert_eq!(state.to_string(), "UNASSIGNED::UNKNOWN");
    }

    #[test]
    fn binding_through_member_stamps_name_and_machine() {
        let machine = TypeRef::new("Light");
        let state = State::new();
        let member = Member::Value(Value::from(Arc::clone(&state)));

        assert!(bind(&machine, "red", &member).unwrap());
        assert_eq!(state.name().unwrap(), "red");
        assert_eq!(state.machine().unwrap(), &machine);
        assert_eq!(state.to_string(), "Light::red");

        let err = bind(&TypeRef::new("Other"), "green", &member).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(state.to_string(), "Light::red");
    }
}
