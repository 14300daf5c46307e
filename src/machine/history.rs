//! Opt-in record of fired transitions.
//!
//! Machines keep no history of their own. Callers that want one own a
//! [`StateHistory`] and pass it to
//! [`Machine::fire_recorded`](crate::machine::Machine::fire_recorded) or
//! [`Transitioner::invoke_recorded`](crate::machine::Transitioner::invoke_recorded);
//! each successful invocation is appended in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One successful transition invocation.
///
/// States are recorded by their display form (`Machine::name`) so the
/// history stays serializable on its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Name the transition was declared under
    pub transition: String,
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state transitions.
///
/// # Example
///
/// ```rust
/// use propstate::machine::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     transition: "advance".to_string(),
///     from: "Light::red".to_string(),
///     to: "Light::green".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["Light::red", "Light::green"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition.
    pub fn record(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// States visited, in order.
    ///
    /// A transition whose source differs from the previous destination
    /// means the state was assigned directly in between; the source is then
    /// listed as well, so the path never implies a move that did not happen.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path: Vec<&str> = Vec::new();
        for transition in &self.transitions {
            if path.last() != Some(&transition.from.as_str()) {
                path.push(&transition.from);
            }
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Recorded transitions, oldest first.
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Drop every recorded transition.
    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
