//! Source-to-destination state mappings.

use super::state::State;
use crate::builder::TransitionBuilder;
use crate::core::{Object, PropError};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The source side of one transition entry.
#[derive(Clone, Debug)]
pub enum Sources {
    One(Arc<State>),
    Many(Vec<Arc<State>>),
}

impl Sources {
    fn into_vec(self) -> Vec<Arc<State>> {
        match self {
            Self::One(state) => vec![state],
            Self::Many(states) => states,
        }
    }
}

impl From<Arc<State>> for Sources {
    fn from(state: Arc<State>) -> Self {
        Self::One(state)
    }
}

impl From<&Arc<State>> for Sources {
    fn from(state: &Arc<State>) -> Self {
        Self::One(Arc::clone(state))
    }
}

impl From<Vec<Arc<State>>> for Sources {
    fn from(states: Vec<Arc<State>>) -> Self {
        Self::Many(states)
    }
}

impl<const N: usize> From<[Arc<State>; N]> for Sources {
    fn from(states: [Arc<State>; N]) -> Self {
        Self::Many(states.into())
    }
}

/// Immutable mapping from source states to one destination each.
///
/// No source may appear twice, whether in the same entry or across
/// entries; that is rejected at construction.
///
/// # Example
///
/// ```rust
/// use propstate::machine::{State, Transition};
///
/// let (a, b, c) = (State::new(), State::new(), State::new());
/// let advance = Transition::new([(vec![a.clone(), b.clone()], c.clone())]).unwrap();
///
/// assert_eq!(advance.next_state_from(&a), Some(c.clone()));
/// assert_eq!(advance.next_state_from(&c), None);
///
/// assert!(Transition::new([(a.clone(), b.clone()), (a.clone(), c.clone())]).is_err());
/// ```
#[derive(Debug)]
pub struct Transition {
    map: IndexMap<Uuid, (Arc<State>, Arc<State>)>,
}

impl Transition {
    /// Build from `(sources, destination)` entries.
    ///
    /// Fails with [`PropError::DuplicateSource`] if any state is a source
    /// more than once.
    pub fn new<I, S>(entries: I) -> Result<Self, PropError>
    where
        I: IntoIterator<Item = (S, Arc<State>)>,
        S: Into<Sources>,
    {
        let mut map = IndexMap::new();
        for (sources, to) in entries {
            for from in sources.into().into_vec() {
                if map.contains_key(&from.id()) {
                    return Err(PropError::DuplicateSource {
                        state: from.to_string(),
                    });
                }
                map.insert(from.id(), (from, Arc::clone(&to)));
            }
        }
        Ok(Self { map })
    }

    /// Start a [`TransitionBuilder`].
    pub fn builder() -> TransitionBuilder {
        TransitionBuilder::new()
    }

    /// Destination for `state`, if it is a source of this transition.
    pub fn next_state_from(&self, state: &State) -> Option<Arc<State>> {
        self.map.get(&state.id()).map(|(_, to)| Arc::clone(to))
    }

    /// Source states in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<State>> {
        self.map.values().map(|(from, _)| from)
    }

    /// `(source, destination)` pairs in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&Arc<State>, &Arc<State>)> {
        self.map.values().map(|(from, to)| (from, to))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (from, to)) in self.edges().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{from} -> {to}")?;
        }
        f.write_str("}")
    }
}

impl Object for Transition {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
