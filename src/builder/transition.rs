//! Builder for constructing state transitions.

use crate::core::PropError;
use crate::machine::{Sources, State, Transition};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// Entries are collected in order; duplicate sources are reported by
/// [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct TransitionBuilder {
    entries: Vec<(Sources, Arc<State>)>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one source state to a destination.
    pub fn map(mut self, from: &Arc<State>, to: &Arc<State>) -> Self {
        self.entries.push((Sources::from(from), Arc::clone(to)));
        self
    }

    /// Map several source states to the same destination.
    pub fn map_many<'a, I>(mut self, froms: I, to: &Arc<State>) -> Self
    where
        I: IntoIterator<Item = &'a Arc<State>>,
    {
        let froms = froms.into_iter().map(Arc::clone).collect();
        self.entries.push((Sources::Many(froms), Arc::clone(to)));
        self
    }

    /// Build the transition.
    /// Returns an error if any source state appears twice.
    pub fn build(self) -> Result<Transition, PropError> {
        Transition::new(self.entries)
    }
}
