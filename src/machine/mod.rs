//! Finite state machines built on properties.
//!
//! A machine type declares [`State`]s and [`Transition`]s as members. On
//! finalization each state is stamped with its name and machine, and the
//! type gains a validated `current_state` field that only accepts its own
//! states. Instances move between states by invoking transitions:
//! - [`Machine::fire`] invokes a transition by name
//! - [`Machine::transitioner`] yields an invoker that can also preview the
//!   destination
//! - [`Machine::fire_recorded`] also appends the move to a caller-owned
//!   [`StateHistory`]

mod history;
#[allow(clippy::module_inception)]
mod machine;
mod state;
mod transition;

pub use history::{StateHistory, StateTransition};
pub use machine::{Machine, MachineType, Transitioner, CURRENT_STATE};
pub use state::{OrderCounter, State};
pub use transition::{Sources, Transition};
