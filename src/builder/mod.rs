//! Builder API for declaring record and machine types.
//!
//! This module provides fluent builders and a macro for finalizing types:
//! - [`TypeBuilder`] for plain record types with fields and constants
//! - [`MachineBuilder`] for machine types with states and transitions
//! - [`TransitionBuilder`] for source-to-destination mappings
//! - [`machine!`](crate::machine!) for declaring a whole machine at once

mod machine;
mod macros;
mod transition;
mod types;

pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;
pub use types::TypeBuilder;
