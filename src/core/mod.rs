//! Core vocabulary shared by definitions and machines.
//!
//! This module contains the types every other module speaks:
//! - State and event names
//! - Guard and action capabilities, plus closure adapters
//! - The read-only machine view passed to collaborators
//! - Append-only transition history

mod action;
mod guard;
mod history;
mod machine_state;
mod state;

pub use action::{action_fn, Action, ActionError, FnAction};
pub use guard::{guard_fn, FnGuard, Guard};
pub use history::{HistoryEntry, StateHistory};
pub use machine_state::{extender, no_extender, payload_as, MachineState, Payload, StateExtender};
pub use state::{Event, State};
