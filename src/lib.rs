//! nfaflow: non-deterministic state machines for workflow engines
//!
//! A workflow is described once as an immutable [`Definition`]: states,
//! event-labelled transitions with guards and actions, per-state entry/exit
//! actions and global hooks. Definitions are validated when built, so a
//! running [`Machine`] never meets a dangling state or an unreachable end.
//!
//! # Core Concepts
//!
//! - **Definition**: validated graph shared by any number of machines
//! - **Machine**: current state plus history, moved only by `fire`
//! - **Guards**: predicates choosing among candidate transitions
//! - **Actions**: side effects run on exit, on transition and on entry;
//!   the machine only moves when all of them succeed
//! - **Snapshot**: serializable current state and history for resuming
//!
//! # Example
//!
//! ```rust
//! use nfaflow::{DefinitionBuilder, Event, Machine};
//! use nfaflow::core::{guard_fn, no_extender};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let definition = DefinitionBuilder::new()
//!     .initial_state("Draft")
//!     .final_states(["Approved"])
//!     .add_transition("Draft", "InReview", "Submit")
//!     .add_transition("InReview", "Approved", "Approve")
//!     .with_guards([guard_fn(|_, _, _| true)])
//!     .build()
//!     .unwrap();
//!
//! let machine = Machine::new(Arc::new(definition), no_extender());
//! let token = CancellationToken::new();
//!
//! // Not possible from Draft: nothing happens, and that is not an error.
//! assert!(!machine.fire(&token, &Event::from("Approve"), None).unwrap());
//!
//! machine.fire(&token, &Event::from("Submit"), None).unwrap();
//! machine.fire(&token, &Event::from("Approve"), None).unwrap();
//! assert!(machine.is_in_final_state());
//!
//! let snapshot = machine.marshal();
//! let resumed =
//!     Machine::restore(machine.definition().clone(), Some(snapshot), no_extender()).unwrap();
//! assert_eq!(resumed.history().len(), 2);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod definition;
pub mod loader;
pub mod registry;
pub mod runtime;

// Re-export commonly used types
pub use builder::{BuildError, DefinitionBuilder};
pub use checkpoint::{Checkpoint, Snapshot};
pub use self::core::{Action, ActionError, Event, Guard, HistoryEntry, MachineState, State};
pub use definition::{Definition, DefinitionError, Hooks, StateConfig, Transition};
pub use loader::LoadError;
pub use registry::Registry;
pub use runtime::{FireError, Machine, RestoreError};
