//! Running machines against a definition.
//!
//! [`Machine`] owns the mutable side of a workflow: the current state and
//! its history. Everything it needs to know about the graph comes from the
//! shared, immutable [`Definition`](crate::definition::Definition).

mod error;
mod machine;

pub use error::{FireError, HookKind, Phase, RestoreError};
pub use machine::Machine;
