//! Builder API for ergonomic definition construction.
//!
//! This module provides fluent builders and macros for creating definitions
//! with minimal boilerplate. Builders only accumulate; every graph rule is
//! still enforced by [`Definition::new`](crate::definition::Definition::new).

pub mod definition;
pub mod error;
pub mod macros;
pub mod transition;

pub use definition::DefinitionBuilder;
pub use error::BuildError;
pub use transition::TransitionBuilder;

use crate::core::{guard_fn, Event, MachineState, Payload, State};
use crate::definition::Transition;
use tokio_util::sync::CancellationToken;

/// Create an unconditional transition without actions.
///
/// # Example
///
/// ```
/// use nfaflow::builder::simple_transition;
///
/// let transition = simple_transition("Draft", "InReview", "Submit");
/// assert!(transition.guards.is_empty());
/// ```
pub fn simple_transition(
    from: impl Into<State>,
    to: impl Into<State>,
    on: impl Into<Event>,
) -> Transition {
    Transition::new(from, to, on)
}

/// Create a transition gated by a single guard closure.
///
/// # Example
///
/// ```
/// use nfaflow::builder::guarded_transition;
/// use nfaflow::core::payload_as;
///
/// let transition = guarded_transition("InReview", "Approved", "Approve", |_, _, payload| {
///     payload_as::<String>(payload).is_some_and(|role| role == "manager")
/// });
/// assert_eq!(transition.guards.len(), 1);
/// ```
pub fn guarded_transition<F>(
    from: impl Into<State>,
    to: impl Into<State>,
    on: impl Into<Event>,
    guard: F,
) -> Transition
where
    F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> bool + Send + Sync + 'static,
{
    Transition::new(from, to, on).with_guard(guard_fn(guard))
}
