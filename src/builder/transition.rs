//! Builder for constructing single transitions.

use crate::builder::error::BuildError;
use crate::core::{
    action_fn, guard_fn, Action, ActionError, Event, Guard, MachineState, Payload, State,
};
use crate::definition::Transition;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for constructing transitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use nfaflow::builder::TransitionBuilder;
///
/// let transition = TransitionBuilder::new()
///     .from("InReview")
///     .to("Approved")
///     .on("Approve")
///     .when(|_, state, _| !state.is_in_final_state())
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.guards.len(), 1);
/// ```
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<State>,
    to: Option<State>,
    on: Option<Event>,
    guards: Vec<Arc<dyn Guard>>,
    actions: Vec<Arc<dyn Action>>,
}

impl TransitionBuilder {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<State>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<State>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Set the triggering event (required).
    pub fn on(mut self, event: impl Into<Event>) -> Self {
        self.on = Some(event.into());
        self
    }

    /// Append a guard. Guards are checked in the order they were added.
    pub fn guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Append a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> bool + Send + Sync + 'static,
    {
        self.guard(guard_fn(predicate))
    }

    /// Append an action. Actions run in the order they were added.
    pub fn action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Append an action using a closure.
    pub fn run<F>(self, effect: F) -> Self
    where
        F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> Result<(), ActionError>
            + Send
            + Sync
            + 'static,
    {
        self.action(action_fn(effect))
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let on = self.on.ok_or(BuildError::MissingEvent)?;

        Ok(Transition {
            from,
            to,
            on,
            guards: self.guards,
            actions: self.actions,
        })
    }
}
