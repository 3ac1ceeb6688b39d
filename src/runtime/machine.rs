//! Machine: a running instance of a definition.

use super::error::{FireError, HookKind, Phase, RestoreError};
use crate::checkpoint::Snapshot;
use crate::core::{
    Action, ActionError, Event, HistoryEntry, MachineState, Payload, State, StateExtender,
    StateHistory,
};
use crate::definition::{Definition, Transition};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Mutable part of a machine, guarded by one lock.
#[derive(Debug)]
struct Inner {
    current: State,
    history: StateHistory,
}

/// Mutable runtime instance bound to one [`Definition`].
///
/// A machine tracks its current state and the history of committed
/// transitions, and carries one caller-owned extension object that guards
/// and actions can reach through [`MachineState::state_extender`].
///
/// `fire` is serialized per machine; accessors share a read lock and only
/// wait for an in-flight `fire`. Share a machine across threads with
/// `Arc<Machine>`.
///
/// # Example
///
/// ```rust
/// use nfaflow::builder::DefinitionBuilder;
/// use nfaflow::core::{no_extender, Event};
/// use nfaflow::runtime::Machine;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// let definition = DefinitionBuilder::new()
///     .initial_state("Draft")
///     .final_states(["Approved"])
///     .add_transition("Draft", "InReview", "Submit")
///     .add_transition("InReview", "Approved", "Approve")
///     .build()
///     .unwrap();
///
/// let machine = Machine::new(Arc::new(definition), no_extender());
/// let token = CancellationToken::new();
///
/// assert!(machine.fire(&token, &Event::from("Submit"), None).unwrap());
/// assert!(machine.fire(&token, &Event::from("Approve"), None).unwrap());
/// assert!(machine.is_in_final_state());
/// assert_eq!(machine.history().len(), 2);
/// ```
pub struct Machine {
    definition: Arc<Definition>,
    inner: RwLock<Inner>,
    extender: StateExtender,
}

impl Machine {
    /// Create a machine sitting in the definition's initial state.
    pub fn new(definition: Arc<Definition>, extender: StateExtender) -> Self {
        let current = definition.initial_state().clone();
        Self {
            definition,
            inner: RwLock::new(Inner {
                current,
                history: StateHistory::new(),
            }),
            extender,
        }
    }

    /// Resume a machine from a snapshot.
    ///
    /// The snapshot's history is taken as is. Only the current state is
    /// checked against the definition.
    pub fn restore(
        definition: Arc<Definition>,
        snapshot: Option<Snapshot>,
        extender: StateExtender,
    ) -> Result<Self, RestoreError> {
        let snapshot = snapshot.ok_or(RestoreError::MissingSnapshot)?;

        if snapshot.current_state.is_empty() {
            return Err(RestoreError::EmptyCurrentState);
        }
        if !definition.has_state(&snapshot.current_state) {
            return Err(RestoreError::UnknownState(snapshot.current_state));
        }

        tracing::debug!(
            state = %snapshot.current_state,
            history = snapshot.history.len(),
            "restored machine from snapshot"
        );

        Ok(Self {
            definition,
            inner: RwLock::new(Inner {
                current: snapshot.current_state,
                history: snapshot.history,
            }),
            extender,
        })
    }

    /// Try to move the machine with `event`.
    ///
    /// Candidates leaving the current state on `event` are tried in
    /// declaration order; the first whose guards all pass is executed.
    /// Its source exit actions, own actions and target entry actions run in
    /// that order, and only when all of them succeed is the new state and a
    /// history entry committed.
    ///
    /// Returns `Ok(true)` when a transition was committed and `Ok(false)`
    /// when no candidate was eligible. Global success hooks run after a
    /// commit, failure hooks after every attempt that did not commit.
    ///
    /// The token is handed unchanged to every guard, action and hook.
    /// Guards and actions must not call `fire` on this machine.
    pub fn fire(
        &self,
        token: &CancellationToken,
        event: &Event,
        payload: Payload<'_>,
    ) -> Result<bool, FireError> {
        let mut inner = self.inner.write();
        let from = inner.current.clone();

        let outcome = {
            let view = self.view(&inner);
            self.select(token, &from, event, &view, payload)
        };

        match outcome {
            Ok(Some(transition)) => {
                inner.current = transition.to.clone();
                inner.history.record(HistoryEntry::now(
                    from.clone(),
                    transition.to.clone(),
                    event.clone(),
                ));
                tracing::debug!(
                    from = %from,
                    to = %transition.to,
                    event = %event,
                    "transition committed"
                );

                let view = self.view(&inner);
                run_actions(self.definition.success_hooks(), token, &view, payload).map_err(
                    |source| {
                        tracing::warn!(event = %event, error = %source, "on-success hook failed");
                        FireError::Hook {
                            hook: HookKind::OnSuccess,
                            source,
                        }
                    },
                )?;
                Ok(true)
            }
            Ok(None) => {
                tracing::debug!(state = %from, event = %event, "no eligible transition");

                let view = self.view(&inner);
                run_actions(self.definition.failure_hooks(), token, &view, payload).map_err(
                    |source| {
                        tracing::warn!(event = %event, error = %source, "on-failure hook failed");
                        FireError::Hook {
                            hook: HookKind::OnFailure,
                            source,
                        }
                    },
                )?;
                Ok(false)
            }
            Err(cause) => {
                tracing::warn!(
                    from = %from,
                    event = %event,
                    phase = ?cause.phase(),
                    error = %cause,
                    "transition aborted"
                );

                let view = self.view(&inner);
                match run_actions(self.definition.failure_hooks(), token, &view, payload) {
                    Ok(()) => Err(cause),
                    Err(hook) => {
                        tracing::warn!(event = %event, error = %hook, "on-failure hook failed");
                        Err(FireError::HookAfterFailure {
                            cause: Box::new(cause),
                            hook,
                        })
                    }
                }
            }
        }
    }

    /// Pick the first eligible candidate and run its actions.
    fn select(
        &self,
        token: &CancellationToken,
        from: &State,
        event: &Event,
        view: &dyn MachineState,
        payload: Payload<'_>,
    ) -> Result<Option<&Transition>, FireError> {
        for transition in self.definition.candidates(from, event) {
            let eligible = transition
                .guards
                .iter()
                .all(|guard| guard.check(token, view, payload));
            if !eligible {
                tracing::debug!(
                    from = %from,
                    to = %transition.to,
                    event = %event,
                    "guard rejected"
                );
                continue;
            }

            let phases = [
                (Phase::OnExit, self.definition.on_exit(from)),
                (Phase::Transition, transition.actions.as_slice()),
                (Phase::OnEntry, self.definition.on_entry(&transition.to)),
            ];
            for (phase, actions) in phases {
                run_actions(actions, token, view, payload).map_err(|source| FireError::Action {
                    phase,
                    from: from.clone(),
                    to: transition.to.clone(),
                    on: event.clone(),
                    source,
                })?;
            }

            return Ok(Some(transition));
        }
        Ok(None)
    }

    fn view<'a>(&'a self, inner: &'a Inner) -> MachineView<'a> {
        MachineView {
            definition: &self.definition,
            inner,
            extender: &self.extender,
        }
    }

    pub fn current_state(&self) -> State {
        self.inner.read().current.clone()
    }

    /// Copy of the committed history, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.read().history.entries().to_vec()
    }

    pub fn is_in_final_state(&self) -> bool {
        let inner = self.inner.read();
        self.definition.is_final_state(&inner.current)
    }

    /// Copy of the current state and history, consistent with each other.
    pub fn marshal(&self) -> Snapshot {
        let inner = self.inner.read();
        Snapshot {
            current_state: inner.current.clone(),
            history: inner.history.clone(),
        }
    }

    pub fn state_extender(&self) -> &StateExtender {
        &self.extender
    }

    /// Downcast the extension object.
    pub fn extension<T: Any>(&self) -> Option<&T> {
        (*self.extender).downcast_ref::<T>()
    }

    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }
}

impl MachineState for Machine {
    fn current_state(&self) -> State {
        Machine::current_state(self)
    }

    fn history(&self) -> Vec<HistoryEntry> {
        Machine::history(self)
    }

    fn is_in_final_state(&self) -> bool {
        Machine::is_in_final_state(self)
    }

    fn state_extender(&self) -> &StateExtender {
        &self.extender
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Machine")
            .field("current", &inner.current)
            .field("history", &inner.history.len())
            .field("initial_state", self.definition.initial_state())
            .finish()
    }
}

/// Lock-free view over data the caller already holds locked.
struct MachineView<'a> {
    definition: &'a Definition,
    inner: &'a Inner,
    extender: &'a StateExtender,
}

impl MachineState for MachineView<'_> {
    fn current_state(&self) -> State {
        self.inner.current.clone()
    }

    fn history(&self) -> Vec<HistoryEntry> {
        self.inner.history.entries().to_vec()
    }

    fn is_in_final_state(&self) -> bool {
        self.definition.is_final_state(&self.inner.current)
    }

    fn state_extender(&self) -> &StateExtender {
        self.extender
    }
}

fn run_actions(
    actions: &[Arc<dyn Action>],
    token: &CancellationToken,
    view: &dyn MachineState,
    payload: Payload<'_>,
) -> Result<(), ActionError> {
    actions
        .iter()
        .try_for_each(|action| action.execute(token, view, payload))
}
