//! Errors raised while running or resuming a machine.

use crate::core::{ActionError, Event, State};
use std::fmt;
use thiserror::Error;

/// Stage of a transition an action belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Exit actions of the source state
    OnExit,
    /// The transition's own actions
    Transition,
    /// Entry actions of the target state
    OnEntry,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::OnExit => "on-exit",
            Self::Transition => "transition",
            Self::OnEntry => "on-entry",
        };
        f.write_str(phase)
    }
}

/// Which global hook chain failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    OnSuccess,
    OnFailure,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnSuccess => f.write_str("on-success"),
            Self::OnFailure => f.write_str("on-failure"),
        }
    }
}

/// Failure of [`Machine::fire`](super::Machine::fire).
///
/// Guard rejection is never an error; only failing actions and hooks are.
#[derive(Debug, Error)]
pub enum FireError {
    /// An action failed before the transition was committed. The machine's
    /// state and history are unchanged.
    #[error("{phase} action failed on '{from}' -> '{to}' (event '{on}')")]
    Action {
        phase: Phase,
        from: State,
        to: State,
        on: Event,
        #[source]
        source: ActionError,
    },

    /// A hook failed. For `OnSuccess` the transition is already committed.
    #[error("{hook} hook failed")]
    Hook {
        hook: HookKind,
        #[source]
        source: ActionError,
    },

    /// An action failed and then one of the failure hooks failed too. The
    /// aborted transition is the error source.
    #[error("on-failure hook failed after an aborted transition: {hook}")]
    HookAfterFailure {
        #[source]
        cause: Box<FireError>,
        hook: ActionError,
    },
}

impl FireError {
    /// Phase of the action that aborted the transition, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Action { phase, .. } => Some(*phase),
            Self::Hook { .. } => None,
            Self::HookAfterFailure { cause, .. } => cause.phase(),
        }
    }

    /// Whether the machine moved despite the error.
    pub fn transition_committed(&self) -> bool {
        matches!(
            self,
            Self::Hook {
                hook: HookKind::OnSuccess,
                ..
            }
        )
    }
}

/// Failure to resume a machine from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error("snapshot is missing")]
    MissingSnapshot,

    #[error("snapshot current state cannot be empty")]
    EmptyCurrentState,

    #[error("current state '{0}' not found in definition")]
    UnknownState(State),
}
