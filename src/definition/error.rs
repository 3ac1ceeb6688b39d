//! Structural errors reported while building a definition.

use crate::core::{Event, State};
use std::fmt;
use thiserror::Error;

/// Where an undeclared state was referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateRole {
    Initial,
    Final,
    TransitionSource,
    TransitionTarget,
}

impl fmt::Display for StateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Self::Initial => "initial state",
            Self::Final => "final state",
            Self::TransitionSource => "transition source",
            Self::TransitionTarget => "transition target",
        };
        f.write_str(role)
    }
}

/// A definition graph that is not well formed.
///
/// These only ever come out of definition construction: a `Definition`
/// value cannot exist without passing validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("initial state cannot be empty")]
    EmptyInitialState,

    #[error("{role} '{state}' is not declared among the states")]
    UndeclaredState { state: State, role: StateRole },

    #[error("duplicate transition from '{from}' to '{to}' on '{on}'")]
    DuplicateTransition { from: State, to: State, on: Event },

    #[error("state '{0}' is not the initial state but has no incoming transitions")]
    HangingState(State),

    #[error("state '{0}' is not final but has no outgoing transitions")]
    DeadEndState(State),

    #[error("final state '{0}' has outgoing transitions")]
    FinalStateWithOutgoingTransitions(State),

    #[error("final state '{0}' is not reachable from the initial state")]
    UnreachableFinalState(State),

    #[error("no transitions start from initial state '{0}'")]
    InitialStateHasNoOutgoing(State),
}
