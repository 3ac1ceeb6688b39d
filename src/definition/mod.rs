//! Immutable, validated state machine definitions.
//!
//! A [`Definition`] can only be obtained through [`Definition::new`], which
//! runs the graph validator. Once built it never changes and can be shared by
//! any number of machines without locking.

mod error;
mod validate;

pub use error::{DefinitionError, StateRole};
pub use validate::{validate, validate_all};

use crate::core::{Action, Event, Guard, State};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// One possible move between two states.
///
/// Several transitions may share the same source and event; they are tried
/// in declaration order.
#[derive(Clone)]
pub struct Transition {
    pub from: State,
    pub to: State,
    pub on: Event,
    /// Must all pass, in order, for the transition to be taken.
    pub guards: Vec<Arc<dyn Guard>>,
    /// Run in order between the source's exit and the target's entry actions.
    pub actions: Vec<Arc<dyn Action>>,
}

impl Transition {
    /// Create an unguarded transition without actions.
    pub fn new(from: impl Into<State>, to: impl Into<State>, on: impl Into<Event>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            on: on.into(),
            guards: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_guard(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("on", &self.on)
            .field("guards", &self.guards.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Actions bound to entering and leaving a state.
#[derive(Clone, Default)]
pub struct StateConfig {
    pub on_entry: Vec<Arc<dyn Action>>,
    pub on_exit: Vec<Arc<dyn Action>>,
}

impl StateConfig {
    pub fn is_empty(&self) -> bool {
        self.on_entry.is_empty() && self.on_exit.is_empty()
    }

    fn merge(&mut self, other: StateConfig) {
        self.on_entry.extend(other.on_entry);
        self.on_exit.extend(other.on_exit);
    }
}

impl fmt::Debug for StateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfig")
            .field("on_entry", &self.on_entry.len())
            .field("on_exit", &self.on_exit.len())
            .finish()
    }
}

/// Global hooks run after every fire attempt.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Run after a transition was committed.
    pub on_success: Vec<Arc<dyn Action>>,
    /// Run when no transition was taken or an action failed.
    pub on_failure: Vec<Arc<dyn Action>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_success", &self.on_success.len())
            .field("on_failure", &self.on_failure.len())
            .finish()
    }
}

/// Validated description of states, transitions and hooks.
pub struct Definition {
    initial_state: State,
    final_states: Vec<State>,
    final_set: HashSet<State>,
    states: Vec<State>,
    configs: HashMap<State, StateConfig>,
    transitions: Vec<Transition>,
    hooks: Hooks,
}

impl Definition {
    /// Validate the graph and build a definition.
    ///
    /// `states` lists every declared state with its entry/exit actions.
    /// A state listed more than once has its action lists concatenated in
    /// order. On failure the validator's first error is returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nfaflow::definition::{Definition, Hooks, StateConfig, Transition};
    /// use nfaflow::core::State;
    ///
    /// let definition = Definition::new(
    ///     State::from("Draft"),
    ///     vec![State::from("Approved")],
    ///     vec![
    ///         (State::from("Draft"), StateConfig::default()),
    ///         (State::from("InReview"), StateConfig::default()),
    ///         (State::from("Approved"), StateConfig::default()),
    ///     ],
    ///     vec![
    ///         Transition::new("Draft", "InReview", "Submit"),
    ///         Transition::new("InReview", "Approved", "Approve"),
    ///     ],
    ///     Hooks::default(),
    /// )
    /// .unwrap();
    ///
    /// assert!(definition.is_final_state(&State::from("Approved")));
    /// assert_eq!(definition.get_transitions(&"Draft".into(), &"Submit".into()).len(), 1);
    /// ```
    pub fn new(
        initial_state: State,
        final_states: Vec<State>,
        states: Vec<(State, StateConfig)>,
        transitions: Vec<Transition>,
        hooks: Hooks,
    ) -> Result<Self, DefinitionError> {
        let mut declared = Vec::with_capacity(states.len());
        let mut configs: HashMap<State, StateConfig> = HashMap::with_capacity(states.len());
        for (state, config) in states {
            match configs.get_mut(&state) {
                Some(existing) => existing.merge(config),
                None => {
                    declared.push(state.clone());
                    configs.insert(state, config);
                }
            }
        }

        let mut final_set = HashSet::with_capacity(final_states.len());
        let final_states: Vec<State> = final_states
            .into_iter()
            .filter(|s| final_set.insert(s.clone()))
            .collect();

        if let Err(err) = validate(&initial_state, &declared, &transitions, &final_states) {
            tracing::debug!(initial = %initial_state, error = %err, "rejected definition");
            return Err(err);
        }

        tracing::debug!(
            initial = %initial_state,
            states = declared.len(),
            finals = final_states.len(),
            transitions = transitions.len(),
            "built state machine definition"
        );

        Ok(Self {
            initial_state,
            final_states,
            final_set,
            states: declared,
            configs,
            transitions,
            hooks,
        })
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Copy of the final states, in declaration order.
    pub fn final_states(&self) -> Vec<State> {
        self.final_states.clone()
    }

    pub fn is_final_state(&self, state: &State) -> bool {
        self.final_set.contains(state)
    }

    /// Copy of the declared states, in declaration order.
    pub fn states(&self) -> Vec<State> {
        self.states.clone()
    }

    pub fn has_state(&self, state: &State) -> bool {
        self.configs.contains_key(state)
    }

    /// Copy of all transitions, in declaration order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.transitions.clone()
    }

    pub fn hooks(&self) -> Hooks {
        self.hooks.clone()
    }

    /// Transitions leaving `from` on `event`, in declaration order.
    pub fn get_transitions(&self, from: &State, event: &Event) -> Vec<Transition> {
        self.candidates(from, event).into_iter().cloned().collect()
    }

    /// Entry/exit actions of `state`; empty when the state has none.
    pub fn get_state_config(&self, state: &State) -> StateConfig {
        self.configs.get(state).cloned().unwrap_or_default()
    }

    pub(crate) fn candidates(&self, from: &State, event: &Event) -> Vec<&Transition> {
        self.transitions
            .iter()
            .filter(|t| &t.from == from && &t.on == event)
            .collect()
    }

    pub(crate) fn on_entry(&self, state: &State) -> &[Arc<dyn Action>] {
        self.configs
            .get(state)
            .map(|c| c.on_entry.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn on_exit(&self, state: &State) -> &[Arc<dyn Action>] {
        self.configs
            .get(state)
            .map(|c| c.on_exit.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn success_hooks(&self) -> &[Arc<dyn Action>] {
        &self.hooks.on_success
    }

    pub(crate) fn failure_hooks(&self) -> &[Arc<dyn Action>] {
        &self.hooks.on_failure
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("initial_state", &self.initial_state)
            .field("final_states", &self.final_states)
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .field("hooks", &self.hooks)
            .finish()
    }
}
