//! Builder for constructing definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Action, Event, Guard, State};
use crate::definition::{Definition, Hooks, StateConfig, Transition};
use std::sync::Arc;

/// Fluent accumulator feeding [`Definition::new`].
///
/// States mentioned as initial, final or transition endpoints are declared
/// automatically, so only states that carry entry/exit actions need
/// [`state`](Self::state), [`on_entry`](Self::on_entry) or
/// [`on_exit`](Self::on_exit).
///
/// # Example
///
/// ```rust
/// use nfaflow::builder::DefinitionBuilder;
/// use nfaflow::core::{action_fn, guard_fn};
///
/// let definition = DefinitionBuilder::new()
///     .initial_state("Draft")
///     .final_states(["Approved", "Rejected"])
///     .on_entry("InReview", [action_fn(|_, _, _| Ok(()))])
///     .add_transition("Draft", "InReview", "Submit")
///     .add_transition("InReview", "Approved", "Decide")
///     .with_guards([guard_fn(|_, _, _| true)])
///     .add_transition("InReview", "Rejected", "Decide")
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.states().len(), 4);
/// ```
#[derive(Default)]
pub struct DefinitionBuilder {
    initial: Option<State>,
    finals: Vec<State>,
    states: Vec<(State, StateConfig)>,
    transitions: Vec<Transition>,
    hooks: Hooks,
}

impl DefinitionBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state (required).
    pub fn initial_state(mut self, state: impl Into<State>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Add final states.
    pub fn final_states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<State>,
    {
        self.finals.extend(states.into_iter().map(Into::into));
        self
    }

    /// Declare a state without actions.
    pub fn state(mut self, state: impl Into<State>) -> Self {
        self.states.push((state.into(), StateConfig::default()));
        self
    }

    /// Append entry actions for `state`, declaring it if needed.
    ///
    /// Entry actions run before the transition is committed, so the view
    /// they receive still reports the source state: `current_state()` is the
    /// state being left, `is_in_final_state()` describes that state and
    /// `history()` lacks the entry for this transition.
    pub fn on_entry<I>(mut self, state: impl Into<State>, actions: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Action>>,
    {
        let config = StateConfig {
            on_entry: actions.into_iter().collect(),
            on_exit: Vec::new(),
        };
        self.states.push((state.into(), config));
        self
    }

    /// Append exit actions for `state`, declaring it if needed.
    pub fn on_exit<I>(mut self, state: impl Into<State>, actions: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Action>>,
    {
        let config = StateConfig {
            on_entry: Vec::new(),
            on_exit: actions.into_iter().collect(),
        };
        self.states.push((state.into(), config));
        self
    }

    /// Add an unguarded transition without actions.
    ///
    /// Follow with [`with_guards`](Self::with_guards) and
    /// [`with_actions`](Self::with_actions) to decorate it.
    pub fn add_transition(
        mut self,
        from: impl Into<State>,
        to: impl Into<State>,
        on: impl Into<Event>,
    ) -> Self {
        self.transitions.push(Transition::new(from, to, on));
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn push_transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Append guards to the most recently added transition.
    ///
    /// Ignored when no transition was added yet.
    pub fn with_guards<I>(mut self, guards: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Guard>>,
    {
        if let Some(last) = self.transitions.last_mut() {
            last.guards.extend(guards);
        }
        self
    }

    /// Append actions to the most recently added transition.
    ///
    /// Ignored when no transition was added yet.
    pub fn with_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Action>>,
    {
        if let Some(last) = self.transitions.last_mut() {
            last.actions.extend(actions);
        }
        self
    }

    /// Replace all global hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_success_hooks<I>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Action>>,
    {
        self.hooks.on_success.extend(hooks);
        self
    }

    pub fn with_failure_hooks<I>(mut self, hooks: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Action>>,
    {
        self.hooks.on_failure.extend(hooks);
        self
    }

    /// Build the definition.
    ///
    /// Fails on a missing initial state or an empty transition list before
    /// running graph validation.
    pub fn build(self) -> Result<Definition, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.transitions.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut states = Vec::with_capacity(self.states.len() + self.transitions.len() * 2 + 1);
        states.push((initial.clone(), StateConfig::default()));
        states.extend(
            self.finals
                .iter()
                .map(|s| (s.clone(), StateConfig::default())),
        );
        states.extend(self.states);
        for transition in &self.transitions {
            states.push((transition.from.clone(), StateConfig::default()));
            states.push((transition.to.clone(), StateConfig::default()));
        }

        let definition =
            Definition::new(initial, self.finals, states, self.transitions, self.hooks)?;
        Ok(definition)
    }
}
