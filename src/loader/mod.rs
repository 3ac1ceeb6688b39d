//! Declarative definitions loaded from YAML or JSON.
//!
//! Configuration refers to guards and actions by name; names are resolved
//! against a [`Registry`] and the result goes through the same validation as
//! any other definition.
//!
//! ```yaml
//! initialState: Draft
//! finalStates: [Approved, Rejected]
//! hooks:
//!   onSuccess: [audit]
//!   onFailure: [alert]
//! states:
//!   InReview:
//!     onEntry: [assignReviewer]
//!     onExit: [releaseReviewer]
//! transitions:
//!   - from: Draft
//!     to: InReview
//!     on: Submit
//!     actions: [notify]
//!   - { from: InReview, to: Approved, on: Approve, guards: [isManager] }
//!   - { from: InReview, to: Rejected, on: Reject }
//! ```
//!
//! Every state named as initial, final, under `states` or as a transition
//! endpoint is declared.

mod error;

pub use error::LoadError;

use crate::core::{Action, Guard, State};
use crate::definition::{Definition, Hooks, StateConfig, Transition};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Serialized form of a definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionConfig {
    #[serde(default)]
    pub initial_state: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_states: Vec<String>,

    #[serde(default)]
    pub hooks: HooksConfig,

    /// States with entry/exit actions. Iterated in name order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<String, StateActions>,

    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateActions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_entry: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_exit: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub from: String,
    pub to: String,
    pub on: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl DefinitionConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up every named guard and action and build the definition.
    pub fn resolve(&self, registry: &Registry) -> Result<Definition, LoadError> {
        if self.initial_state.is_empty() {
            return Err(LoadError::MissingInitialState);
        }
        if self.transitions.is_empty() {
            return Err(LoadError::NoTransitions);
        }

        let initial = State::from(self.initial_state.as_str());
        let finals: Vec<State> = self
            .final_states
            .iter()
            .map(|s| State::from(s.as_str()))
            .collect();

        let mut states: Vec<(State, StateConfig)> = Vec::new();
        states.push((initial.clone(), StateConfig::default()));
        states.extend(finals.iter().map(|s| (s.clone(), StateConfig::default())));

        for (name, actions) in &self.states {
            let config = StateConfig {
                on_entry: actions_for(registry, &actions.on_entry, || {
                    format!("on-entry of '{name}'")
                })?,
                on_exit: actions_for(registry, &actions.on_exit, || {
                    format!("on-exit of '{name}'")
                })?,
            };
            states.push((State::from(name.as_str()), config));
        }

        let mut transitions = Vec::with_capacity(self.transitions.len());
        for t in &self.transitions {
            let context = || format!("transition '{}' -> '{}' on '{}'", t.from, t.to, t.on);
            let guards = guards_for(registry, &t.guards, context)?;
            let actions = actions_for(registry, &t.actions, context)?;

            let transition = Transition {
                from: State::from(t.from.as_str()),
                to: State::from(t.to.as_str()),
                on: t.on.as_str().into(),
                guards,
                actions,
            };
            states.push((transition.from.clone(), StateConfig::default()));
            states.push((transition.to.clone(), StateConfig::default()));
            transitions.push(transition);
        }

        let hooks = Hooks {
            on_success: actions_for(registry, &self.hooks.on_success, || {
                "on-success hook".to_string()
            })?,
            on_failure: actions_for(registry, &self.hooks.on_failure, || {
                "on-failure hook".to_string()
            })?,
        };

        Ok(Definition::new(initial, finals, states, transitions, hooks)?)
    }
}

fn guards_for(
    registry: &Registry,
    names: &[String],
    context: impl Fn() -> String,
) -> Result<Vec<Arc<dyn Guard>>, LoadError> {
    names
        .iter()
        .map(|name| {
            registry.guard(name).ok_or_else(|| LoadError::UnknownGuard {
                name: name.clone(),
                context: context(),
            })
        })
        .collect()
}

fn actions_for(
    registry: &Registry,
    names: &[String],
    context: impl Fn() -> String,
) -> Result<Vec<Arc<dyn Action>>, LoadError> {
    names
        .iter()
        .map(|name| {
            registry.action(name).ok_or_else(|| LoadError::UnknownAction {
                name: name.clone(),
                context: context(),
            })
        })
        .collect()
}

/// Parse YAML and build a definition.
pub fn load_yaml_str(yaml: &str, registry: &Registry) -> Result<Definition, LoadError> {
    DefinitionConfig::from_yaml(yaml)?.resolve(registry)
}

/// Parse JSON (same schema as YAML) and build a definition.
pub fn load_json_str(json: &str, registry: &Registry) -> Result<Definition, LoadError> {
    DefinitionConfig::from_json(json)?.resolve(registry)
}

/// Read YAML from `reader` until EOF and build a definition.
pub fn load_yaml_reader<R: Read>(
    mut reader: R,
    registry: &Registry,
) -> Result<Definition, LoadError> {
    let mut yaml = String::new();
    reader.read_to_string(&mut yaml)?;
    load_yaml_str(&yaml, registry)
}

/// Load a YAML definition from a file.
pub fn load_yaml_file(
    path: impl AsRef<Path>,
    registry: &Registry,
) -> Result<Definition, LoadError> {
    let file = std::fs::File::open(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "loading definition");
    load_yaml_reader(std::io::BufReader::new(file), registry)
}
