//! Errors raised while loading declarative definitions.

use crate::definition::DefinitionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("initialState is required")]
    MissingInitialState,

    #[error("at least one transition is required")]
    NoTransitions,

    /// `context` names the transition, e.g. `transition 'Draft' -> 'InReview' on 'Submit'`.
    #[error("guard '{name}' for {context} not found in registry")]
    UnknownGuard { name: String, context: String },

    /// `context` says where the action was referenced, e.g. `on-entry of 'InReview'`.
    #[error("action '{name}' for {context} not found in registry")]
    UnknownAction { name: String, context: String },

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
