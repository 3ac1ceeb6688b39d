//! Named guards and actions for declarative definitions.
//!
//! The registry is only consulted while loading a definition from
//! configuration; running machines never look anything up by name.

use crate::core::{Action, Guard};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What kind of collaborator a registry entry is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Guard,
    Action,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guard => f.write_str("guard"),
            Self::Action => f.write_str("action"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: EntryKind },

    #[error("{kind} '{name}' is already registered")]
    AlreadyRegistered { kind: EntryKind, name: String },
}

/// Thread-safe lookup table from names to guards and actions.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{action_fn, guard_fn};
/// use nfaflow::registry::Registry;
///
/// let registry = Registry::new();
/// registry.register_guard("isManager", guard_fn(|_, _, _| true)).unwrap();
/// registry.register_action("notify", action_fn(|_, _, _| Ok(()))).unwrap();
///
/// assert!(registry.guard("isManager").is_some());
/// assert!(registry.action("missing").is_none());
/// ```
#[derive(Default)]
pub struct Registry {
    guards: RwLock<HashMap<String, Arc<dyn Guard>>>,
    actions: RwLock<HashMap<String, Arc<dyn Action>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_guard(
        &self,
        name: impl Into<String>,
        guard: Arc<dyn Guard>,
    ) -> Result<(), RegistryError> {
        insert(&self.guards, EntryKind::Guard, name.into(), guard)
    }

    pub fn register_action(
        &self,
        name: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> Result<(), RegistryError> {
        insert(&self.actions, EntryKind::Action, name.into(), action)
    }

    pub fn guard(&self, name: &str) -> Option<Arc<dyn Guard>> {
        self.guards.read().get(name).cloned()
    }

    pub fn action(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.read().get(name).cloned()
    }

    /// Registered guard names, sorted.
    pub fn guard_names(&self) -> Vec<String> {
        sorted_keys(&self.guards.read())
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<String> {
        sorted_keys(&self.actions.read())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("guards", &self.guard_names())
            .field("actions", &self.action_names())
            .finish()
    }
}

fn insert<T: ?Sized>(
    table: &RwLock<HashMap<String, Arc<T>>>,
    kind: EntryKind,
    name: String,
    value: Arc<T>,
) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName { kind });
    }

    let mut table = table.write();
    if table.contains_key(&name) {
        return Err(RegistryError::AlreadyRegistered { kind, name });
    }

    tracing::debug!(%kind, %name, "registered");
    table.insert(name, value);
    Ok(())
}

fn sorted_keys<T: ?Sized>(table: &HashMap<String, Arc<T>>) -> Vec<String> {
    let mut names: Vec<String> = table.keys().cloned().collect();
    names.sort();
    names
}
