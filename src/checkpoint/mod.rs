//! Checkpoint and resume support for machines.
//!
//! A [`Snapshot`] is the only serializable projection of a machine: its
//! current state and history. Guards, actions and the extension object are
//! not part of it; they are supplied again when resuming with
//! [`Machine::restore`](crate::runtime::Machine::restore).
//!
//! [`Checkpoint`] wraps a snapshot in a versioned envelope with JSON and
//! binary encodings. Where the bytes go is up to the caller.

use crate::core::{HistoryEntry, State, StateExtender, StateHistory};
use crate::definition::Definition;
use crate::runtime::Machine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Current state and history of a machine.
///
/// Serializes as `{"currentState": "...", "history": [{"from", "to", "on", "timestamp"}]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_state: State,
    #[serde(default)]
    pub history: StateHistory,
}

impl Snapshot {
    pub fn new(current_state: State, history: Vec<HistoryEntry>) -> Self {
        Self {
            current_state,
            history: history.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }
}

/// Versioned, identified envelope around a [`Snapshot`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    pub snapshot: Snapshot,
}

impl Checkpoint {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            snapshot,
        }
    }

    /// Pretty-printed JSON, for storage that humans may inspect.
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary encoding.
    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Resume a machine from this checkpoint.
    pub fn restore(
        self,
        definition: Arc<Definition>,
        extender: StateExtender,
    ) -> Result<Machine, CheckpointError> {
        tracing::debug!(checkpoint = %self.id, version = self.version, "resuming from checkpoint");
        Ok(Machine::restore(definition, Some(self.snapshot), extender)?)
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        if self.snapshot.current_state.is_empty() {
            return Err(CheckpointError::ValidationFailed(
                "snapshot current state is empty".to_string(),
            ));
        }
        Ok(())
    }
}
