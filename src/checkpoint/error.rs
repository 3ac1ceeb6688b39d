//! Checkpoint error types.

use crate::runtime::RestoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint serialization failed: {0}")]
    SerializationFailed(String),

    #[error("checkpoint deserialization failed: {0}")]
    DeserializationFailed(String),

    /// The checkpoint was written by an incompatible format version.
    #[error("unsupported checkpoint version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid checkpoint: {0}")]
    ValidationFailed(String),

    /// The snapshot decoded fine but does not fit the definition.
    #[error(transparent)]
    Restore(#[from] RestoreError),
}
