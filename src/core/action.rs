//! Side-effecting actions run during transitions and as global hooks.

use super::machine_state::{MachineState, Payload};
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Error returned by an [`Action`].
///
/// The engine never inspects it beyond wrapping it with the phase it
/// occurred in.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error with context.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Operation executed on state exit, on a transition, on state entry, or
/// as a success/failure hook.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{Action, ActionError, MachineState, Payload};
/// use std::sync::Mutex;
/// use tokio_util::sync::CancellationToken;
///
/// struct Document {
///     reviewer: Mutex<Option<String>>,
/// }
///
/// struct AssignReviewer;
///
/// impl Action for AssignReviewer {
///     fn execute(
///         &self,
///         _: &CancellationToken,
///         state: &dyn MachineState,
///         _: Payload<'_>,
///     ) -> Result<(), ActionError> {
///         let doc = state
///             .extension::<Document>()
///             .ok_or_else(|| ActionError::new("expected a Document"))?;
///         *doc.reviewer.lock().unwrap() = Some("John Doe".to_string());
///         Ok(())
///     }
/// }
/// ```
pub trait Action: Send + Sync {
    fn execute(
        &self,
        token: &CancellationToken,
        state: &dyn MachineState,
        payload: Payload<'_>,
    ) -> Result<(), ActionError>;
}

/// Action backed by a closure. Build one with [`action_fn`].
pub struct FnAction<F> {
    effect: F,
}

impl<F> Action for FnAction<F>
where
    F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> Result<(), ActionError>
        + Send
        + Sync,
{
    fn execute(
        &self,
        token: &CancellationToken,
        state: &dyn MachineState,
        payload: Payload<'_>,
    ) -> Result<(), ActionError> {
        (self.effect)(token, state, payload)
    }
}

/// Create a shareable action from a closure.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::action_fn;
///
/// let notify = action_fn(|_, state, _| {
///     println!("leaving {}", state.current_state());
///     Ok(())
/// });
/// # let _ = notify;
/// ```
pub fn action_fn<F>(effect: F) -> Arc<dyn Action>
where
    F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> Result<(), ActionError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnAction { effect })
}
