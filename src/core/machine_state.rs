//! Read-only view of a running machine handed to guards and actions.

use super::history::HistoryEntry;
use super::state::State;
use std::any::Any;
use std::sync::Arc;

/// Caller-owned business object attached to a machine.
///
/// The engine never inspects or mutates it. Collaborators that need to
/// mutate it must put their own interior mutability inside.
pub type StateExtender = Arc<dyn Any + Send + Sync>;

/// Opaque per-call data passed to [`Machine::fire`](crate::runtime::Machine::fire).
pub type Payload<'a> = Option<&'a dyn Any>;

/// Read-only capability describing a machine's current situation.
///
/// Guards, actions and hooks receive a `&dyn MachineState` so they can
/// observe context without being able to change the machine.
pub trait MachineState {
    /// The state the machine is in.
    ///
    /// While actions of a transition run, this is still the source state:
    /// the machine only moves once every action succeeded.
    fn current_state(&self) -> State;

    /// Copy of the committed transition history.
    fn history(&self) -> Vec<HistoryEntry>;

    /// Whether the current state is one of the definition's final states.
    fn is_in_final_state(&self) -> bool;

    /// The attached business object.
    fn state_extender(&self) -> &StateExtender;
}

impl dyn MachineState + '_ {
    /// Downcast the attached business object.
    ///
    /// Returns `None` when the object is not a `T`.
    pub fn extension<T: Any>(&self) -> Option<&T> {
        (**self.state_extender()).downcast_ref::<T>()
    }
}

/// Downcast a payload to a concrete type.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{payload_as, Payload};
///
/// let reviewer = String::from("alice");
/// let payload: Payload<'_> = Some(&reviewer);
///
/// assert_eq!(payload_as::<String>(payload).map(String::as_str), Some("alice"));
/// assert!(payload_as::<u32>(payload).is_none());
/// assert!(payload_as::<String>(None).is_none());
/// ```
pub fn payload_as<T: Any>(payload: Payload<'_>) -> Option<&T> {
    payload.and_then(|value| value.downcast_ref::<T>())
}

/// Wrap a business object as a [`StateExtender`].
pub fn extender<T: Any + Send + Sync>(value: T) -> StateExtender {
    Arc::new(value)
}

/// Extender for machines that carry no business object.
pub fn no_extender() -> StateExtender {
    Arc::new(())
}
