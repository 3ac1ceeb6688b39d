//! Guard predicates for controlling transitions.
//!
//! A guard gates one candidate transition. Rejection is ordinary control
//! flow: the engine simply moves on to the next candidate.

use super::machine_state::{MachineState, Payload};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Predicate that determines if a candidate transition may run.
///
/// Guards should not have side effects: a guard that passes may still be
/// followed by a failing action, and a rejected candidate leaves no trace.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{Guard, MachineState, Payload};
/// use tokio_util::sync::CancellationToken;
///
/// struct IsManager {
///     role: String,
/// }
///
/// impl Guard for IsManager {
///     fn check(&self, _: &CancellationToken, _: &dyn MachineState, _: Payload<'_>) -> bool {
///         self.role == "manager"
///     }
/// }
/// ```
pub trait Guard: Send + Sync {
    /// Return `true` to allow the transition.
    fn check(
        &self,
        token: &CancellationToken,
        state: &dyn MachineState,
        payload: Payload<'_>,
    ) -> bool;
}

/// Guard backed by a closure. Build one with [`guard_fn`].
pub struct FnGuard<F> {
    predicate: F,
}

impl<F> Guard for FnGuard<F>
where
    F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> bool + Send + Sync,
{
    fn check(
        &self,
        token: &CancellationToken,
        state: &dyn MachineState,
        payload: Payload<'_>,
    ) -> bool {
        (self.predicate)(token, state, payload)
    }
}

/// Create a shareable guard from a closure.
///
/// # Example
///
/// ```rust
/// use nfaflow::core::{guard_fn, payload_as};
///
/// // Only allow the transition when the payload carries a positive amount.
/// let positive = guard_fn(|_, _, payload| {
///     payload_as::<i64>(payload).is_some_and(|amount| *amount > 0)
/// });
/// # let _ = positive;
/// ```
pub fn guard_fn<F>(predicate: F) -> Arc<dyn Guard>
where
    F: Fn(&CancellationToken, &dyn MachineState, Payload<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(FnGuard { predicate })
}
