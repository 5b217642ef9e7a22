//! crates/chunk_view_core/src/coordinator.rs
//!
//! A single shared slot for "the" pending destructive action of a list.
//!
//! Every row of a list holds a clone of the same `DeferredActionCoordinator`.
//! A row registers its deletion as a deferred action and raises the shared
//! confirmation surface; the surface later confirms (runs the action once) or
//! cancels (drops it unrun).

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// A zero-argument deferred operation.
pub type DeferredAction = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

enum PendingSlot {
    Empty,
    Pending(DeferredAction),
}

struct CoordinatorState {
    slot: PendingSlot,
    confirmation_visible: bool,
}

/// Holds at most one pending action plus the confirmation surface's
/// visibility flag.
///
/// Registration is last-writer-wins: a new action silently replaces an
/// unconfirmed previous one without running it.
#[derive(Clone)]
pub struct DeferredActionCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
}

impl Default for DeferredActionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredActionCoordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordinatorState {
                slot: PendingSlot::Empty,
                confirmation_visible: false,
            })),
        }
    }

    /// Stores `action`, discarding any previously stored action unrun.
    pub fn register_pending_action<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let deferred: DeferredAction = Box::new(move || action().boxed());
        let mut state = lock(&self.state);
        if matches!(state.slot, PendingSlot::Pending(_)) {
            debug!("Replacing an unconfirmed pending action");
        }
        state.slot = PendingSlot::Pending(deferred);
    }

    /// Raises the confirmation surface.
    ///
    /// Returns `false` and leaves the surface hidden when nothing is pending.
    pub fn request_confirmation(&self) -> bool {
        let mut state = lock(&self.state);
        let pending = matches!(state.slot, PendingSlot::Pending(_));
        if pending {
            state.confirmation_visible = true;
        } else {
            debug!("Confirmation requested with no pending action");
        }
        pending
    }

    /// Runs the pending action exactly once and clears the slot.
    ///
    /// Returns whether an action was run; with nothing pending this is a no-op.
    pub async fn confirm(&self) -> bool {
        let action = {
            let mut state = lock(&self.state);
            state.confirmation_visible = false;
            std::mem::replace(&mut state.slot, PendingSlot::Empty)
        };
        match action {
            PendingSlot::Pending(action) => {
                action().await;
                true
            }
            PendingSlot::Empty => false,
        }
    }

    /// Drops the pending action without running it.
    ///
    /// Returns whether an action was discarded.
    pub fn cancel(&self) -> bool {
        let mut state = lock(&self.state);
        state.confirmation_visible = false;
        let discarded = std::mem::replace(&mut state.slot, PendingSlot::Empty);
        matches!(discarded, PendingSlot::Pending(_))
    }

    pub fn has_pending_action(&self) -> bool {
        matches!(lock(&self.state).slot, PendingSlot::Pending(_))
    }

    pub fn is_confirmation_visible(&self) -> bool {
        lock(&self.state).confirmation_visible
    }
}

/// Locks a view mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
