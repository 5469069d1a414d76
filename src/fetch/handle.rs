//! Cancelable handle for one in-flight fetch.

use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a fetch handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The transport call is still in flight.
    Active,
    /// Canceled before completion; the callback will never fire.
    Canceled,
    /// The fetch completed (successfully or not) before any cancel.
    Completed,
}

/// Cancelable token representing one in-flight fetch.
///
/// Returned by [`ImageClient::fetch`](super::ImageClient::fetch) on a cache
/// miss. Cancellation is advisory and races with completion: whichever
/// transition happens first wins, and the losing side is a no-op. A handle
/// canceled while still active suppresses its callback entirely; a completed
/// handle is never canceled retroactively.
///
/// The handle is cloneable; all clones refer to the same fetch.
#[derive(Clone)]
pub struct FetchHandle {
    state: Arc<Mutex<HandleState>>,
    token: CancellationToken,
}

impl FetchHandle {
    /// Creates a new active handle.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(HandleState::Active)),
            token: CancellationToken::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> HandleState {
        *self.state.lock().unwrap()
    }

    /// Returns true if the fetch is still in flight.
    pub fn is_active(&self) -> bool {
        self.state() == HandleState::Active
    }

    /// Cancels the fetch if it has not completed yet.
    ///
    /// Canceling an already-completed (or already-canceled) handle is a
    /// no-op.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if *state == HandleState::Active {
            *state = HandleState::Canceled;
            self.token.cancel();
        }
    }

    /// Token the fetch task races against its transport call.
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Attempts the Active → Completed transition.
    ///
    /// Returns false if the handle was canceled first, in which case the
    /// completion must be suppressed.
    pub(crate) fn try_complete(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == HandleState::Active {
            *state = HandleState::Completed;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandle")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_starts_active() {
        let handle = FetchHandle::new();
        assert_eq!(handle.state(), HandleState::Active);
        assert!(handle.is_active());
    }

    #[test]
    fn test_cancel_transitions_to_canceled() {
        let handle = FetchHandle::new();
        handle.cancel();
        assert_eq!(handle.state(), HandleState::Canceled);
        assert!(handle.token().is_cancelled());
    }

    #[test]
    fn test_complete_transitions_to_completed() {
        let handle = FetchHandle::new();
        assert!(handle.try_complete());
        assert_eq!(handle.state(), HandleState::Completed);
    }

    #[test]
    fn test_cancel_after_complete_is_noop() {
        let handle = FetchHandle::new();
        assert!(handle.try_complete());

        handle.cancel();
        assert_eq!(handle.state(), HandleState::Completed);
        assert!(!handle.token().is_cancelled());
    }

    #[test]
    fn test_complete_after_cancel_is_suppressed() {
        let handle = FetchHandle::new();
        handle.cancel();

        assert!(!handle.try_complete());
        assert_eq!(handle.state(), HandleState::Canceled);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = FetchHandle::new();
        let other = handle.clone();

        handle.cancel();
        assert_eq!(other.state(), HandleState::Canceled);
    }
}
