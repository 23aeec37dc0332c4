use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

thread_local! {
    /// Gate whose critical section the current thread is running, if any.
    static HOLDING: Cell<usize> = const { Cell::new(0) };
}

/// Cancellation for one poll session.
///
/// Store writes and sink events run inside [`SessionCancel::unless_cancelled`];
/// [`SessionCancel::cancel`] waits for one that is already running, so nothing
/// is written or emitted once `cancel` has returned, whichever thread calls it.
#[derive(Clone, Default)]
pub(crate) struct SessionCancel {
    token: CancellationToken,
    gate: Arc<Mutex<()>>,
}

impl SessionCancel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
        // A sink that cancels its own session from inside `emit` already
        // holds the gate on this thread.
        if HOLDING.with(Cell::get) != self.id() {
            drop(self.gate.lock().unwrap_or_else(PoisonError::into_inner));
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Runs `act` unless the session is already cancelled.
    pub(crate) fn unless_cancelled<T>(&self, act: impl FnOnce() -> T) -> Option<T> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if self.token.is_cancelled() {
            return None;
        }
        let _holding = Holding::enter(self.id());
        Some(act())
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.gate) as usize
    }
}

struct Holding {
    previous: usize,
}

impl Holding {
    fn enter(id: usize) -> Self {
        Self {
            previous: HOLDING.with(|holding| holding.replace(id)),
        }
    }
}

impl Drop for Holding {
    fn drop(&mut self) {
        HOLDING.with(|holding| holding.set(self.previous));
    }
}
