//! Pending-call table.
//!
//! Maps each in-flight [`CallId`] to the channel its caller is waiting on.
//! Every entry leaves the table exactly once: completed by its response,
//! failed on teardown, or removed by the caller giving up.
//!
//! Once closed, the table refuses new entries, so a call can never be
//! registered after the read loop has already failed everything.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::CallId;
use crate::protocol::Response;

// ============================================================================
// Types
// ============================================================================

/// Completion channel for one call.
pub(crate) type Completion = oneshot::Sender<Result<Response>>;

#[derive(Default)]
struct TableState {
    calls: FxHashMap<CallId, Completion>,
    closed: bool,
}

// ============================================================================
// PendingCalls
// ============================================================================

/// Correlation table shared by callers, the writer and the read loop.
pub(crate) struct PendingCalls {
    state: Mutex<TableState>,
    limit: Option<usize>,
}

impl PendingCalls {
    /// Creates an open, empty table with an optional size limit.
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            state: Mutex::new(TableState::default()),
            limit,
        }
    }

    /// Registers a call.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the table has been closed
    /// - [`Error::Protocol`] if the pending limit is reached
    pub(crate) fn insert(&self, id: CallId, completion: Completion) -> Result<()> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(Error::ConnectionClosed);
        }

        if let Some(limit) = self.limit
            && state.calls.len() >= limit
        {
            warn!(pending = state.calls.len(), max = limit, "Too many pending calls");
            return Err(Error::protocol(format!(
                "Too many pending calls: {}/{}",
                state.calls.len(),
                limit
            )));
        }

        state.calls.insert(id, completion);
        Ok(())
    }

    /// Completes the call matching `response.id`.
    ///
    /// Returns `false` if no such call is pending.
    pub(crate) fn complete(&self, response: Response) -> bool {
        let Some(tx) = self.state.lock().calls.remove(&response.id) else {
            return false;
        };
        // The caller may have stopped waiting; that is not our concern.
        let _ = tx.send(Ok(response));
        true
    }

    /// Fails a single call with `error`.
    pub(crate) fn fail(&self, id: CallId, error: Error) -> bool {
        let Some(tx) = self.state.lock().calls.remove(&id) else {
            return false;
        };
        let _ = tx.send(Err(error));
        true
    }

    /// Removes a call without completing it.
    pub(crate) fn remove(&self, id: CallId) -> bool {
        self.state.lock().calls.remove(&id).is_some()
    }

    /// Closes the table and fails every pending call with
    /// [`Error::ConnectionClosed`].
    ///
    /// Returns how many calls were failed. Idempotent.
    pub(crate) fn close(&self) -> usize {
        let drained: Vec<_> = {
            let mut state = self.state.lock();
            state.closed = true;
            state.calls.drain().collect()
        };

        let count = drained.len();
        for (_, tx) in drained {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending calls on close");
        }
        count
    }

    /// Returns the number of pending calls.
    pub(crate) fn len(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Returns `true` once [`close`](Self::close) has run.
    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

// ============================================================================
// PendingGuard
// ============================================================================

/// Removes a call from the table when its waiter goes away.
///
/// Covers timeouts and futures dropped mid-await. Removing an entry that
/// was already completed is a no-op.
pub(crate) struct PendingGuard<'a> {
    pending: &'a PendingCalls,
    id: CallId,
}

impl<'a> PendingGuard<'a> {
    pub(crate) const fn new(pending: &'a PendingCalls, id: CallId) -> Self {
        Self { pending, id }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
