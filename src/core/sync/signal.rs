/*!
 * One-Shot Wait Signal
 *
 * Multi-observer completion built on parking_lot::Condvar for threads and
 * tokio::sync::Notify for tasks.
 *
 * # Design: Sticky Broadcast
 *
 * The fired state lives under the signal's own mutex and is never reset.
 * Waiters check it under that mutex before parking, so a fire that lands
 * between "registered" and "parked" is still observed. One fire wakes every
 * waiter, parked thread or pending future.
 *
 * The waiter count is maintained by the owner of the signal (the delay map
 * joins and leaves under its own lock); the signal only reads it to report
 * how many waiters a fire reached.
 */

use super::wake::{WakeReason, WakeResult};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Pending,
    Fired(WakeReason),
}

impl SignalState {
    #[inline(always)]
    fn reason(self) -> Option<WakeReason> {
        match self {
            SignalState::Pending => None,
            SignalState::Fired(reason) => Some(reason),
        }
    }
}

/// Shared wake descriptor for every reader blocked on one key
pub struct WaitSignal {
    state: Mutex<SignalState>,
    condvar: Condvar,
    notify: Notify,
    waiters: AtomicUsize,
}

impl WaitSignal {
    /// Create an unfired signal with no waiters
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SignalState::Pending),
            condvar: Condvar::new(),
            notify: Notify::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Register one more waiter, returning the new count
    #[inline]
    pub fn join(&self) -> usize {
        self.waiters.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Deregister a waiter, returning how many remain
    ///
    /// Must pair with a prior `join`.
    #[inline]
    pub fn leave(&self) -> usize {
        let prev = self.waiters.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "leave without join");
        prev.saturating_sub(1)
    }

    /// Current number of joined waiters
    #[inline]
    pub fn waiters(&self) -> usize {
        self.waiters.load(Ordering::Acquire)
    }

    /// Fire the signal, waking every thread and task waiting on it
    ///
    /// Only the first fire takes effect; later fires report `NoWaiters`.
    pub fn fire(&self, reason: WakeReason) -> WakeResult {
        {
            let mut state = self.state.lock();
            if *state != SignalState::Pending {
                return WakeResult::NoWaiters;
            }
            *state = SignalState::Fired(reason);
        }

        self.condvar.notify_all();
        self.notify.notify_waiters();

        match self.waiters() {
            0 => WakeResult::NoWaiters,
            n => WakeResult::Woken(n),
        }
    }

    /// Reason the signal fired, or `None` while pending
    #[inline]
    pub fn reason(&self) -> Option<WakeReason> {
        self.state.lock().reason()
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.reason().is_some()
    }

    /// Park the calling thread until fired or `deadline` passes
    ///
    /// `None` deadline waits until fired. Returns the fire reason, or `None`
    /// on timeout. A fire racing the deadline is reported as fired.
    pub fn wait_until(&self, deadline: Option<Instant>) -> Option<WakeReason> {
        let mut state = self.state.lock();
        loop {
            if let Some(reason) = state.reason() {
                return Some(reason);
            }

            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut state, deadline).timed_out() {
                        return state.reason();
                    }
                }
                None => self.condvar.wait(&mut state),
            }
        }
    }

    /// Await the signal from a tokio task until fired or `deadline` passes
    ///
    /// Same contract as `wait_until`. The notification is armed before the
    /// fired state is checked, so a concurrent fire cannot slip between them.
    pub async fn wait_async(&self, deadline: Option<Instant>) -> Option<WakeReason> {
        let deadline = deadline.map(tokio::time::Instant::from_std);

        loop {
            let mut notified = std::pin::pin!(self.notify.notified());
            notified.as_mut().enable();

            if let Some(reason) = self.reason() {
                return Some(reason);
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return self.reason();
                    }
                }
                None => notified.await,
            }
        }
    }
}

impl Default for WaitSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WaitSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitSignal")
            .field("state", &*self.state.lock())
            .field("waiters", &self.waiters())
            .finish()
    }
}
