//! Cancellation for a download run: explicit cancel plus optional deadline.
//!
//! A `CancelToken` is handed to the engine by the caller. Every part worker
//! gets a child token, so the orchestrator can stop a subset of parts while
//! a cancel on the root still reaches all of them. Retry delays sleep on the
//! token and wake as soon as it is cancelled.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

#[derive(Default)]
struct State {
    cancelled: bool,
    children: Vec<Weak<Inner>>,
}

struct Inner {
    state: Mutex<State>,
    wake: Condvar,
    deadline: Option<Instant>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned flag is still a valid flag.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Shared cancellation handle. Cloning yields another handle to the same token.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Token without a deadline; only `cancel()` stops it.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Token that reports cancelled once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout))
    }

    fn build(deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                wake: Condvar::new(),
                deadline,
            }),
        }
    }

    /// New token that is cancelled when this one is (or when cancelled itself).
    /// Inherits the deadline.
    pub fn child(&self) -> CancelToken {
        let child = Self::build(self.inner.deadline);
        let mut state = self.inner.lock();
        if state.cancelled {
            child.inner.lock().cancelled = true;
        } else {
            state.children.retain(|w| w.strong_count() > 0);
            state.children.push(Arc::downgrade(&child.inner));
        }
        child
    }

    /// Cancel this token and every child created from it.
    pub fn cancel(&self) {
        cancel_inner(&self.inner);
    }

    /// True once `cancel()` was called (here or on an ancestor) or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.lock().cancelled {
            return true;
        }
        self.deadline_passed()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    fn deadline_passed(&self) -> bool {
        self.inner
            .deadline
            .map(|d| Instant::now() >= d)
            .unwrap_or(false)
    }

    /// Sleep for `dur` unless cancelled first. Returns `true` if the full
    /// duration elapsed, `false` if the token was (or became) cancelled.
    pub fn sleep(&self, dur: Duration) -> bool {
        // `None` when `dur` is too large to represent: wait for cancel only.
        let wake_at = Instant::now().checked_add(dur);
        let mut state = self.inner.lock();
        loop {
            if state.cancelled {
                return false;
            }
            let now = Instant::now();
            if let Some(deadline) = self.inner.deadline {
                if now >= deadline {
                    return false;
                }
            }
            if wake_at.is_some_and(|w| now >= w) {
                return true;
            }
            let until = match (wake_at, self.inner.deadline) {
                (Some(w), Some(d)) => Some(w.min(d)),
                (w, d) => w.or(d),
            };
            state = match until {
                Some(until) => {
                    self.inner
                        .wake
                        .wait_timeout(state, until - now)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
                None => self
                    .inner
                    .wake
                    .wait(state)
                    .unwrap_or_else(|e| e.into_inner()),
            };
        }
    }
}

fn cancel_inner(inner: &Arc<Inner>) {
    let children = {
        let mut state = inner.lock();
        if state.cancelled {
            return;
        }
        state.cancelled = true;
        std::mem::take(&mut state.children)
    };
    inner.wake.notify_all();
    for child in children.iter().filter_map(Weak::upgrade) {
        cancel_inner(&child);
    }
}
