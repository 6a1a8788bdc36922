//! Single-assignment, multi-reader value cells.
//!
//! Every entity field is exposed as a [`FieldFuture`]. A worker resolves it
//! exactly once; any number of threads may wait on it and all of them see the
//! same value. A resolved field holds either `Some(value)` or `None`, the
//! latter meaning "no value available" (lookup failed or data was missing).

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

enum State<T> {
    Pending,
    Ready(Option<T>),
}

struct Slot<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to a value that is resolved at most once.
///
/// Clones share the same cell.
pub struct FieldFuture<T> {
    slot: Arc<Slot<T>>,
}

impl<T> FieldFuture<T> {
    /// Create an unresolved cell.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Slot {
                state: Mutex::new(State::Pending),
                ready: Condvar::new(),
            }),
        }
    }

    /// Create a cell that is already resolved.
    pub fn resolved(value: Option<T>) -> Self {
        let future = Self::new();
        future.set(value);
        future
    }

    /// Resolve the cell, waking every waiter.
    ///
    /// The first call wins. Later calls leave the stored value untouched and
    /// return `false`, so checking [`is_set`](Self::is_set) and writing happen
    /// as one atomic step.
    pub fn set(&self, value: Option<T>) -> bool {
        let mut state = self.slot.lock();
        if let State::Ready(_) = *state {
            return false;
        }
        *state = State::Ready(value);
        drop(state);
        self.slot.ready.notify_all();
        true
    }

    /// Resolve the cell with the absent marker.
    pub fn set_absent(&self) -> bool {
        self.set(None)
    }

    /// Check whether the cell has been resolved, without blocking.
    pub fn is_set(&self) -> bool {
        matches!(*self.slot.lock(), State::Ready(_))
    }

    /// Check whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: Clone> FieldFuture<T> {
    /// Block until the cell is resolved and return its value.
    ///
    /// `None` is the absent marker. There is no timeout: the job owning this
    /// cell is responsible for resolving it on every path.
    pub fn get(&self) -> Option<T> {
        let mut state = self.slot.lock();
        loop {
            if let State::Ready(value) = &*state {
                return value.clone();
            }
            state = self
                .slot
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Return the value if the cell is resolved, without blocking.
    ///
    /// The outer `None` means "still pending".
    pub fn try_get(&self) -> Option<Option<T>> {
        match &*self.slot.lock() {
            State::Ready(value) => Some(value.clone()),
            State::Pending => None,
        }
    }

    /// Block for at most `timeout`.
    ///
    /// The outer `None` means the cell was still pending when time ran out.
    pub fn get_timeout(&self, timeout: Duration) -> Option<Option<T>> {
        let state = self.slot.lock();
        let (state, _) = self
            .slot
            .ready
            .wait_timeout_while(state, timeout, |s| matches!(s, State::Pending))
            .unwrap_or_else(PoisonError::into_inner);
        match &*state {
            State::Ready(value) => Some(value.clone()),
            State::Pending => None,
        }
    }
}

impl<T> Clone for FieldFuture<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for FieldFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for FieldFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.slot.lock() {
            State::Pending => f.write_str("FieldFuture(<pending>)"),
            State::Ready(value) => write!(f, "FieldFuture({:?})", value),
        }
    }
}
