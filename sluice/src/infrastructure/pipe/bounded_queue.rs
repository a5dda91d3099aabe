// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A bounded, blocking, multi-producer/multi-consumer queue used on every
//! sync<->async bridge and by the enqueuing sharder (spec.md sections 4.3,
//! 4.4.16).
//!
//! Built on `Mutex` + `Condvar` rather than `crossbeam_channel` so that
//! `close()` can force-wake blocked producers and consumers deterministically
//! (spec.md section 9's open question about `AsyncToSyncPipe.peek()`:
//! "implementations may choose a condition variable instead" of a polling
//! loop).

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A bounded FIFO queue. `push` blocks while full; `pop_blocking` blocks
/// while empty. `close()` wakes every waiter; waiters observe it via
/// [`BoundedQueue::is_closed`].
pub struct BoundedQueue<T> {
    inner: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    /// Blocks while the queue is full. Returns immediately (without pushing)
    /// if the queue has been closed.
    pub fn push(&self, item: T) {
        let mut state = self.inner.lock().unwrap();
        while state.items.len() >= self.capacity && !state.closed {
            state = self.not_full.wait(state).unwrap();
        }
        if state.closed {
            return;
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available or the queue is closed, in which
    /// case `None` is returned.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.inner.lock().unwrap();
        while state.items.is_empty() && !state.closed {
            state = self.not_empty.wait(state).unwrap();
        }
        let item = state.items.pop_front();
        drop(state);
        self.not_full.notify_one();
        item
    }

    /// Wakes every blocked producer and consumer without draining the
    /// queue; subsequent `pop_blocking` calls still drain what remains
    /// before observing closure via `None`.
    pub fn close(&self) {
        let mut state = self.inner.lock().unwrap();
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
