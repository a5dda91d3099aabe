// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The async->sync bridge (spec.md section 4.3).
//!
//! Installs a listener on an upstream [`AsyncPipe`] that pushes every item
//! onto a [`BoundedQueue`] as a [`QueueItem`]; the synchronous side pops with
//! a blocking wait and maps `End` -> terminator, `Error` -> typed error,
//! `Value` -> item. `peek()` pops at most once per advance and holds the
//! result in a [`PeekSlot`], which makes it non-destructive from the
//! consumer's point of view without needing a true peekable queue.

use super::bounded_queue::BoundedQueue;
use super::peek_slot::PeekSlot;
use sluice_domain::{AsyncPipe, Listener, Pipe, PipeError, QueueItem};
use std::sync::Arc;

struct QueueListener<T> {
    queue: Arc<BoundedQueue<QueueItem<T>>>,
}

impl<T: Send> Listener<T> for QueueListener<T> {
    fn on_next(&self, item: T) {
        self.queue.push(QueueItem::Value(item));
    }
    fn on_done(&self) {
        self.queue.push(QueueItem::End);
    }
    fn on_error(&self, err: PipeError) {
        self.queue.push(QueueItem::Error(err));
    }
}

/// Exposes an upstream [`AsyncPipe<T>`] as a pull-based [`Pipe<T>`].
pub struct AsyncToSync<T: Send + 'static> {
    upstream: Option<Box<dyn AsyncPipe<T>>>,
    queue: Arc<BoundedQueue<QueueItem<T>>>,
    slot: PeekSlot<T>,
    failed: Option<PipeError>,
}

impl<T: Send + 'static> AsyncToSync<T> {
    pub fn new(upstream: Box<dyn AsyncPipe<T>>, channel_depth: usize) -> Self {
        Self {
            upstream: Some(upstream),
            queue: Arc::new(BoundedQueue::new(channel_depth)),
            slot: PeekSlot::new(),
            failed: None,
        }
    }

    /// Pops the next item from the bridge queue into the peek slot, if it
    /// is not already filled. A closed queue (`pop_blocking` returning
    /// `None`, e.g. because `close()` raced a blocked pop) is treated the
    /// same as an upstream `End`.
    fn ensure_filled(&mut self) -> Result<(), PipeError> {
        if self.failed.is_some() || self.slot.is_exhausted() || self.slot.peek().is_some() {
            return Ok(());
        }
        match self.queue.pop_blocking() {
            Some(QueueItem::Value(v)) => self.slot.set(Some(v)),
            Some(QueueItem::End) | None => self.slot.set(None),
            Some(QueueItem::Error(e)) => {
                self.slot.set(None);
                self.failed = Some(e);
            }
        }
        Ok(())
    }
}

impl<T: Send + 'static> Pipe<T> for AsyncToSync<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        let mut upstream = self
            .upstream
            .take()
            .ok_or_else(|| PipeError::internal("AsyncToSync::start called twice"))?;
        upstream.set_listener(Box::new(QueueListener { queue: self.queue.clone() }));
        upstream.start()?;
        self.upstream = Some(upstream);
        self.ensure_filled()
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        self.ensure_filled()?;
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }
        Ok(self.slot.peek())
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        self.ensure_filled()?;
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }
        let ret = self.slot.take();
        if ret.is_some() {
            self.ensure_filled()?;
        }
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        if self.slot.is_exhausted() {
            1.0
        } else {
            0.0
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.queue.close();
        if let Some(mut upstream) = self.upstream.take() {
            upstream.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::pipe::sync_to_async::SyncToAsync;

    struct VecSource(std::vec::IntoIter<i32>);
    impl Pipe<i32> for VecSource {
        fn start(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
        fn peek(&mut self) -> Result<Option<&i32>, PipeError> {
            unimplemented!()
        }
        fn next(&mut self) -> Result<Option<i32>, PipeError> {
            Ok(self.0.next())
        }
        fn progress(&self) -> f64 {
            0.0
        }
        fn close(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
    }

    #[test]
    fn round_trips_items_in_order_per_source() {
        let bridge = SyncToAsync::new(vec![Box::new(VecSource(vec![1, 2, 3].into_iter()))]);
        let mut sync_pipe = AsyncToSync::new(Box::new(bridge), 2);
        sync_pipe.start().unwrap();
        assert_eq!(sync_pipe.next().unwrap(), Some(1));
        assert_eq!(sync_pipe.next().unwrap(), Some(2));
        assert_eq!(sync_pipe.next().unwrap(), Some(3));
        assert_eq!(sync_pipe.next().unwrap(), None);
        assert_eq!(sync_pipe.next().unwrap(), None);
        sync_pipe.close().unwrap();
    }

    #[test]
    fn peek_is_idempotent_before_next() {
        let bridge = SyncToAsync::new(vec![Box::new(VecSource(vec![10].into_iter()))]);
        let mut sync_pipe = AsyncToSync::new(Box::new(bridge), 2);
        sync_pipe.start().unwrap();
        assert_eq!(*sync_pipe.peek().unwrap().unwrap(), 10);
        assert_eq!(*sync_pipe.peek().unwrap().unwrap(), 10);
        assert_eq!(sync_pipe.next().unwrap(), Some(10));
        sync_pipe.close().unwrap();
    }
}
