// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Enqueuing sharder (spec.md section 4.4.16): fans an async input out to
//! `k` bounded blocking queues by a selector. After the upstream's
//! `done()`, a success sentinel is pushed into every queue; on `error()`,
//! an error sentinel is pushed into every queue and the error is re-raised
//! to the caller of `run()`/`start_async()`.

use crate::infrastructure::pipe::BoundedQueue;
use sluice_domain::{AsyncPipe, Listener, PipeError};
use std::sync::Arc;
use std::thread::JoinHandle;

/// One slot delivered on a consumer queue: an item, or a terminal sentinel.
pub enum Delivery<T> {
    Item(T),
    Done,
    Error(PipeError),
}

struct EnqueuingListener<T> {
    queues: Vec<Arc<BoundedQueue<Delivery<T>>>>,
    selector: Box<dyn Fn(&T) -> usize + Send + Sync>,
}

impl<T: Send> Listener<T> for EnqueuingListener<T> {
    fn on_next(&self, item: T) {
        let idx = (self.selector)(&item) % self.queues.len().max(1);
        self.queues[idx].push(Delivery::Item(item));
    }

    fn on_done(&self) {
        for q in &self.queues {
            q.push(Delivery::Done);
        }
    }

    fn on_error(&self, err: PipeError) {
        for q in &self.queues {
            q.push(Delivery::Error(err.clone()));
        }
    }
}

/// Sends each item of an [`AsyncPipe`] to one of `k` bounded queues chosen
/// by `selector`. Queues are consumed independently by the caller; `run()`
/// blocks the calling thread until the upstream finishes, `start_async()`
/// spawns that wait on a background thread instead so queue consumers on
/// the caller's own thread don't deadlock against it.
pub struct EnqueuingSharder<T> {
    upstream: Box<dyn AsyncPipe<T>>,
    queues: Vec<Arc<BoundedQueue<Delivery<T>>>>,
}

impl<T: Send + 'static> EnqueuingSharder<T> {
    pub fn new(upstream: Box<dyn AsyncPipe<T>>, k: usize, queue_capacity: usize) -> Self {
        let k = k.max(1);
        Self {
            upstream,
            queues: (0..k).map(|_| Arc::new(BoundedQueue::new(queue_capacity))).collect(),
        }
    }

    pub fn queues(&self) -> &[Arc<BoundedQueue<Delivery<T>>>] {
        &self.queues
    }

    /// Starts the upstream and blocks until it reaches a terminal state,
    /// having already delivered every item and the closing sentinel to the
    /// consumer queues.
    pub fn run(mut self, selector: impl Fn(&T) -> usize + Send + Sync + 'static) -> Result<(), PipeError> {
        self.start(selector)?.join()
    }

    /// Starts the upstream without blocking; returns a handle whose
    /// `join()` waits for the terminal sentinel to finish propagating.
    /// Use this when queue consumers run on the same thread that would
    /// otherwise call `run()`, to avoid a producer/consumer deadlock.
    pub fn start(mut self, selector: impl Fn(&T) -> usize + Send + Sync + 'static) -> Result<EnqueuingHandle, PipeError> {
        let listener = EnqueuingListener {
            queues: self.queues.clone(),
            selector: Box::new(selector),
        };
        self.upstream.set_listener(Box::new(listener));
        self.upstream.start()?;
        let mut upstream = self.upstream;
        let handle = std::thread::spawn(move || upstream.close());
        Ok(EnqueuingHandle { handle })
    }
}

/// A background handle for [`EnqueuingSharder::start`]; `join()` waits for
/// the upstream to fully close and surfaces any close-time error.
pub struct EnqueuingHandle {
    handle: JoinHandle<Result<(), PipeError>>,
}

impl EnqueuingHandle {
    pub fn join(self) -> Result<(), PipeError> {
        self.handle.join().map_err(|_| PipeError::internal("enqueuing sharder upstream thread panicked"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;
    use crate::infrastructure::pipe::SyncToAsync;
    use sluice_domain::Pipe;

    #[test]
    fn distributes_items_to_the_selected_queue_then_closes_every_queue() {
        let sources: Vec<Box<dyn Pipe<i32> + Send>> = vec![Box::new(VecSource::new(vec![0, 1, 2, 3, 4, 5]))];
        let upstream = SyncToAsync::new(sources);
        let sharder = EnqueuingSharder::new(Box::new(upstream), 2, 16);
        let queues: Vec<_> = sharder.queues().to_vec();
        sharder.run(|n: &i32| (*n % 2) as usize).unwrap();

        for (idx, queue) in queues.iter().enumerate() {
            let mut items = Vec::new();
            loop {
                match queue.pop_blocking() {
                    Some(Delivery::Item(n)) => {
                        assert_eq!((n % 2) as usize, idx);
                        items.push(n);
                    }
                    Some(Delivery::Done) => break,
                    Some(Delivery::Error(e)) => panic!("unexpected error: {e}"),
                    None => panic!("queue closed before a terminal sentinel arrived"),
                }
            }
            items.sort();
            if idx == 0 {
                assert_eq!(items, vec![0, 2, 4]);
            } else {
                assert_eq!(items, vec![1, 3, 5]);
            }
        }
    }

    struct FailingSource;

    impl Pipe<i32> for FailingSource {
        fn start(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
        fn peek(&mut self) -> Result<Option<&i32>, PipeError> {
            Err(PipeError::internal("boom"))
        }
        fn next(&mut self) -> Result<Option<i32>, PipeError> {
            Err(PipeError::internal("boom"))
        }
        fn progress(&self) -> f64 {
            0.0
        }
        fn close(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
    }

    #[test]
    fn an_upstream_error_is_broadcast_to_every_queue_and_re_raised() {
        let sources: Vec<Box<dyn Pipe<i32> + Send>> = vec![Box::new(FailingSource)];
        let upstream = SyncToAsync::new(sources);
        let sharder = EnqueuingSharder::new(Box::new(upstream), 3, 4);
        let queues: Vec<_> = sharder.queues().to_vec();
        let result = sharder.run(|_: &i32| 0);
        assert!(result.is_err());
        for queue in &queues {
            match queue.pop_blocking() {
                Some(Delivery::Error(_)) => {}
                _ => panic!("expected an error sentinel, got a different delivery"),
            }
        }
    }
}
