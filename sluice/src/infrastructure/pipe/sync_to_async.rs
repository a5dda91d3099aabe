// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The sync->async bridge (spec.md section 4.3).
//!
//! Spawns one worker thread per supplied source pipe; each worker drains its
//! own pipe and pushes into the shared listener. `done()` fires once every
//! worker has finished without error; the first error cancels the others
//! and is surfaced via `error(e)` instead.

use sluice_domain::{AsyncPipe, Listener, PipeError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Drives `n` independent source [`sluice_domain::Pipe`]s into one listener
/// from `n` dedicated worker threads.
pub struct SyncToAsync<T: Send + 'static> {
    sources: Vec<Box<dyn sluice_domain::Pipe<T> + Send>>,
    listener: Option<Arc<dyn Listener<T>>>,
    cancel: Arc<AtomicBool>,
    supervisor: Option<JoinHandle<()>>,
    first_error: Arc<Mutex<Option<PipeError>>>,
}

impl<T: Send + 'static> SyncToAsync<T> {
    pub fn new(sources: Vec<Box<dyn sluice_domain::Pipe<T> + Send>>) -> Self {
        Self {
            sources,
            listener: None,
            cancel: Arc::new(AtomicBool::new(false)),
            supervisor: None,
            first_error: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Send + 'static> AsyncPipe<T> for SyncToAsync<T> {
    fn set_listener(&mut self, listener: Box<dyn Listener<T>>) {
        self.listener = Some(Arc::from(listener));
    }

    fn start(&mut self) -> Result<(), PipeError> {
        let listener = self
            .listener
            .clone()
            .ok_or_else(|| PipeError::internal("SyncToAsync::start called before set_listener"))?;
        let cancel = self.cancel.clone();
        let sources = std::mem::take(&mut self.sources);
        let first_error = self.first_error.clone();

        let mut workers = Vec::with_capacity(sources.len());
        for mut source in sources {
            let listener = listener.clone();
            let cancel = cancel.clone();
            let first_error = first_error.clone();
            workers.push(thread::spawn(move || {
                let outcome = (|| -> Result<(), PipeError> {
                    source.start()?;
                    while !cancel.load(Ordering::Acquire) {
                        match source.next()? {
                            Some(item) => listener.on_next(item),
                            None => break,
                        }
                    }
                    Ok(())
                })();
                let _ = source.close();
                if let Err(e) = outcome {
                    cancel.store(true, Ordering::Release);
                    let mut slot = first_error.lock().unwrap();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
            }));
        }

        self.supervisor = Some(thread::spawn(move || {
            for worker in workers {
                let _ = worker.join();
            }
            match first_error.lock().unwrap().clone() {
                Some(e) => listener.on_error(e),
                None => listener.on_done(),
            }
        }));
        Ok(())
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.cancel.store(true, Ordering::Release);
        if let Some(supervisor) = self.supervisor.take() {
            let _ = supervisor.join();
        }
        match self.first_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct VecSource {
        items: std::vec::IntoIter<i32>,
        fail_after: Option<usize>,
        emitted: usize,
    }

    impl sluice_domain::Pipe<i32> for VecSource {
        fn start(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
        fn peek(&mut self) -> Result<Option<&i32>, PipeError> {
            unimplemented!("not exercised by SyncToAsync")
        }
        fn next(&mut self) -> Result<Option<i32>, PipeError> {
            if let Some(limit) = self.fail_after {
                if self.emitted >= limit {
                    return Err(PipeError::io("synthetic failure"));
                }
            }
            self.emitted += 1;
            Ok(self.items.next())
        }
        fn progress(&self) -> f64 {
            0.0
        }
        fn close(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
    }

    struct CollectingListener {
        items: StdMutex<Vec<i32>>,
        done: StdMutex<bool>,
        error: StdMutex<Option<PipeError>>,
    }

    impl Listener<i32> for CollectingListener {
        fn on_next(&self, item: i32) {
            self.items.lock().unwrap().push(item);
        }
        fn on_done(&self) {
            *self.done.lock().unwrap() = true;
        }
        fn on_error(&self, err: PipeError) {
            *self.error.lock().unwrap() = Some(err);
        }
    }

    #[test]
    fn delivers_all_items_then_done() {
        let source = VecSource {
            items: vec![1, 2, 3].into_iter(),
            fail_after: None,
            emitted: 0,
        };
        let mut bridge = SyncToAsync::new(vec![Box::new(source)]);
        let listener = Arc::new(CollectingListener {
            items: StdMutex::new(Vec::new()),
            done: StdMutex::new(false),
            error: StdMutex::new(None),
        });
        bridge.set_listener(Box::new(CollectingListenerHandle(listener.clone())));
        bridge.start().unwrap();
        bridge.close().unwrap();

        let mut items = listener.items.lock().unwrap().clone();
        items.sort();
        assert_eq!(items, vec![1, 2, 3]);
        assert!(*listener.done.lock().unwrap());
        assert!(listener.error.lock().unwrap().is_none());
    }

    /// Listener trait objects must own their state (`Listener: Send + Sync`);
    /// this indirection lets the test assert against the `Arc` after the
    /// bridge has taken ownership of a `Box<dyn Listener<T>>`.
    struct CollectingListenerHandle(Arc<CollectingListener>);
    impl Listener<i32> for CollectingListenerHandle {
        fn on_next(&self, item: i32) {
            self.0.on_next(item)
        }
        fn on_done(&self) {
            self.0.on_done()
        }
        fn on_error(&self, err: PipeError) {
            self.0.on_error(err)
        }
    }

    #[test]
    fn first_error_wins_and_is_surfaced() {
        let source = VecSource {
            items: vec![1, 2, 3].into_iter(),
            fail_after: Some(1),
            emitted: 0,
        };
        let mut bridge = SyncToAsync::new(vec![Box::new(source)]);
        let listener = Arc::new(CollectingListener {
            items: StdMutex::new(Vec::new()),
            done: StdMutex::new(false),
            error: StdMutex::new(None),
        });
        bridge.set_listener(Box::new(CollectingListenerHandle(listener.clone())));
        bridge.start().unwrap();
        bridge.close().unwrap();

        assert!(!*listener.done.lock().unwrap());
        assert!(listener.error.lock().unwrap().is_some());
    }
}
