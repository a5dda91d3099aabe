// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Callback pipe (spec.md section 4.4.6): a transparent pass-through with
//! a per-item side effect and a one-shot termination side effect, fired
//! exactly once the first time the terminator is observed via either
//! `next()` or `peek()`.

use sluice_domain::{Pipe, PipeError};

pub struct Callback<T> {
    upstream: Box<dyn Pipe<T>>,
    on_item: Box<dyn FnMut(&T) + Send>,
    on_done: Box<dyn FnMut() + Send>,
    done_fired: bool,
}

impl<T> Callback<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, on_item: impl FnMut(&T) + Send + 'static, on_done: impl FnMut() + Send + 'static) -> Self {
        Self {
            upstream,
            on_item: Box::new(on_item),
            on_done: Box::new(on_done),
            done_fired: false,
        }
    }

    fn fire_done_if_needed(&mut self, saw_terminator: bool) {
        if saw_terminator && !self.done_fired {
            self.done_fired = true;
            (self.on_done)();
        }
    }
}

impl<T: Send> Pipe<T> for Callback<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        let saw_terminator = self.upstream.peek()?.is_none();
        self.fire_done_if_needed(saw_terminator);
        self.upstream.peek()
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        match self.upstream.next()? {
            Some(item) => {
                (self.on_item)(&item);
                Ok(Some(item))
            }
            None => {
                self.fire_done_if_needed(true);
                Ok(None)
            }
        }
    }

    fn progress(&self) -> f64 {
        self.upstream.progress()
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.upstream.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fires_on_item_for_every_item_and_on_done_exactly_once() {
        let items_seen = Arc::new(AtomicUsize::new(0));
        let done_fired = Arc::new(AtomicUsize::new(0));
        let items_seen2 = items_seen.clone();
        let done_fired2 = done_fired.clone();
        let mut c = Callback::new(
            Box::new(VecSource::new(vec![1, 2, 3])),
            move |_: &i32| {
                items_seen2.fetch_add(1, Ordering::AcqRel);
            },
            move || {
                done_fired2.fetch_add(1, Ordering::AcqRel);
            },
        );
        c.start().unwrap();
        while c.next().unwrap().is_some() {}
        c.peek().unwrap();
        c.next().unwrap();
        assert_eq!(items_seen.load(Ordering::Acquire), 3);
        assert_eq!(done_fired.load(Ordering::Acquire), 1);
    }
}
