// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filter pipe (spec.md section 4.4.1): keeps items satisfying a predicate,
//! preserving order. Progress is the upstream's progress unchanged.

use crate::infrastructure::pipe::PeekSlot;
use sluice_domain::{Pipe, PipeError};

/// Filters an upstream pipe by a predicate `pred: &T -> bool`.
pub struct Filter<T> {
    upstream: Box<dyn Pipe<T>>,
    pred: Box<dyn FnMut(&T) -> bool + Send>,
    slot: PeekSlot<T>,
}

impl<T> Filter<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, pred: impl FnMut(&T) -> bool + Send + 'static) -> Self {
        Self {
            upstream,
            pred: Box::new(pred),
            slot: PeekSlot::new(),
        }
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        loop {
            match self.upstream.next()? {
                Some(item) if (self.pred)(&item) => return Ok(Some(item)),
                Some(_) => continue,
                None => return Ok(None),
            }
        }
    }
}

impl<T: Send> Pipe<T> for Filter<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        let first = self.produce()?;
        self.slot.set(first);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        Ok(self.slot.peek())
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        if self.slot.is_exhausted() {
            return Ok(None);
        }
        let ret = self.slot.take();
        let nxt = self.produce()?;
        self.slot.set(nxt);
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        self.upstream.progress()
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.upstream.close()
    }
}
