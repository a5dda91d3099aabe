// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Map pipe (spec.md section 4.4.2): a 1:1 infallible transform. Progress
//! passes through the upstream unchanged.

use crate::infrastructure::pipe::PeekSlot;
use sluice_domain::{Pipe, PipeError};

pub struct Map<I, O> {
    upstream: Box<dyn Pipe<I>>,
    mapper: Box<dyn FnMut(I) -> O + Send>,
    slot: PeekSlot<O>,
}

impl<I, O> Map<I, O> {
    pub fn new(upstream: Box<dyn Pipe<I>>, mapper: impl FnMut(I) -> O + Send + 'static) -> Self {
        Self {
            upstream,
            mapper: Box::new(mapper),
            slot: PeekSlot::new(),
        }
    }

    fn produce(&mut self) -> Result<Option<O>, PipeError> {
        Ok(self.upstream.next()?.map(|item| (self.mapper)(item)))
    }
}

impl<I: Send, O: Send> Pipe<O> for Map<I, O> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        let first = self.produce()?;
        self.slot.set(first);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&O>, PipeError> {
        Ok(self.slot.peek())
    }

    fn next(&mut self) -> Result<Option<O>, PipeError> {
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
