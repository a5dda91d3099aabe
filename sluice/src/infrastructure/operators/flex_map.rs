// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Flex-map / flat-map pipe (spec.md section 4.4.3): for each upstream item
//! obtains a nested pipe and streams its items before advancing. At most
//! one nested pipe is open at a time; it is closed on exhaustion and on
//! failure.

use crate::infrastructure::pipe::PeekSlot;
use sluice_domain::{Pipe, PipeError};

pub struct FlexMap<I, O> {
    upstream: Box<dyn Pipe<I>>,
    obtain: Box<dyn FnMut(I) -> Box<dyn Pipe<O>> + Send>,
    nested: Option<Box<dyn Pipe<O>>>,
    slot: PeekSlot<O>,
}

impl<I, O> FlexMap<I, O> {
    pub fn new(upstream: Box<dyn Pipe<I>>, obtain: impl FnMut(I) -> Box<dyn Pipe<O>> + Send + 'static) -> Self {
        Self {
            upstream,
            obtain: Box::new(obtain),
            nested: None,
            slot: PeekSlot::new(),
        }
    }

    fn close_nested(&mut self) -> Result<(), PipeError> {
        if let Some(mut pipe) = self.nested.take() {
            pipe.close()?;
        }
        Ok(())
    }

    fn open_next_nested(&mut self) -> Result<bool, PipeError> {
        match self.upstream.next()? {
            Some(item) => {
                let mut pipe = (self.obtain)(item);
                pipe.start()?;
                self.nested = Some(pipe);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn produce(&mut self) -> Result<Option<O>, PipeError> {
        loop {
            if self.nested.is_none() && !self.open_next_nested()? {
                return Ok(None);
            }
            let nested = self.nested.as_mut().expect("nested pipe just opened");
            match nested.next() {
                Ok(Some(item)) => return Ok(Some(item)),
                Ok(None) => {
                    self.close_nested()?;
                    continue;
                }
                Err(e) => {
                    self.close_nested()?;
                    return Err(e);
                }
            }
        }
    }
}

impl<I: Send, O: Send> Pipe<O> for FlexMap<I, O> {
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
        let nested_result = self.close_nested();
        let upstream_result = self.upstream.close();
        nested_result?;
        upstream_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;

    #[test]
    fn streams_every_nested_pipe_in_order() {
        let mut fm = FlexMap::new(Box::new(VecSource::new(vec![2, 3])), |n: i32| {
            Box::new(VecSource::new((0..n).collect())) as Box<dyn Pipe<i32>>
        });
        fm.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = fm.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn skips_nested_pipes_that_yield_nothing() {
        let mut fm = FlexMap::new(Box::new(VecSource::new(vec![0, 1, 0])), |n: i32| {
            Box::new(VecSource::new((0..n).collect())) as Box<dyn Pipe<i32>>
        });
        fm.start().unwrap();
        assert_eq!(fm.next().unwrap(), Some(0));
        assert_eq!(fm.next().unwrap(), None);
    }
}
