// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Concat pipe (spec.md section 4.4.4): sequentially exposes a list of lazy
//! pipe suppliers as one pipe, advancing to supplier `i+1` only after
//! supplier `i` is exhausted and closed. An error in any supplier aborts
//! with all prior pipes already closed.

use crate::infrastructure::pipe::PeekSlot;
use sluice_domain::{Pipe, PipeError};

type Supplier<T> = Box<dyn FnMut() -> Box<dyn Pipe<T>> + Send>;

pub struct Concat<T> {
    suppliers: std::vec::IntoIter<Supplier<T>>,
    current: Option<Box<dyn Pipe<T>>>,
    slot: PeekSlot<T>,
}

impl<T> Concat<T> {
    pub fn new(suppliers: Vec<Supplier<T>>) -> Self {
        Self {
            suppliers: suppliers.into_iter(),
            current: None,
            slot: PeekSlot::new(),
        }
    }

    fn open_next(&mut self) -> Result<bool, PipeError> {
        match self.suppliers.next() {
            Some(mut make) => {
                let mut pipe = make();
                pipe.start()?;
                self.current = Some(pipe);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        loop {
            if self.current.is_none() && !self.open_next()? {
                return Ok(None);
            }
            let pipe = self.current.as_mut().expect("current pipe just opened");
            match pipe.next() {
                Ok(Some(item)) => return Ok(Some(item)),
                Ok(None) => {
                    if let Some(mut exhausted) = self.current.take() {
                        exhausted.close()?;
                    }
                    continue;
                }
                Err(e) => {
                    if let Some(mut failed) = self.current.take() {
                        let _ = failed.close();
                    }
                    return Err(e);
                }
            }
        }
    }
}

impl<T: Send> Pipe<T> for Concat<T> {
    fn start(&mut self) -> Result<(), PipeError> {
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
        self.current.as_ref().map(|p| p.progress()).unwrap_or(1.0)
    }

    fn close(&mut self) -> Result<(), PipeError> {
        if let Some(mut pipe) = self.current.take() {
            pipe.close()?;
        }
        Ok(())
    }
}
