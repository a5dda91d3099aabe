// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Count pipe (spec.md section 4.4.8): consumes its upstream entirely on
//! `start()` and emits a single `u64`.

use sluice_domain::{Pipe, PipeError};

pub struct Count<T> {
    upstream: Box<dyn Pipe<T>>,
    result: Option<u64>,
    delivered: bool,
}

impl<T> Count<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>) -> Self {
        Self {
            upstream,
            result: None,
            delivered: false,
        }
    }
}

impl<T: Send> Pipe<u64> for Count<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        let mut n = 0u64;
        while self.upstream.next()?.is_some() {
            n += 1;
        }
        self.result = Some(n);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&u64>, PipeError> {
        if self.delivered {
            Ok(None)
        } else {
            Ok(self.result.as_ref())
        }
    }

    fn next(&mut self) -> Result<Option<u64>, PipeError> {
        if self.delivered {
            return Ok(None);
        }
        self.delivered = true;
        Ok(self.result.take())
    }

    fn progress(&self) -> f64 {
        if self.delivered {
            1.0
        } else {
            self.upstream.progress()
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.upstream.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;

    #[test]
    fn emits_a_single_count_then_terminates() {
        let mut c = Count::new(Box::new(VecSource::new(vec!["a", "b", "c"])));
        c.start().unwrap();
        assert_eq!(c.next().unwrap(), Some(3));
        assert_eq!(c.next().unwrap(), None);
    }

    #[test]
    fn counts_zero_for_empty_input() {
        let mut c: Count<i32> = Count::new(Box::new(VecSource::new(vec![])));
        c.start().unwrap();
        assert_eq!(c.next().unwrap(), Some(0));
    }
}
