// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Top-K pipe (spec.md section 4.4.10): retains the `k` largest items under
//! a comparator, space `O(k)`; on exhaustion emits them in descending
//! order.
//!
//! The retained set is kept as a `Vec` sorted ascending (so the current
//! minimum — the eviction candidate — sits at index 0); an insert is an
//! `O(k)` binary-search-and-shift, which is the right tradeoff for the
//! bounded, typically small `k` this operator targets.

use sluice_domain::{Pipe, PipeError};

pub struct TopK<T> {
    upstream: Box<dyn Pipe<T>>,
    k: usize,
    cmp: Box<dyn Fn(&T, &T) -> std::cmp::Ordering + Send>,
    retained: Vec<T>,
    output: Option<std::vec::IntoIter<T>>,
}

impl<T> TopK<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, k: usize, cmp: impl Fn(&T, &T) -> std::cmp::Ordering + Send + 'static) -> Self {
        Self {
            upstream,
            k,
            cmp: Box::new(cmp),
            retained: Vec::with_capacity(k),
            output: None,
        }
    }

    fn insert(&mut self, item: T) {
        if self.k == 0 {
            return;
        }
        let pos = self.retained.partition_point(|existing| (self.cmp)(existing, &item) == std::cmp::Ordering::Less);
        if self.retained.len() < self.k {
            self.retained.insert(pos, item);
        } else if pos > 0 {
            self.retained.remove(0);
            self.retained.insert(pos - 1, item);
        }
    }
}

impl<T: Send> Pipe<T> for TopK<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        while let Some(item) = self.upstream.next()? {
            self.insert(item);
        }
        let descending: Vec<T> = self.retained.drain(..).rev().collect();
        self.output = Some(descending.into_iter());
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        Ok(self.output.as_ref().and_then(|it| it.as_slice().first()))
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        Ok(self.output.as_mut().and_then(|it| it.next()))
    }

    fn progress(&self) -> f64 {
        match &self.output {
            Some(it) if it.as_slice().is_empty() => 1.0,
            Some(_) => 0.5,
            None => 0.0,
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.upstream.close()
    }
}
