// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sorted-union / sorted-intersection (spec.md section 4.4.13): both
//! operate over a list of sorted inputs with a comparator that must be
//! consistent with equality. On each step, every input whose head equals
//! the current minimum is advanced, and a bitset of which inputs
//! contributed is handed to a `shouldOutput(item, contributors)` predicate
//! deciding whether to emit. `canTerminate(activeSet)` lets intersection
//! short-circuit the moment any input is exhausted. Output is sorted and
//! duplicate-free.

use sluice_domain::pipe::close_all;
use sluice_domain::{Pipe, PipeError};
use std::cmp::Ordering;

pub struct SortedSetOp<T> {
    inputs: Vec<Box<dyn Pipe<T>>>,
    heads: Vec<Option<T>>,
    cmp: Box<dyn Fn(&T, &T) -> Ordering + Send>,
    should_output: Box<dyn Fn(&T, &[bool]) -> bool + Send>,
    can_terminate: Box<dyn Fn(&[bool]) -> bool + Send>,
    buffered: Option<T>,
    done: bool,
}

impl<T> SortedSetOp<T> {
    fn new(
        inputs: Vec<Box<dyn Pipe<T>>>,
        cmp: impl Fn(&T, &T) -> Ordering + Send + 'static,
        should_output: impl Fn(&T, &[bool]) -> bool + Send + 'static,
        can_terminate: impl Fn(&[bool]) -> bool + Send + 'static,
    ) -> Self {
        let n = inputs.len();
        Self {
            inputs,
            heads: (0..n).map(|_| None).collect(),
            cmp: Box::new(cmp),
            should_output: Box::new(should_output),
            can_terminate: Box::new(can_terminate),
            buffered: None,
            done: false,
        }
    }

    /// Union: emit any value seen in at least one input.
    pub fn union(inputs: Vec<Box<dyn Pipe<T>>>, cmp: impl Fn(&T, &T) -> Ordering + Send + 'static) -> Self
    where
        T: 'static,
    {
        Self::new(inputs, cmp, |_, _| true, |_| false)
    }

    /// Intersection: emit only values present in every input, short
    /// circuiting as soon as any input is exhausted.
    pub fn intersection(inputs: Vec<Box<dyn Pipe<T>>>, cmp: impl Fn(&T, &T) -> Ordering + Send + 'static) -> Self
    where
        T: 'static,
    {
        let n = inputs.len();
        Self::new(inputs, cmp, move |_, contributors: &[bool]| contributors.iter().filter(|c| **c).count() == n, |active: &[bool]| active.iter().any(|a| !a))
    }

    fn active(&self) -> Vec<bool> {
        // "active" tracks which inputs are not yet exhausted (still have a
        // head). `can_terminate` is evaluated against this set each step.
        self.heads.iter().map(|h| h.is_some()).collect()
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        loop {
            if (self.can_terminate)(&self.active()) {
                self.done = true;
                return Ok(None);
            }
            let mut min_idx: Option<usize> = None;
            for (i, head) in self.heads.iter().enumerate() {
                if let Some(item) = head {
                    min_idx = match min_idx {
                        None => Some(i),
                        Some(b) if (self.cmp)(item, self.heads[b].as_ref().unwrap()) == Ordering::Less => Some(i),
                        Some(b) => Some(b),
                    };
                }
            }
            let min_idx = match min_idx {
                Some(i) => i,
                None => {
                    self.done = true;
                    return Ok(None);
                }
            };
            let min_value_ref = self.heads[min_idx].as_ref().unwrap();
            let mut contributors = vec![false; self.inputs.len()];
            for i in 0..self.inputs.len() {
                let matches = match &self.heads[i] {
                    Some(item) => (self.cmp)(item, min_value_ref) == Ordering::Equal,
                    None => false,
                };
                contributors[i] = matches;
            }
            let emit = self.heads[min_idx].take();
            for (i, contributed) in contributors.iter().enumerate() {
                if *contributed && i != min_idx {
                    self.heads[i] = self.inputs[i].next()?;
                }
            }
            self.heads[min_idx] = self.inputs[min_idx].next()?;
            let item = emit.expect("min_idx selected only when Some");
            if (self.should_output)(&item, &contributors) {
                return Ok(Some(item));
            }
        }
    }
}

impl<T: Send> Pipe<T> for SortedSetOp<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.start()?;
            self.heads[i] = input.next()?;
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        // Computing the next output may need to skip non-qualifying
        // candidates, which mutates input state; buffer the result so a
        // peek followed by next() sees the same item without re-advancing.
        if self.buffered.is_none() && !self.done {
            self.buffered = self.produce()?;
        }
        Ok(self.buffered.as_ref())
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        if let Some(item) = self.buffered.take() {
            return Ok(Some(item));
        }
        if self.done {
            return Ok(None);
        }
        self.produce()
    }

    fn progress(&self) -> f64 {
        let values: Vec<f64> = self.inputs.iter().map(|i| i.progress()).collect();
        sluice_domain::progress::combine::average(&values)
    }

    fn close(&mut self) -> Result<(), PipeError> {
        close_all(std::mem::take(&mut self.inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;

    #[test]
    fn union_is_sorted_and_duplicate_free() {
        let mut u = SortedSetOp::union(
            vec![
                Box::new(VecSource::new(vec![1, 2, 4])) as Box<dyn Pipe<i32>>,
                Box::new(VecSource::new(vec![2, 3, 4])) as Box<dyn Pipe<i32>>,
            ],
            |a: &i32, b: &i32| a.cmp(b),
        );
        u.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = u.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn intersection_keeps_only_common_values() {
        let mut i = SortedSetOp::intersection(
            vec![
                Box::new(VecSource::new(vec![1, 2, 3, 4])) as Box<dyn Pipe<i32>>,
                Box::new(VecSource::new(vec![2, 4, 6])) as Box<dyn Pipe<i32>>,
            ],
            |a: &i32, b: &i32| a.cmp(b),
        );
        i.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = i.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![2, 4]);
    }

    #[test]
    fn peek_does_not_consume_the_next_item() {
        let mut u = SortedSetOp::union(
            vec![
                Box::new(VecSource::new(vec![1, 2, 4])) as Box<dyn Pipe<i32>>,
                Box::new(VecSource::new(vec![2, 3, 4])) as Box<dyn Pipe<i32>>,
            ],
            |a: &i32, b: &i32| a.cmp(b),
        );
        u.start().unwrap();
        assert_eq!(u.peek().unwrap(), Some(&1));
        assert_eq!(u.peek().unwrap(), Some(&1));
        assert_eq!(u.next().unwrap(), Some(1));
        assert_eq!(u.peek().unwrap(), Some(&2));
        assert_eq!(u.next().unwrap(), Some(2));
    }

    #[test]
    fn intersection_short_circuits_when_an_input_is_exhausted() {
        let mut i = SortedSetOp::intersection(
            vec![
                Box::new(VecSource::new(vec![1])) as Box<dyn Pipe<i32>>,
                Box::new(VecSource::new(vec![1, 2, 3])) as Box<dyn Pipe<i32>>,
            ],
            |a: &i32, b: &i32| a.cmp(b),
        );
        i.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = i.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![1]);
    }
}
