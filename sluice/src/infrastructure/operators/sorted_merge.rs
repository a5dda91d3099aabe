// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sorted-merge pipe (spec.md section 4.4.12): a k-way merge of already
//! sorted input pipes, selecting the minimum head on each step. Any
//! tie-break between equal heads is acceptable; the output multiset must
//! equal the union of the inputs' multisets. Each input's own sequence is
//! validated non-descending as it is pulled, raising `OutOfOrder`
//! otherwise.
//!
//! The minimum is found by a linear scan over the open inputs' current
//! heads rather than a binary heap — `k` (the number of sorted inputs
//! being merged) is small in every caller of this operator, so the
//! simpler `O(k)` per-step scan is the right tradeoff over heap upkeep.

use sluice_domain::pipe::close_all;
use sluice_domain::{Pipe, PipeError};
use std::cmp::Ordering;

pub struct SortedMerge<T> {
    inputs: Vec<Box<dyn Pipe<T>>>,
    heads: Vec<Option<T>>,
    cmp: Box<dyn Fn(&T, &T) -> Ordering + Send>,
    done: bool,
}

impl<T> SortedMerge<T> {
    pub fn new(inputs: Vec<Box<dyn Pipe<T>>>, cmp: impl Fn(&T, &T) -> Ordering + Send + 'static) -> Self {
        let n = inputs.len();
        Self {
            inputs,
            heads: (0..n).map(|_| None).collect(),
            cmp: Box::new(cmp),
            done: false,
        }
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        let mut best: Option<usize> = None;
        for (i, head) in self.heads.iter().enumerate() {
            if let Some(item) = head {
                best = match best {
                    None => Some(i),
                    Some(b) if (self.cmp)(item, self.heads[b].as_ref().unwrap()) == Ordering::Less => Some(i),
                    Some(b) => Some(b),
                };
            }
        }
        let idx = match best {
            Some(i) => i,
            None => {
                self.done = true;
                return Ok(None);
            }
        };
        let winner = self.heads[idx].take().expect("idx selected only when Some");
        let refill = self.inputs[idx].next()?;
        if let Some(candidate) = &refill {
            if (self.cmp)(candidate, &winner) == Ordering::Less {
                return Err(PipeError::out_of_order(format!("sorted-merge input {idx} produced items out of order")));
            }
        }
        self.heads[idx] = refill;
        Ok(Some(winner))
    }
}

impl<T: Send> Pipe<T> for SortedMerge<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.start()?;
            self.heads[i] = input.next()?;
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        // Sorted-merge has no one-item look-ahead buffer of its own; the
        // current heads already serve that role, but the winner isn't
        // determined until `next()` is called. Fall back to computing it
        // without consuming by temporarily borrowing the minimum head.
        let mut best: Option<usize> = None;
        for (i, head) in self.heads.iter().enumerate() {
            if let Some(item) = head {
                best = match best {
                    None => Some(i),
                    Some(b) if (self.cmp)(item, self.heads[b].as_ref().unwrap()) == Ordering::Less => Some(i),
                    Some(b) => Some(b),
                };
            }
        }
        Ok(best.and_then(|i| self.heads[i].as_ref()))
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
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
    fn merges_sorted_inputs_preserving_the_multiset() {
        let mut m = SortedMerge::new(
            vec![
                Box::new(VecSource::new(vec![1, 4, 7])) as Box<dyn Pipe<i32>>,
                Box::new(VecSource::new(vec![2, 3, 8])) as Box<dyn Pipe<i32>>,
            ],
            |a: &i32, b: &i32| a.cmp(b),
        );
        m.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = m.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 2, 3, 4, 7, 8]);
    }

    #[test]
    fn rejects_an_unsorted_input() {
        let mut m = SortedMerge::new(vec![Box::new(VecSource::new(vec![3, 1, 2])) as Box<dyn Pipe<i32>>], |a: &i32, b: &i32| a.cmp(b));
        m.start().unwrap();
        let mut saw_error = false;
        loop {
            match m.next() {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    assert!(matches!(e, PipeError::OutOfOrder(_)));
                    saw_error = true;
                    break;
                }
            }
        }
        assert!(saw_error);
    }
}
