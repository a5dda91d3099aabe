// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Portion and exact samplers (spec.md section 4.4.9).
//!
//! `PortionSampler` keeps each item independently with probability `p`
//! (a Bernoulli trial), preserving order. `ExactSampler` selects exactly
//! `m` items out of a declared population of `n` such that every subset of
//! size `m` is equiprobable, via [`reservoir_sample`] over item indices,
//! then replays the selected items in their original relative order.

use crate::infrastructure::pipe::PeekSlot;
use crate::infrastructure::storage::sampling::reservoir_sample;
use rand::Rng;
use sluice_domain::{Pipe, PipeError};

pub struct PortionSampler<T> {
    upstream: Box<dyn Pipe<T>>,
    p: f64,
    rng: Box<dyn RngCore + Send>,
    slot: PeekSlot<T>,
}

/// A minimal object-safe RNG seam so callers can inject a deterministic
/// RNG in tests without this module depending on a concrete generator.
pub trait RngCore: Send {
    fn next_f64(&mut self) -> f64;
}

pub struct ThreadRngSource;
impl RngCore for ThreadRngSource {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

impl<T> PortionSampler<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, p: f64) -> Self {
        Self::with_rng(upstream, p, Box::new(ThreadRngSource))
    }

    pub fn with_rng(upstream: Box<dyn Pipe<T>>, p: f64, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            upstream,
            p: p.clamp(0.0, 1.0),
            rng,
            slot: PeekSlot::new(),
        }
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        loop {
            match self.upstream.next()? {
                Some(item) if self.rng.next_f64() < self.p => return Ok(Some(item)),
                Some(_) => continue,
                None => return Ok(None),
            }
        }
    }
}

impl<T: Send> Pipe<T> for PortionSampler<T> {
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

pub struct ExactSampler<T> {
    upstream: Box<dyn Pipe<T>>,
    m: usize,
    seed: u64,
    selected: Option<std::vec::IntoIter<T>>,
    slot: PeekSlot<T>,
}

impl<T> ExactSampler<T> {
    /// `n` is the declared population size; sampling is exact (exactly
    /// `min(m, n)` items emitted).
    pub fn new(upstream: Box<dyn Pipe<T>>, m: usize, seed: u64) -> Self {
        Self {
            upstream,
            m,
            seed,
            selected: None,
            slot: PeekSlot::new(),
        }
    }
}

impl<T: Send> Pipe<T> for ExactSampler<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        use rand::SeedableRng;
        self.upstream.start()?;
        let mut items = Vec::new();
        while let Some(item) = self.upstream.next()? {
            items.push(item);
        }
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        let indices: Vec<usize> = reservoir_sample(0..items.len(), self.m, &mut rng);
        let mut keep: Vec<bool> = vec![false; items.len()];
        for i in indices {
            keep[i] = true;
        }
        let selected: Vec<T> = items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, k)| if k { Some(item) } else { None })
            .collect();
        self.selected = Some(selected.into_iter());
        let first = self.selected.as_mut().unwrap().next();
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
        let nxt = self.selected.as_mut().and_then(|it| it.next());
        self.slot.set(nxt);
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        if self.slot.is_exhausted() {
            1.0
        } else {
            0.0
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

    struct FixedRng(Vec<f64>, usize);
    impl RngCore for FixedRng {
        fn next_f64(&mut self) -> f64 {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v
        }
    }

    #[test]
    fn portion_sampler_keeps_items_below_threshold_in_order() {
        let mut s = PortionSampler::with_rng(
            Box::new(VecSource::new(vec![1, 2, 3, 4])),
            0.5,
            Box::new(FixedRng(vec![0.1, 0.9, 0.2, 0.8], 0)),
        );
        s.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = s.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn exact_sampler_emits_exactly_m_items() {
        let mut s = ExactSampler::new(Box::new(VecSource::new((0..100).collect())), 10, 7);
        s.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = s.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out.len(), 10);
        let mut sorted = out.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 10, "selection must be duplicate-free");
        assert!(out.windows(2).all(|w| w[0] < w[1]), "selection preserves original order");
    }

    #[test]
    fn exact_sampler_emits_everything_when_m_exceeds_population() {
        let mut s = ExactSampler::new(Box::new(VecSource::new(vec![1, 2, 3])), 10, 1);
        s.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = s.next().unwrap() {
            out.push(v);
        }
        assert_eq!(out, vec![1, 2, 3]);
    }
}
