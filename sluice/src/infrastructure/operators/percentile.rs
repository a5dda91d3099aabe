// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Percentile pipe (spec.md section 4.4.17): buckets a "sorting component"
//! extracted from each item into a histogram; on exhaustion, sorts the
//! distinct components ascending and walks their prefix sums to find the
//! smallest component whose cumulative count is at least `round(p * N)`.
//! Empty input yields `None`; `p` must be in `[0, 1]`.

use sluice_domain::{Pipe, PipeError};
use std::collections::BTreeMap;

pub struct Percentile<T, C> {
    upstream: Box<dyn Pipe<T>>,
    component: Box<dyn Fn(&T) -> C + Send>,
    p: f64,
    result: Option<Option<C>>,
    delivered: bool,
}

impl<T, C: Ord + Clone> Percentile<T, C> {
    pub fn new(upstream: Box<dyn Pipe<T>>, p: f64, component: impl Fn(&T) -> C + Send + 'static) -> Result<Self, PipeError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(PipeError::validation(format!("percentile p must be in [0, 1], got {p}")));
        }
        Ok(Self {
            upstream,
            component: Box::new(component),
            p,
            result: None,
            delivered: false,
        })
    }
}

impl<T: Send, C: Ord + Clone + Send> Pipe<C> for Percentile<T, C> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        let mut histogram: BTreeMap<C, u64> = BTreeMap::new();
        let mut total: u64 = 0;
        while let Some(item) = self.upstream.next()? {
            let c = (self.component)(&item);
            *histogram.entry(c).or_insert(0) += 1;
            total += 1;
        }
        if total == 0 {
            self.result = Some(None);
            return Ok(());
        }
        let target = (self.p * total as f64).round() as u64;
        let mut cumulative: u64 = 0;
        let mut found = None;
        for (component, count) in &histogram {
            cumulative += count;
            if cumulative >= target.max(1) {
                found = Some(component.clone());
                break;
            }
        }
        self.result = Some(found.or_else(|| histogram.keys().last().cloned()));
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&C>, PipeError> {
        Ok(self.result.as_ref().and_then(|r| if self.delivered { None } else { r.as_ref() }))
    }

    fn next(&mut self) -> Result<Option<C>, PipeError> {
        if self.delivered {
            return Ok(None);
        }
        self.delivered = true;
        Ok(self.result.clone().flatten())
    }

    fn progress(&self) -> f64 {
        if self.result.is_some() {
            1.0
        } else {
            self.upstream.progress()
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        self.upstream.close()
    }
}
