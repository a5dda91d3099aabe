// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Reductor pipe (spec.md section 4.4.18): a keyed fold. `discriminator`
//! assigns each item to a family; `aggregator_creator` lazily materializes
//! one aggregator `G` per family seen; `aggregation_logic` folds each item
//! into its family's aggregator; `post_processor` renders the final `O` per
//! family once the upstream is exhausted. Families are emitted in an
//! unspecified order (insertion order of the underlying map).

use sluice_domain::{Pipe, PipeError};
use std::collections::HashMap;
use std::hash::Hash;

pub struct Reductor<I, F, G, O> {
    upstream: Box<dyn Pipe<I>>,
    discriminator: Box<dyn Fn(&I) -> F + Send>,
    aggregator_creator: Box<dyn Fn(&F) -> G + Send>,
    aggregation_logic: Box<dyn FnMut(&mut G, I) + Send>,
    post_processor: Box<dyn Fn(G) -> O + Send>,
    output: Option<std::vec::IntoIter<O>>,
}

impl<I, F: Eq + Hash + Clone, G, O> Reductor<I, F, G, O> {
    pub fn new(
        upstream: Box<dyn Pipe<I>>,
        discriminator: impl Fn(&I) -> F + Send + 'static,
        aggregator_creator: impl Fn(&F) -> G + Send + 'static,
        aggregation_logic: impl FnMut(&mut G, I) + Send + 'static,
        post_processor: impl Fn(G) -> O + Send + 'static,
    ) -> Self {
        Self {
            upstream,
            discriminator: Box::new(discriminator),
            aggregator_creator: Box::new(aggregator_creator),
            aggregation_logic: Box::new(aggregation_logic),
            post_processor: Box::new(post_processor),
            output: None,
        }
    }
}

impl<I: Send, F: Eq + Hash + Clone + Send, G: Send, O: Send> Pipe<O> for Reductor<I, F, G, O> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        let mut families: HashMap<F, G> = HashMap::new();
        let mut order: Vec<F> = Vec::new();
        while let Some(item) = self.upstream.next()? {
            let family = (self.discriminator)(&item);
            if !families.contains_key(&family) {
                let aggregator = (self.aggregator_creator)(&family);
                families.insert(family.clone(), aggregator);
                order.push(family.clone());
            }
            let aggregator = families.get_mut(&family).expect("inserted above if absent");
            (self.aggregation_logic)(aggregator, item);
        }
        let mut out = Vec::with_capacity(order.len());
        for family in order {
            if let Some(aggregator) = families.remove(&family) {
                out.push((self.post_processor)(aggregator));
            }
        }
        self.output = Some(out.into_iter());
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&O>, PipeError> {
        Ok(self.output.as_ref().and_then(|it| it.as_slice().first()))
    }

    fn next(&mut self) -> Result<Option<O>, PipeError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;

    #[test]
    fn sums_values_per_family() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let mut r = Reductor::new(
            Box::new(VecSource::new(items)),
            |pair: &(&str, i32)| pair.0.to_string(),
            |_family: &String| 0i32,
            |acc: &mut i32, pair: (&str, i32)| *acc += pair.1,
            |acc: i32| acc,
        );
        r.start().unwrap();
        let mut sums = Vec::new();
        while let Some(v) = r.next().unwrap() {
            sums.push(v);
        }
        r.close().unwrap();
        sums.sort();
        assert_eq!(sums, vec![4, 6, 7]);
    }

    #[test]
    fn empty_input_yields_no_families() {
        let mut r = Reductor::new(
            Box::new(VecSource::new(Vec::<(&str, i32)>::new())),
            |pair: &(&str, i32)| pair.0.to_string(),
            |_family: &String| 0i32,
            |acc: &mut i32, pair: (&str, i32)| *acc += pair.1,
            |acc: i32| acc,
        );
        r.start().unwrap();
        assert_eq!(r.next().unwrap(), None);
        r.close().unwrap();
    }

    #[test]
    fn post_processor_can_change_the_output_type() {
        let items = vec![("x", 10), ("x", 20)];
        let mut r = Reductor::new(
            Box::new(VecSource::new(items)),
            |pair: &(&str, i32)| pair.0.to_string(),
            |_family: &String| Vec::<i32>::new(),
            |acc: &mut Vec<i32>, pair: (&str, i32)| acc.push(pair.1),
            |acc: Vec<i32>| acc.len(),
        );
        r.start().unwrap();
        assert_eq!(r.next().unwrap(), Some(2));
        r.close().unwrap();
    }
}
