// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Reservoir sampling for large files (spec.md section 4.7): selects `m`
//! items out of a stream of known length `n` in O(n) time, O(1) space
//! (beyond the reservoir itself), uniform over all size-`m` subsets.

use rand::Rng;

/// Reservoir-samples up to `m` items from `source`, an iterator whose total
/// length need not be known in advance (the algorithm is single-pass).
pub fn reservoir_sample<T>(source: impl Iterator<Item = T>, m: usize, rng: &mut impl Rng) -> Vec<T> {
    let mut reservoir: Vec<T> = Vec::with_capacity(m);
    for (i, item) in source.enumerate() {
        if i < m {
            reservoir.push(item);
        } else {
            let j = rng.random_range(0..=i);
            if j < m {
                reservoir[j] = item;
            }
        }
    }
    reservoir
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn returns_everything_when_population_smaller_than_m() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let out = reservoir_sample(1..5, 10, &mut rng);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn returns_exactly_m_items_when_population_larger() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let out = reservoir_sample(0..1000, 20, &mut rng);
        assert_eq!(out.len(), 20);
    }
}
