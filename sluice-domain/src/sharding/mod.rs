// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sharder state value object (spec.md section 3: "Sharder state").
//!
//! Invariant: every item produced by a sharder's input is either encoded
//! into exactly one shard, or surfaced as an error. `ShardReport` is the
//! publish-after-success summary every sharder variant in
//! `sluice::infrastructure::operators::sharder` produces.

use std::collections::BTreeMap;

/// A shard identifier. Sharders name shards with small strings (`"0"`,
/// `"1"`, ... for by-hash, or a caller-chosen id for by-item/by-run).
pub type ShardId = String;

/// The `shard_id -> items_written` map a sharder publishes after a
/// successful run (testable property 13: "reported shard counts sum to
/// the input count").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardReport {
    counts: BTreeMap<ShardId, u64>,
}

impl ShardReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, shard_id: &str, n: u64) {
        *self.counts.entry(shard_id.to_string()).or_insert(0) += n;
    }

    pub fn get(&self, shard_id: &str) -> u64 {
        *self.counts.get(shard_id).unwrap_or(&0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn shard_ids(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_every_shard() {
        let mut r = ShardReport::new();
        r.record("a", 3);
        r.record("b", 5);
        r.record("a", 1);
        assert_eq!(r.get("a"), 4);
        assert_eq!(r.total(), 9);
    }
}
