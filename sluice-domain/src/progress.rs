// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Monotone, thread-safe progress tracking shared by every pipe.
//!
//! A [`Progress`] reports a value in `[0.0, 1.0]`. For a source with known
//! size it is bytes-read / total-bytes (see
//! `sluice::infrastructure::storage::size_counting`); for derived pipes it
//! is the minimum (intersection-like), average (union-like), or a direct
//! passthrough (1:1) of upstream progress values, per spec.md section 3.

use std::sync::atomic::{AtomicU64, Ordering};

/// An atomic `[0.0, 1.0]` progress counter.
///
/// Internally stored as a ratio of two `u64` counters so it can be updated
/// without CAS-looping on a float bit pattern; `value()` divides on read.
#[derive(Debug, Default)]
pub struct Progress {
    done: AtomicU64,
    total: AtomicU64,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            done: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Creates a progress counter with a known total (e.g. file size in
    /// bytes).
    pub fn with_total(total: u64) -> Self {
        Self {
            done: AtomicU64::new(0),
            total: AtomicU64::new(total),
        }
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Release);
    }

    /// Advances the done counter. Never moves it backwards (monotonicity,
    /// testable property 16).
    pub fn advance(&self, delta: u64) {
        self.done.fetch_add(delta, Ordering::AcqRel);
    }

    pub fn set_done(&self, done: u64) {
        // Only ever move forward.
        self.done.fetch_max(done, Ordering::AcqRel);
    }

    /// Reads the current value in `[0.0, 1.0]`. A total of `0` (unknown
    /// size) reports `0.0` until `finish()` is called.
    pub fn value(&self) -> f64 {
        let total = self.total.load(Ordering::Acquire);
        if total == 0 {
            return 0.0;
        }
        let done = self.done.load(Ordering::Acquire);
        (done as f64 / total as f64).min(1.0)
    }

    /// Forces the progress to `1.0`, used on exhaustion even when the total
    /// was never known up front (spec.md section 4.4.7: "Always reports
    /// ... 100 at exhaustion, even for empty input").
    pub fn finish(&self) {
        let total = self.total.load(Ordering::Acquire).max(1);
        self.total.store(total, Ordering::Release);
        self.done.store(total, Ordering::Release);
    }
}

/// Combinators for deriving a synthetic progress value from upstream
/// progress readings, used by operators that have more than one upstream
/// (sorted-merge, sorted-union/intersection, hash-join, concat).
pub mod combine {
    /// Intersection-like: the minimum of all upstream values. Used when
    /// output cannot exceed the slowest input (e.g. `SortedIntersection`).
    pub fn min(values: &[f64]) -> f64 {
        values.iter().cloned().fold(1.0_f64, f64::min).max(0.0)
    }

    /// Union-like: the average of all upstream values.
    pub fn average(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_reports_zero_then_one_on_finish() {
        let p = Progress::new();
        assert_eq!(p.value(), 0.0);
        p.finish();
        assert_eq!(p.value(), 1.0);
    }

    #[test]
    fn progress_is_monotone_under_advance() {
        let p = Progress::with_total(100);
        p.advance(10);
        assert_eq!(p.value(), 0.10);
        p.advance(40);
        assert_eq!(p.value(), 0.50);
    }

    #[test]
    fn combine_min_and_average() {
        assert_eq!(combine::min(&[0.2, 0.5, 0.9]), 0.2);
        assert!((combine::average(&[0.2, 0.4]) - 0.3).abs() < 1e-9);
    }
}
