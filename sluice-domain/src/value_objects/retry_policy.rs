// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Retry policy value object backing `sluice::infrastructure::storage::retrier`
//! (spec.md section 4.8).

/// `(initial_backoff_ms, factor, max_attempts)` as described in spec.md
/// section 4.8. Defaults match spec.md section 9's configuration-record
/// defaults: 1000 ms, factor 2, 4 attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial_backoff_ms: u64,
    pub factor: f64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1000,
            factor: 2.0,
            max_attempts: 4,
        }
    }
}

impl RetryPolicy {
    pub fn new(initial_backoff_ms: u64, factor: f64, max_attempts: u32) -> Self {
        Self {
            initial_backoff_ms,
            factor,
            max_attempts,
        }
    }

    /// The backoff duration before attempt `attempt` (1-indexed: there is
    /// no backoff before attempt 1).
    pub fn backoff_for_attempt(&self, attempt: u32) -> std::time::Duration {
        if attempt <= 1 {
            return std::time::Duration::from_millis(0);
        }
        let ms = self.initial_backoff_ms as f64 * self.factor.powi((attempt - 2) as i32);
        std::time::Duration::from_millis(ms.round() as u64)
    }
}
