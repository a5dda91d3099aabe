// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The retrier (spec.md section 4.8): runs a failable task under a
//! [`RetryPolicy`], sleeping `initial_backoff_ms * factor^k` between
//! attempts, and never retrying a terminal failure class.

use sluice_domain::{PipeError, RetryPolicy};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters a retrier exposes for metrics (spec.md testable
/// property 19): total invocations, ultimate failures, and total attempts
/// across every invocation.
#[derive(Debug, Default)]
pub struct RetrierStats {
    invocations: AtomicU64,
    failed_invocations: AtomicU64,
    total_attempts: AtomicU64,
}

impl RetrierStats {
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Acquire)
    }
    pub fn failed_invocations(&self) -> u64 {
        self.failed_invocations.load(Ordering::Acquire)
    }
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts.load(Ordering::Acquire)
    }
}

/// Runs a failable task under `policy`, retrying recoverable failures up
/// to `policy.max_attempts` times and sleeping between attempts.
pub struct Retrier {
    policy: RetryPolicy,
    stats: RetrierStats,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            stats: RetrierStats::default(),
        }
    }

    pub fn stats(&self) -> &RetrierStats {
        &self.stats
    }

    /// Runs `task` up to `max_attempts` times. Terminal errors
    /// ([`PipeError::is_terminal`]) and non-recoverable errors
    /// ([`PipeError::is_recoverable`] false) abort immediately without
    /// consuming further attempts.
    pub fn run<T>(&self, mut task: impl FnMut() -> Result<T, PipeError>) -> Result<T, PipeError> {
        self.stats.invocations.fetch_add(1, Ordering::AcqRel);
        let mut attempt = 1;
        loop {
            self.stats.total_attempts.fetch_add(1, Ordering::AcqRel);
            match task() {
                Ok(v) => return Ok(v),
                Err(e) if e.is_terminal() || !e.is_recoverable() => {
                    self.stats.failed_invocations.fetch_add(1, Ordering::AcqRel);
                    return Err(e);
                }
                Err(e) => {
                    if attempt >= self.policy.max_attempts {
                        self.stats.failed_invocations.fetch_add(1, Ordering::AcqRel);
                        return Err(e);
                    }
                    attempt += 1;
                    std::thread::sleep(self.policy.backoff_for_attempt(attempt));
                }
            }
        }
    }
}
