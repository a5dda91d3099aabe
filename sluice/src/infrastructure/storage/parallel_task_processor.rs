// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Fixed-width parallel task processor (spec.md section 4.8). Backs the
//! bucket substrate's bulk `put_all_interruptibly` /
//! `put_all_recursive_interruptibly` derived operations and any other
//! bounded-parallelism fan-out in this crate.

use rayon::prelude::*;
use sluice_domain::PipeError;

/// Runs `task` over every item of `items` with at most `workers` tasks
/// in flight at once. The first error cancels pending work (rayon's pool
/// naturally stops dispatching once an error is observed here because we
/// short-circuit via `try_for_each`) and is returned to the caller.
pub fn run_bounded<T, F>(items: Vec<T>, workers: usize, task: F) -> Result<(), PipeError>
where
    T: Send,
    F: Fn(T) -> Result<(), PipeError> + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| PipeError::internal(format!("failed to build worker pool: {e}")))?;
    pool.install(|| items.into_par_iter().try_for_each(|item| task(item)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_task_for_every_item() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        run_bounded(vec![1, 2, 3, 4, 5], 2, move |_| {
            seen2.fetch_add(1, Ordering::AcqRel);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.load(Ordering::Acquire), 5);
    }

    #[test]
    fn first_error_is_returned() {
        let result = run_bounded(vec![1, 2, 3], 2, |n| {
            if n == 2 {
                Err(PipeError::io("boom"))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
    }
}
