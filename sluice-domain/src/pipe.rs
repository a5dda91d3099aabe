// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Synchronous pipe contract
//!
//! A [`Pipe<T>`] is a lazy, pull-based producer of a finite sequence of
//! items of type `T`. The sequence end is signalled by `None` — this is the
//! "terminator" of spec.md section 3, mapped onto `Option<T>` rather than a
//! bespoke sentinel type, which is the idiomatic Rust shape for "value or
//! end of sequence" and composes directly with `Iterator`.
//!
//! ## Contract (spec.md section 4.1, section 8)
//!
//! - `start()` is one-shot: calling it twice is a programming error.
//! - `peek()` is idempotent between calls to `next()`.
//! - Once `next()` returns `None`, every subsequent call to `next()` and
//!   `peek()` also returns `None`, and neither may panic or block.
//! - `close()` is idempotent, safe to call from any thread, at any point in
//!   the lifecycle (even before `start()`), and must never itself raise an
//!   error — closing errors are aggregated and surfaced separately by
//!   implementations that need to report them (see
//!   [`crate::error::PipeError`] and the `close_all` helper in
//!   `sluice::infrastructure::pipe`).
//!
//! All mutating operations on a single sync pipe (`start`, `peek`, `next`)
//! must be called from one thread; `progress()` and `close()` are the two
//! operations safe to call concurrently from a supervisor thread.

use crate::error::PipeError;

/// A lazy, pull-based, closeable producer of items of type `T`.
pub trait Pipe<T>: Send {
    /// One-shot initialization. Must be called exactly once, before the
    /// first `peek()`/`next()`.
    fn start(&mut self) -> Result<(), PipeError>;

    /// Returns the next item without consuming it, or `None` at the end of
    /// the sequence. Idempotent: repeated calls without an intervening
    /// `next()` return the same value.
    fn peek(&mut self) -> Result<Option<&T>, PipeError>;

    /// Returns the current item and advances past it, or `None` at the end
    /// of the sequence. After the first `None`, every subsequent call must
    /// also return `None` and must never error.
    fn next(&mut self) -> Result<Option<T>, PipeError>;

    /// A monotone, thread-safe progress reading in `[0.0, 1.0]`.
    fn progress(&self) -> f64;

    /// Releases every resource this pipe owns, including upstream pipes.
    /// Idempotent and safe to call from any thread at any point in the
    /// lifecycle.
    fn close(&mut self) -> Result<(), PipeError>;
}

/// Closes every pipe in `pipes`, running every close even if earlier ones
/// fail, and returns the first error encountered (spec.md section 4.1:
/// "aggregate closure errors (suppressed)").
pub fn close_all<T>(pipes: impl IntoIterator<Item = Box<dyn Pipe<T>>>) -> Result<(), PipeError> {
    let mut first_err = None;
    for mut pipe in pipes {
        if let Err(e) = pipe.close() {
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Drains a pipe into a `Vec`, calling `close()` regardless of success or
/// failure (the downstream's obligation per spec.md section 7).
pub fn drain_to_vec<T>(pipe: &mut dyn Pipe<T>) -> Result<Vec<T>, PipeError> {
    let mut out = Vec::new();
    let result = (|| -> Result<(), PipeError> {
        pipe.start()?;
        while let Some(item) = pipe.next()? {
            out.push(item);
        }
        Ok(())
    })();
    let close_result = pipe.close();
    result?;
    close_result?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal in-memory pipe used to exercise the universal invariants
    /// against a trivial implementation, and by downstream operator tests.
    pub struct VecPipe<T> {
        items: std::vec::IntoIter<T>,
        current: Option<T>,
        started: bool,
        exhausted: bool,
    }

    impl<T: Clone> VecPipe<T> {
        pub fn new(items: Vec<T>) -> Self {
            Self {
                items: items.into_iter(),
                current: None,
                started: false,
                exhausted: false,
            }
        }
    }

    impl<T: Clone + Send> Pipe<T> for VecPipe<T> {
        fn start(&mut self) -> Result<(), PipeError> {
            assert!(!self.started, "start() called twice");
            self.started = true;
            self.current = self.items.next();
            if self.current.is_none() {
                self.exhausted = true;
            }
            Ok(())
        }

        fn peek(&mut self) -> Result<Option<&T>, PipeError> {
            Ok(self.current.as_ref())
        }

        fn next(&mut self) -> Result<Option<T>, PipeError> {
            if self.exhausted {
                return Ok(None);
            }
            let ret = self.current.take();
            self.current = self.items.next();
            if self.current.is_none() {
                self.exhausted = true;
            }
            Ok(ret)
        }

        fn progress(&self) -> f64 {
            if self.exhausted {
                1.0
            } else {
                0.0
            }
        }

        fn close(&mut self) -> Result<(), PipeError> {
            Ok(())
        }
    }

    #[test]
    fn idempotent_exhaustion() {
        let mut p = VecPipe::new(vec![1, 2]);
        p.start().unwrap();
        assert_eq!(p.next().unwrap(), Some(1));
        assert_eq!(p.next().unwrap(), Some(2));
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.peek().unwrap(), None);
    }

    #[test]
    fn peek_next_coherence() {
        let mut p = VecPipe::new(vec![10, 20]);
        p.start().unwrap();
        let peeked = *p.peek().unwrap().unwrap();
        assert_eq!(peeked, 10);
        assert_eq!(*p.peek().unwrap().unwrap(), 10);
        assert_eq!(p.next().unwrap(), Some(10));
    }

    #[test]
    fn close_idempotent_before_start_and_after_exhaustion() {
        let mut p = VecPipe::new(vec![1]);
        p.close().unwrap();
        p.start().unwrap();
        let _ = p.next().unwrap();
        let _ = p.next().unwrap();
        p.close().unwrap();
        p.close().unwrap();
    }

    #[test]
    fn drain_to_vec_closes_on_both_paths() {
        let mut p = VecPipe::new(vec![1, 2, 3]);
        let items = drain_to_vec(&mut p).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }
}
