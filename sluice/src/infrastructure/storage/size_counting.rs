// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Size-bearing, thread-safe-counting byte streams (spec.md section 4.7,
//! section 9): a reader thread drives the stream while a progress-polling
//! thread reads the atomic counter concurrently.

use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Wraps a reader with an atomic byte counter, shareable with a
/// progress-polling thread via [`CountingReader::counter`].
pub struct CountingReader<R> {
    inner: R,
    count: Arc<AtomicU64>,
    declared_len: Option<u64>,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R, declared_len: Option<u64>) -> Self {
        Self {
            inner,
            count: Arc::new(AtomicU64::new(0)),
            declared_len,
        }
    }

    /// A cheap, cloneable handle to the live byte count, safe to poll from
    /// any thread.
    pub fn counter(&self) -> Arc<AtomicU64> {
        self.count.clone()
    }

    pub fn declared_len(&self) -> Option<u64> {
        self.declared_len
    }

    pub fn bytes_read(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::AcqRel);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn counts_bytes_across_reads() {
        let mut r = CountingReader::new(Cursor::new(b"hello world".to_vec()), Some(11));
        let counter = r.counter();
        let mut buf = [0u8; 5];
        r.read(&mut buf).unwrap();
        assert_eq!(counter.load(Ordering::Acquire), 5);
        let mut rest = Vec::new();
        r.read_to_end(&mut rest).unwrap();
        assert_eq!(counter.load(Ordering::Acquire), 11);
        assert_eq!(r.declared_len(), Some(11));
    }
}
