// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory and line-oriented source pipes.
//!
//! `VecSource<T>` is the workhorse fixture used throughout this crate's
//! operator tests and is also a legitimate production source for small,
//! already-materialized collections. `LineSource` reads newline-delimited
//! text from any `Read`, transparently decompressing by the compression
//! kind supplied (or auto-detected from a filename), matching spec.md
//! section 6's "Text files" format.

use crate::infrastructure::pipe::PeekSlot;
use crate::infrastructure::storage::compression::decoding_reader;
use sluice_domain::{CompressionKind, Pipe, PipeError, Progress};
use std::io::{BufRead, BufReader, Read};

/// A finite in-memory source pipe.
pub struct VecSource<T> {
    items: std::vec::IntoIter<T>,
    slot: PeekSlot<T>,
    progress: Progress,
    total: u64,
    emitted: u64,
}

impl<T> VecSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items: items.into_iter(),
            slot: PeekSlot::new(),
            progress: Progress::with_total(total.max(1)),
            total,
            emitted: 0,
        }
    }

    fn produce(&mut self) -> Option<T> {
        let next = self.items.next();
        if next.is_some() {
            self.emitted += 1;
            self.progress.set_done(self.emitted);
        }
        next
    }
}

impl<T: Send> Pipe<T> for VecSource<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        if self.total == 0 {
            self.progress.finish();
        }
        let first = self.produce();
        self.slot.set(first);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        Ok(self.slot.peek())
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        if self.slot.is_exhausted() {
            return Ok(None);
        }
        let ret = self.slot.take();
        let nxt = self.produce();
        if nxt.is_none() {
            self.progress.finish();
        }
        self.slot.set(nxt);
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        self.progress.value()
    }

    fn close(&mut self) -> Result<(), PipeError> {
        Ok(())
    }
}

/// A source pipe over newline-terminated UTF-8 text, with optional
/// transparent decompression.
pub struct LineSource {
    reader: Box<dyn BufRead + Send>,
    slot: PeekSlot<String>,
    progress: Progress,
    bytes_read: u64,
}

impl LineSource {
    pub fn new(raw: Box<dyn Read + Send>, compression: CompressionKind, total_bytes: Option<u64>) -> Result<Self, PipeError> {
        let decoded = decoding_reader(raw, compression)?;
        Ok(Self {
            reader: Box::new(BufReader::new(decoded)),
            slot: PeekSlot::new(),
            progress: total_bytes.map(Progress::with_total).unwrap_or_default(),
            bytes_read: 0,
        })
    }

    fn produce(&mut self) -> Result<Option<String>, PipeError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            self.progress.finish();
            return Ok(None);
        }
        self.bytes_read += n as u64;
        self.progress.set_done(self.bytes_read);
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

impl Pipe<String> for LineSource {
    fn start(&mut self) -> Result<(), PipeError> {
        let first = self.produce()?;
        self.slot.set(first);
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&String>, PipeError> {
        Ok(self.slot.peek())
    }

    fn next(&mut self) -> Result<Option<String>, PipeError> {
        if self.slot.is_exhausted() {
            return Ok(None);
        }
        let ret = self.slot.take();
        let nxt = self.produce()?;
        self.slot.set(nxt);
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        self.progress.value()
    }

    fn close(&mut self) -> Result<(), PipeError> {
        Ok(())
    }
}
