// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The external sort pipe (spec.md section 4.4.11).
//!
//! Buffers up to an in-memory limit `L` items. If the whole input fits, it
//! is sorted in memory. Otherwise, runs of `L` items each are sorted and
//! spilled to temp files (length-prefixed JSON records, optionally
//! compressed — spec.md section 4.5's self-delimiting record format), and
//! the runs are k-way merged on read-back by delegating to
//! [`crate::infrastructure::operators::sorted_merge::SortedMerge`]. The
//! comparator need not be consistent with equality; stability is not
//! guaranteed. Temp files are removed on `close()`, including after an
//! error.

use crate::infrastructure::operators::sorted_merge::SortedMerge;
use crate::infrastructure::operators::source::VecSource;
use crate::infrastructure::pipe::PeekSlot;
use crate::infrastructure::storage::binary_coding::{read_bytes, write_bytes};
use crate::infrastructure::storage::compression::{decoding_reader, encoding_writer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sluice_domain::{CompressionKind, Pipe, PipeError};
use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

pub struct ExternalSort<T> {
    upstream: Box<dyn Pipe<T>>,
    limit: usize,
    cmp: Comparator<T>,
    temp_dir: PathBuf,
    compression: CompressionKind,
    run_paths: Vec<PathBuf>,
    merged: Option<Box<dyn Pipe<T>>>,
}

impl<T: Serialize + DeserializeOwned + Send + 'static> ExternalSort<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, limit: usize, temp_dir: impl Into<PathBuf>, compression: CompressionKind, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        Self {
            upstream,
            limit: limit.max(1),
            cmp: Arc::new(cmp),
            temp_dir: temp_dir.into(),
            compression,
            run_paths: Vec::new(),
            merged: None,
        }
    }

    fn next_run_path(&self) -> PathBuf {
        self.temp_dir.join(format!("sluice-sort-run-{}{}", self.run_paths.len(), self.compression.extension()))
    }

    fn spill_run(&mut self, mut buffer: Vec<T>) -> Result<(), PipeError> {
        buffer.sort_by(|a, b| (self.cmp)(a, b));
        let path = self.next_run_path();
        std::fs::create_dir_all(&self.temp_dir)?;
        let file = File::create(&path)?;
        let mut writer = encoding_writer(Box::new(file), self.compression, self.compression.default_level())?;
        for item in &buffer {
            let bytes = serde_json::to_vec(item).map_err(|e| PipeError::internal(format!("failed to serialize sort record: {e}")))?;
            write_bytes(&mut writer, &bytes)?;
        }
        writer.finish()?;
        self.run_paths.push(path);
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned + Send + 'static> Pipe<T> for ExternalSort<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        self.upstream.start()?;
        loop {
            let mut buffer = Vec::with_capacity(self.limit);
            while buffer.len() < self.limit {
                match self.upstream.next()? {
                    Some(item) => buffer.push(item),
                    None => break,
                }
            }
            let upstream_exhausted = buffer.len() < self.limit;
            if self.run_paths.is_empty() && upstream_exhausted {
                buffer.sort_by(|a, b| (self.cmp)(a, b));
                self.merged = Some(Box::new(VecSource::new(buffer)));
                return Ok(());
            }
            if !buffer.is_empty() {
                self.spill_run(buffer)?;
            }
            if upstream_exhausted {
                break;
            }
        }
        let cmp = self.cmp.clone();
        let mut readers: Vec<Box<dyn Pipe<T>>> = Vec::new();
        for path in &self.run_paths {
            readers.push(Box::new(SerializedRunReader::new(path.clone(), self.compression)?));
        }
        let cmp2 = cmp.clone();
        let mut merge = SortedMerge::new(readers, move |a: &T, b: &T| cmp2(a, b));
        merge.start()?;
        self.merged = Some(Box::new(merge));
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&T>, PipeError> {
        self.merged.as_mut().expect("start() must run before peek()").peek()
    }

    fn next(&mut self) -> Result<Option<T>, PipeError> {
        self.merged.as_mut().expect("start() must run before next()").next()
    }

    fn progress(&self) -> f64 {
        self.merged.as_ref().map(|m| m.progress()).unwrap_or(0.0)
    }

    fn close(&mut self) -> Result<(), PipeError> {
        let merge_result = if let Some(mut m) = self.merged.take() { m.close() } else { Ok(()) };
        for path in self.run_paths.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        merge_result
    }
}

struct SerializedRunReader<T> {
    reader: Box<dyn std::io::Read + Send>,
    slot: PeekSlot<T>,
    _marker: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned> SerializedRunReader<T> {
    fn new(path: PathBuf, compression: CompressionKind) -> Result<Self, PipeError> {
        let file = File::open(&path)?;
        let reader = decoding_reader(Box::new(BufReader::new(file)), compression)?;
        Ok(Self {
            reader,
            slot: PeekSlot::new(),
            _marker: std::marker::PhantomData,
        })
    }

    fn produce(&mut self) -> Result<Option<T>, PipeError> {
        match read_bytes(&mut self.reader)? {
            Some(bytes) => {
                let item = serde_json::from_slice(&bytes).map_err(|e| PipeError::internal(format!("failed to deserialize sort record: {e}")))?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}

impl<T: Send> Pipe<T> for SerializedRunReader<T> {
    fn start(&mut self) -> Result<(), PipeError> {
        let first = self.produce()?;
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
        let nxt = self.produce()?;
        self.slot.set(nxt);
        Ok(ret)
    }

    fn progress(&self) -> f64 {
        if self.slot.is_exhausted() {
            1.0
        } else {
            0.0
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::operators::source::VecSource;

    #[test]
    fn sorts_in_memory_when_input_fits_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = ExternalSort::new(Box::new(VecSource::new(vec![5, 1, 4, 2, 3])), 100, dir.path(), CompressionKind::None, |a: &i32, b: &i32| a.cmp(b));
        s.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = s.next().unwrap() {
            out.push(v);
        }
        s.close().unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn spills_and_merges_runs_scenario_s6() {
        let dir = tempfile::tempdir().unwrap();
        let input: Vec<String> = ["i", "a", "c", "d", "b", "a", "h", "b"].iter().map(|s| s.to_string()).collect();
        let mut s = ExternalSort::new(Box::new(VecSource::new(input)), 3, dir.path(), CompressionKind::None, |a: &String, b: &String| a.cmp(b));
        s.start().unwrap();
        let mut out = Vec::new();
        while let Some(v) = s.next().unwrap() {
            out.push(v);
        }
        s.close().unwrap();
        assert_eq!(out, vec!["a", "a", "b", "b", "c", "d", "h", "i"]);
    }

    #[test]
    fn close_removes_temp_run_files() {
        let dir = tempfile::tempdir().unwrap();
        let input: Vec<i32> = (0..10).rev().collect();
        let mut s = ExternalSort::new(Box::new(VecSource::new(input)), 2, dir.path(), CompressionKind::Gzip, |a: &i32, b: &i32| a.cmp(b));
        s.start().unwrap();
        while s.next().unwrap().is_some() {}
        assert!(std::fs::read_dir(dir.path()).unwrap().count() > 0);
        s.close().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
