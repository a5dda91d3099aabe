// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sharders (spec.md section 4.4.15): split an upstream across many
//! encoders keyed by a shard id, and an async variant dispatching writes
//! from a push-based upstream under a shard-local lock.
//!
//! All three sync variants share [`ShardWriters`], which owns one open
//! [`EncodingWriter`] per distinct shard id seen and a running item count
//! per shard ([`ShardReport`]). They differ only in how the shard id for
//! an item is chosen and how many encoders may be open at once:
//!
//! - **By item** ([`ByItemSharder`]): an arbitrary `T -> ShardId` selector;
//!   one encoder per distinct id, all held open simultaneously.
//! - **By hash** ([`ByHashSharder`]): a feature extractor plus
//!   `hash mod k`, naming shards `"0".."k-1"` unless a custom namer is
//!   supplied.
//! - **By contiguous run** ([`ByRunSharder`]): assumes the input is
//!   already grouped by shard id; only ever one encoder open, closed and
//!   reopened when the selector's output changes. Memory-bounded
//!   regardless of shard-id cardinality. Reopening a previously seen id
//!   overwrites its file — documented, not a bug.

use crate::infrastructure::storage::compression::{encoding_writer, EncodingWriter};
use parking_lot::Mutex;
use sluice_domain::{AsyncPipe, CompressionKind, Listener, Pipe, PipeError, ShardId, ShardReport};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a sharder's per-shard encoders write their bytes.
pub trait ShardSink: Send {
    fn writer_for(&self, shard_id: &str) -> Result<Box<dyn Write + Send>, PipeError>;
}

/// Writes each shard to `<root>/<shard_id><extension>` on local disk.
pub struct DirectorySink {
    root: PathBuf,
    compression: CompressionKind,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, compression: CompressionKind) -> Self {
        Self { root: root.into(), compression }
    }
}

impl ShardSink for DirectorySink {
    fn writer_for(&self, shard_id: &str) -> Result<Box<dyn Write + Send>, PipeError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(format!("{shard_id}{}", self.compression.extension()));
        Ok(Box::new(std::fs::File::create(path)?))
    }
}

struct ShardWriters {
    sink: Box<dyn ShardSink>,
    compression: CompressionKind,
    open: HashMap<ShardId, Box<dyn EncodingWriter>>,
    report: ShardReport,
}

impl ShardWriters {
    fn new(sink: Box<dyn ShardSink>, compression: CompressionKind) -> Self {
        Self {
            sink,
            compression,
            open: HashMap::new(),
            report: ShardReport::new(),
        }
    }

    fn write_line(&mut self, shard_id: &str, line: &str) -> Result<(), PipeError> {
        if !self.open.contains_key(shard_id) {
            let raw = self.sink.writer_for(shard_id)?;
            let writer = encoding_writer(raw, self.compression, self.compression.default_level())?;
            self.open.insert(shard_id.to_string(), writer);
        }
        let writer = self.open.get_mut(shard_id).expect("just inserted");
        writeln!(writer, "{line}")?;
        self.report.record(shard_id, 1);
        Ok(())
    }

    /// Closes one shard's encoder, if open — used by [`ByRunSharder`] to
    /// bound memory to a single open encoder.
    fn close_shard(&mut self, shard_id: &str) -> Result<(), PipeError> {
        if let Some(writer) = self.open.remove(shard_id) {
            writer.finish()?;
        }
        Ok(())
    }

    fn close_all(&mut self) -> Result<(), PipeError> {
        let mut first_err = None;
        for (_, writer) in self.open.drain() {
            if let Err(e) = writer.finish() {
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
}

/// Shards by an arbitrary per-item selector; every distinct shard id's
/// encoder stays open for the lifetime of the run.
pub struct ByItemSharder<T> {
    upstream: Box<dyn Pipe<T>>,
    selector: Box<dyn Fn(&T) -> ShardId + Send>,
    render: Box<dyn Fn(&T) -> String + Send>,
    writers: ShardWriters,
    done: bool,
}

impl<T> ByItemSharder<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, sink: Box<dyn ShardSink>, compression: CompressionKind, selector: impl Fn(&T) -> ShardId + Send + 'static, render: impl Fn(&T) -> String + Send + 'static) -> Self {
        Self {
            upstream,
            selector: Box::new(selector),
            render: Box::new(render),
            writers: ShardWriters::new(sink, compression),
            done: false,
        }
    }

    /// Runs the sharder to completion and returns the published report
    /// (spec.md section 4.4.15: "publishes a shardId -> itemCount map").
    pub fn run(mut self) -> Result<ShardReport, PipeError> {
        self.upstream.start()?;
        while let Some(item) = self.upstream.next()? {
            let shard_id = (self.selector)(&item);
            let line = (self.render)(&item);
            self.writers.write_line(&shard_id, &line)?;
        }
        self.writers.close_all()?;
        self.upstream.close()?;
        Ok(self.writers.report)
    }
}

/// Shards by `hash(feature(item)) mod k`, naming shards `"0".."k-1"`
/// unless `namer` is supplied.
pub struct ByHashSharder<T> {
    upstream: Box<dyn Pipe<T>>,
    feature: Box<dyn Fn(&T) -> u64 + Send>,
    render: Box<dyn Fn(&T) -> String + Send>,
    k: usize,
    namer: Box<dyn Fn(usize) -> ShardId + Send>,
    writers: ShardWriters,
}

impl<T> ByHashSharder<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, sink: Box<dyn ShardSink>, compression: CompressionKind, k: usize, feature: impl Fn(&T) -> u64 + Send + 'static, render: impl Fn(&T) -> String + Send + 'static) -> Self {
        Self {
            upstream,
            feature: Box::new(feature),
            render: Box::new(render),
            k: k.max(1),
            namer: Box::new(|i| i.to_string()),
            writers: ShardWriters::new(sink, compression),
        }
    }

    pub fn with_namer(mut self, namer: impl Fn(usize) -> ShardId + Send + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn run(mut self) -> Result<ShardReport, PipeError> {
        self.upstream.start()?;
        while let Some(item) = self.upstream.next()? {
            let mut hasher = DefaultHasher::new();
            (self.feature)(&item).hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.k;
            let shard_id = (self.namer)(idx);
            let line = (self.render)(&item);
            self.writers.write_line(&shard_id, &line)?;
        }
        self.writers.close_all()?;
        self.upstream.close()?;
        Ok(self.writers.report)
    }
}

/// Shards an upstream already grouped by shard id. Only one encoder is
/// open at a time, so memory is bounded regardless of how many distinct
/// shard ids appear. Revisiting a shard id reopens (and overwrites) it.
pub struct ByRunSharder<T> {
    upstream: Box<dyn Pipe<T>>,
    selector: Box<dyn Fn(&T) -> ShardId + Send>,
    render: Box<dyn Fn(&T) -> String + Send>,
    writers: ShardWriters,
    current_shard: Option<ShardId>,
}

impl<T> ByRunSharder<T> {
    pub fn new(upstream: Box<dyn Pipe<T>>, sink: Box<dyn ShardSink>, compression: CompressionKind, selector: impl Fn(&T) -> ShardId + Send + 'static, render: impl Fn(&T) -> String + Send + 'static) -> Self {
        Self {
            upstream,
            selector: Box::new(selector),
            render: Box::new(render),
            writers: ShardWriters::new(sink, compression),
            current_shard: None,
        }
    }

    pub fn run(mut self) -> Result<ShardReport, PipeError> {
        self.upstream.start()?;
        while let Some(item) = self.upstream.next()? {
            let shard_id = (self.selector)(&item);
            if self.current_shard.as_deref() != Some(shard_id.as_str()) {
                if let Some(previous) = self.current_shard.take() {
                    self.writers.close_shard(&previous)?;
                }
                self.current_shard = Some(shard_id.clone());
            }
            let line = (self.render)(&item);
            self.writers.write_line(&shard_id, &line)?;
        }
        if let Some(previous) = self.current_shard.take() {
            self.writers.close_shard(&previous)?;
        }
        self.upstream.close()?;
        Ok(self.writers.report)
    }
}

struct AsyncShardState {
    sink: Box<dyn ShardSink>,
    compression: CompressionKind,
    open: Mutex<HashMap<ShardId, Mutex<Box<dyn EncodingWriter>>>>,
    report: Mutex<ShardReport>,
    selector: Box<dyn Fn(&str) -> ShardId + Send + Sync>,
}

impl AsyncShardState {
    fn write(&self, shard_id: &str, line: &str) -> Result<(), PipeError> {
        // Open (or find) this shard's encoder under the map-wide lock,
        // then release it before writing — only the per-shard lock is
        // held across the actual write, so concurrent writers to
        // different shards never block each other.
        {
            let mut open = self.open.lock();
            if !open.contains_key(shard_id) {
                let raw = self.sink.writer_for(shard_id)?;
                let writer = encoding_writer(raw, self.compression, self.compression.default_level())?;
                open.insert(shard_id.to_string(), Mutex::new(writer));
            }
        }
        let open = self.open.lock();
        let mut writer = open.get(shard_id).expect("just inserted above").lock();
        writeln!(writer, "{line}")?;
        drop(writer);
        drop(open);
        self.report.lock().record(shard_id, 1);
        Ok(())
    }
}

/// Push-based sharder: accepts an [`AsyncPipe`], dispatches writes to a
/// shared map of per-shard encoders, and serialises concurrent writers to
/// the same shard with a shard-local lock (spec.md section 4.4.15).
pub struct AsyncSharder<T> {
    upstream: Box<dyn AsyncPipe<T>>,
}

struct AsyncShardListener<T> {
    state: Arc<AsyncShardState>,
    render: Box<dyn Fn(&T) -> String + Send + Sync>,
    done_tx: crossbeam_channel::Sender<Result<(), PipeError>>,
}

impl<T> Listener<T> for AsyncShardListener<T> {
    fn on_next(&self, item: T) {
        let line = (self.render)(&item);
        let shard_id = (self.state.selector)(&line);
        if let Err(e) = self.state.write(&shard_id, &line) {
            let _ = self.done_tx.send(Err(e));
        }
    }

    fn on_done(&self) {
        let _ = self.done_tx.send(Ok(()));
    }

    fn on_error(&self, err: PipeError) {
        let _ = self.done_tx.send(Err(err));
    }
}

impl<T: Send + 'static> AsyncSharder<T> {
    pub fn new(upstream: Box<dyn AsyncPipe<T>>) -> Self {
        Self { upstream }
    }

    /// Runs the async sharder to completion, blocking the calling thread
    /// until the upstream reports `done()` or `error()`, and returns the
    /// published report.
    pub fn run(
        mut self,
        sink: Box<dyn ShardSink>,
        compression: CompressionKind,
        selector: impl Fn(&str) -> ShardId + Send + Sync + 'static,
        render: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Result<ShardReport, PipeError> {
        let state = Arc::new(AsyncShardState {
            sink,
            compression,
            open: Mutex::new(HashMap::new()),
            report: Mutex::new(ShardReport::new()),
            selector: Box::new(selector),
        });
        let (tx, rx) = crossbeam_channel::bounded(1);
        let listener = AsyncShardListener {
            state: state.clone(),
            render: Box::new(render),
            done_tx: tx,
        };
        self.upstream.set_listener(Box::new(listener));
        self.upstream.start()?;
        let result = rx.recv().map_err(|_| PipeError::internal("async sharder listener channel closed without a result"))?;
        self.upstream.close()?;
        result?;
        let mut open = state.open.lock();
        let mut first_err = None;
        for (_, writer) in open.drain() {
            if let Err(e) = writer.into_inner().finish() {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        drop(open);
        match first_err {
            Some(e) => Err(e),
            None => Ok(Arc::try_unwrap(state).map(|s| s.report.into_inner()).unwrap_or_else(|arc| arc.report.lock().clone())),
        }
    }
}
