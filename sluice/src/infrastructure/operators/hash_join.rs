// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Hash-join pipe (spec.md section 4.4.14).
//!
//! Partitions the left pipe and every right pipe into `P` on-disk shards by
//! `hash(key) mod P`. For each partition index in turn: build a
//! `key -> JoinRecord` map from the left shard, probe it with every right
//! shard (inserting new `OUTER`-mode entries for unmatched right keys),
//! filter by [`JoinMode::should_output`], and buffer the survivors for
//! delivery. Only one partition's map is resident in memory at a time,
//! bounding peak memory by `P`. Temp files are removed on `close()`.

use crate::infrastructure::storage::binary_coding::{read_bytes, write_bytes};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sluice_domain::{JoinMode, JoinRecord, Pipe, PipeError};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

fn partition_of<K: Hash>(key: &K, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % partitions.max(1)
}

fn write_record<W: std::io::Write, K: Serialize, V: Serialize>(w: &mut W, key: &K, value: &V) -> Result<(), PipeError> {
    let bytes = serde_json::to_vec(&(key, value)).map_err(|e| PipeError::internal(format!("failed to serialize join record: {e}")))?;
    write_bytes(w, &bytes)
}

fn read_record<R: std::io::Read, K: DeserializeOwned, V: DeserializeOwned>(r: &mut R) -> Result<Option<(K, V)>, PipeError> {
    match read_bytes(r)? {
        Some(bytes) => {
            let pair = serde_json::from_slice(&bytes).map_err(|e| PipeError::internal(format!("failed to deserialize join record: {e}")))?;
            Ok(Some(pair))
        }
        None => Ok(None),
    }
}

pub struct HashJoin<K, L, R> {
    left: Box<dyn Pipe<L>>,
    rights: Vec<Box<dyn Pipe<R>>>,
    left_key: Box<dyn Fn(&L) -> K + Send>,
    right_key: Box<dyn Fn(&R) -> K + Send>,
    partitions: usize,
    temp_dir: PathBuf,
    mode: JoinMode,
    temp_files: Vec<PathBuf>,
    output: Option<std::vec::IntoIter<JoinRecord<K, L, R>>>,
}

impl<K, L, R> HashJoin<K, L, R>
where
    K: Hash + Eq + Clone + Serialize + DeserializeOwned + Send + 'static,
    L: Serialize + DeserializeOwned + Send + 'static,
    R: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(
        left: Box<dyn Pipe<L>>,
        rights: Vec<Box<dyn Pipe<R>>>,
        left_key: impl Fn(&L) -> K + Send + 'static,
        right_key: impl Fn(&R) -> K + Send + 'static,
        partitions: usize,
        temp_dir: impl Into<PathBuf>,
        mode: JoinMode,
    ) -> Self {
        Self {
            left,
            rights,
            left_key: Box::new(left_key),
            right_key: Box::new(right_key),
            partitions: partitions.max(1),
            temp_dir: temp_dir.into(),
            mode,
            temp_files: Vec::new(),
            output: None,
        }
    }

    fn partition_path(&mut self, label: &str, partition: usize) -> Result<PathBuf, PipeError> {
        std::fs::create_dir_all(&self.temp_dir)?;
        let path = self.temp_dir.join(format!("sluice-join-{label}-{partition}"));
        if !self.temp_files.contains(&path) {
            self.temp_files.push(path.clone());
        }
        Ok(path)
    }

    fn partition_left(&mut self) -> Result<(), PipeError> {
        self.left.start()?;
        let p = self.partitions;
        let mut writers = Vec::with_capacity(p);
        for i in 0..p {
            let path = self.partition_path("left", i)?;
            writers.push(BufWriter::new(File::create(path)?));
        }
        while let Some(item) = self.left.next()? {
            let key = (self.left_key)(&item);
            let idx = partition_of(&key, p);
            write_record(&mut writers[idx], &key, &item)?;
        }
        Ok(())
    }

    fn partition_rights(&mut self) -> Result<(), PipeError> {
        let p = self.partitions;
        let right_count = self.rights.len();
        for ri in 0..right_count {
            self.rights[ri].start()?;
            let mut writers = Vec::with_capacity(p);
            for pi in 0..p {
                let path = self.partition_path(&format!("right-{ri}"), pi)?;
                writers.push(BufWriter::new(File::create(path)?));
            }
            while let Some(item) = self.rights[ri].next()? {
                let key = (self.right_key)(&item);
                let idx = partition_of(&key, p);
                write_record(&mut writers[idx], &key, &item)?;
            }
        }
        Ok(())
    }

    fn process_partition(&self, partition: usize) -> Result<Vec<JoinRecord<K, L, R>>, PipeError> {
        let right_count = self.rights.len();
        let mut map: HashMap<K, JoinRecord<K, L, R>> = HashMap::new();

        let left_path = self.temp_dir.join(format!("sluice-join-left-{partition}"));
        let mut left_reader = BufReader::new(File::open(&left_path)?);
        while let Some((key, value)) = read_record::<_, K, L>(&mut left_reader)? {
            map.entry(key.clone()).or_insert_with(|| JoinRecord::new(key, right_count)).left_values.push(value);
        }

        for ri in 0..right_count {
            let right_path = self.temp_dir.join(format!("sluice-join-right-{ri}-{partition}"));
            let mut right_reader = BufReader::new(File::open(&right_path)?);
            while let Some((key, value)) = read_record::<_, K, R>(&mut right_reader)? {
                let record = map.entry(key.clone()).or_insert_with(|| JoinRecord::new(key, right_count));
                record.right_values[ri].push(value);
            }
        }

        let mut out = Vec::new();
        for record in map.into_values() {
            if self.mode.should_output(record.has_left(), record.right_pipes_contributed(), right_count) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

impl<K, L, R> Pipe<JoinRecord<K, L, R>> for HashJoin<K, L, R>
where
    K: Hash + Eq + Clone + Serialize + DeserializeOwned + Send + 'static,
    L: Serialize + DeserializeOwned + Send + 'static,
    R: Serialize + DeserializeOwned + Send + 'static,
{
    fn start(&mut self) -> Result<(), PipeError> {
        self.partition_left()?;
        self.partition_rights()?;
        let mut all = Vec::new();
        for p in 0..self.partitions {
            all.extend(self.process_partition(p)?);
        }
        self.output = Some(all.into_iter());
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&JoinRecord<K, L, R>>, PipeError> {
        Ok(self.output.as_ref().and_then(|it| it.as_slice().first()))
    }

    fn next(&mut self) -> Result<Option<JoinRecord<K, L, R>>, PipeError> {
        Ok(self.output.as_mut().and_then(|it| it.next()))
    }

    fn progress(&self) -> f64 {
        match &self.output {
            Some(it) if it.as_slice().is_empty() => 1.0,
            Some(_) => 0.5,
            None => 0.0,
        }
    }

    fn close(&mut self) -> Result<(), PipeError> {
        let left_result = self.left.close();
        for right in &mut self.rights {
            let _ = right.close();
        }
        for path in self.temp_files.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        left_result
    }
}
