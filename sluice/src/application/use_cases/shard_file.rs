// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shard use case: the `sluice shard` subcommand. Dispatches to whichever
//! sync sharder variant matches the requested strategy, all writing into
//! the same local-disk `DirectorySink`.

use crate::infrastructure::operators::sharder::{ByHashSharder, ByItemSharder, ByRunSharder, DirectorySink};
use crate::infrastructure::operators::source::LineSource;
use anyhow::{Context, Result};
use sluice_bootstrap::cli::ShardStrategyArg;
use sluice_domain::{CompressionKind, ShardReport};
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tracing::info;

pub struct ShardFileConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub strategy: ShardStrategyArg,
    pub shard_count: usize,
    pub key_column: usize,
}

fn key_of(line: &str, column: usize) -> &str {
    line.split(',').nth(column).unwrap_or("")
}

fn hash_of(s: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[derive(Default)]
pub struct ShardFileUseCase;

impl ShardFileUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, config: ShardFileConfig) -> Result<ShardReport> {
        let file = std::fs::File::open(&config.input).with_context(|| format!("opening shard input {}", config.input.display()))?;
        let compression = CompressionKind::detect_from_filename(&config.input.to_string_lossy());
        let source = LineSource::new(Box::new(file), compression, None).with_context(|| format!("reading shard input {}", config.input.display()))?;
        let sink = Box::new(DirectorySink::new(&config.output, CompressionKind::None));
        let key_column = config.key_column;

        let report = match config.strategy {
            ShardStrategyArg::ByHash => ByHashSharder::new(
                Box::new(source),
                sink,
                CompressionKind::None,
                config.shard_count,
                move |line: &String| hash_of(key_of(line, key_column)),
                |line: &String| line.clone(),
            )
            .run()?,
            ShardStrategyArg::ByItem => {
                let shard_count = config.shard_count;
                ByItemSharder::new(
                    Box::new(source),
                    sink,
                    CompressionKind::None,
                    move |line: &String| (hash_of(key_of(line, key_column)) as usize % shard_count).to_string(),
                    |line: &String| line.clone(),
                )
                .run()?
            }
            ShardStrategyArg::ByRun => ByRunSharder::new(
                Box::new(source),
                sink,
                CompressionKind::None,
                move |line: &String| key_of(line, key_column).to_string(),
                |line: &String| line.clone(),
            )
            .run()?,
        };

        info!(shards = report.shard_ids().len(), total = report.total(), output = %config.output.display(), "shard complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_hash_distributes_across_the_requested_shard_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "1,a\n2,b\n3,c\n4,d\n").unwrap();
        let output = dir.path().join("shards");

        let report = ShardFileUseCase::new()
            .execute(ShardFileConfig {
                input,
                output: output.clone(),
                strategy: ShardStrategyArg::ByHash,
                shard_count: 2,
                key_column: 0,
            })
            .unwrap();

        assert_eq!(report.total(), 4);
        assert!(report.shard_ids().len() <= 2);
    }

    #[test]
    fn by_run_groups_contiguous_identical_keys_into_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "a,1\na,2\nb,3\n").unwrap();
        let output = dir.path().join("shards");

        let report = ShardFileUseCase::new()
            .execute(ShardFileConfig {
                input,
                output: output.clone(),
                strategy: ShardStrategyArg::ByRun,
                shard_count: 1,
                key_column: 0,
            })
            .unwrap();

        assert_eq!(report.get("a"), 2);
        assert_eq!(report.get("b"), 1);
        let a_contents = std::fs::read_to_string(output.join("a")).unwrap();
        assert_eq!(a_contents.lines().count(), 2);
    }
}
