// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Join use case: the `sluice join` subcommand. Renders the hash-join
//! output as the cross product of a key's left and right values,
//! tab-separated, one pair per line.

use crate::infrastructure::operators::hash_join::HashJoin;
use crate::infrastructure::operators::source::LineSource;
use anyhow::{Context, Result};
use sluice_bootstrap::cli::JoinModeArg;
use sluice_domain::{CompressionKind, JoinMode, Pipe};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub struct JoinFilesConfig {
    pub left: PathBuf,
    pub right: PathBuf,
    pub key_column: usize,
    pub delimiter: char,
    pub mode: JoinModeArg,
    pub output: PathBuf,
    pub partitions: usize,
}

fn open_lines(path: &std::path::Path) -> Result<LineSource> {
    let file = std::fs::File::open(path).with_context(|| format!("opening join input {}", path.display()))?;
    let compression = CompressionKind::detect_from_filename(&path.to_string_lossy());
    LineSource::new(Box::new(file), compression, None).with_context(|| format!("reading join input {}", path.display()))
}

fn to_join_mode(mode: JoinModeArg) -> JoinMode {
    match mode {
        JoinModeArg::Left => JoinMode::Left,
        JoinModeArg::Inner => JoinMode::Inner,
        JoinModeArg::FullInner => JoinMode::FullInner,
        JoinModeArg::Outer => JoinMode::Outer,
    }
}

#[derive(Default)]
pub struct JoinFilesUseCase;

impl JoinFilesUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, config: JoinFilesConfig) -> Result<u64> {
        let left = open_lines(&config.left)?;
        let right = open_lines(&config.right)?;

        let left_key_column = config.key_column;
        let left_delimiter = config.delimiter;
        let right_key_column = config.key_column;
        let right_delimiter = config.delimiter;
        let temp_dir = std::env::temp_dir().join("sluice-join");

        let mut join = HashJoin::new(
            Box::new(left),
            vec![Box::new(right)],
            move |line: &String| line.split(left_delimiter).nth(left_key_column).unwrap_or("").to_string(),
            move |line: &String| line.split(right_delimiter).nth(right_key_column).unwrap_or("").to_string(),
            config.partitions,
            temp_dir,
            to_join_mode(config.mode),
        );

        let output_file = std::fs::File::create(&config.output).with_context(|| format!("creating join output {}", config.output.display()))?;
        let mut writer = BufWriter::new(output_file);

        join.start()?;
        let mut written = 0u64;
        while let Some(record) = join.next()? {
            let right_values = &record.right_values[0];
            if record.left_values.is_empty() {
                for r in right_values {
                    writeln!(writer, "\t{r}")?;
                    written += 1;
                }
            } else if right_values.is_empty() {
                for l in &record.left_values {
                    writeln!(writer, "{l}\t")?;
                    written += 1;
                }
            } else {
                for l in &record.left_values {
                    for r in right_values {
                        writeln!(writer, "{l}\t{r}")?;
                        written += 1;
                    }
                }
            }
        }
        join.close()?;
        writer.flush()?;
        info!(lines = written, output = %config.output.display(), "join complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_join_emits_the_cross_product_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        let right = dir.path().join("right.csv");
        std::fs::write(&left, "1,alice\n2,bob\n").unwrap();
        std::fs::write(&right, "1,nyc\n1,sf\n").unwrap();
        let output = dir.path().join("out.tsv");

        let written = JoinFilesUseCase::new()
            .execute(JoinFilesConfig {
                left,
                right,
                key_column: 0,
                delimiter: ',',
                mode: JoinModeArg::Inner,
                output: output.clone(),
                partitions: 2,
            })
            .unwrap();

        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(&output).unwrap();
        let mut lines: Vec<_> = contents.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["1,alice\t1,nyc", "1,alice\t1,sf"]);
    }

    #[test]
    fn left_join_keeps_unmatched_left_rows() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        let right = dir.path().join("right.csv");
        std::fs::write(&left, "1,alice\n2,bob\n").unwrap();
        std::fs::write(&right, "1,nyc\n").unwrap();
        let output = dir.path().join("out.tsv");

        JoinFilesUseCase::new()
            .execute(JoinFilesConfig {
                left,
                right,
                key_column: 0,
                delimiter: ',',
                mode: JoinModeArg::Left,
                output: output.clone(),
                partitions: 4,
            })
            .unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        let mut lines: Vec<_> = contents.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["1,alice\t1,nyc", "2,bob\t"]);
    }

    #[test]
    fn full_inner_join_keeps_right_rows_with_no_left_match() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left.csv");
        let right = dir.path().join("right.csv");
        std::fs::write(&left, "1,alice\n2,bob\n").unwrap();
        std::fs::write(&right, "1,nyc\n3,la\n").unwrap();
        let output = dir.path().join("out.tsv");

        JoinFilesUseCase::new()
            .execute(JoinFilesConfig {
                left,
                right,
                key_column: 0,
                delimiter: ',',
                mode: JoinModeArg::FullInner,
                output: output.clone(),
                partitions: 2,
            })
            .unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        let mut lines: Vec<_> = contents.lines().collect();
        lines.sort();
        // key 2 (bob) has no right match and is dropped; key 3 has no left
        // match but is kept since its one right pipe contributed.
        assert_eq!(lines, vec!["1,alice\t1,nyc", "\t3,la"]);
    }
}
