// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Sort use case: the `sluice sort` subcommand.
//!
//! On POSIX platforms with an uncompressed input/output set, shells out to
//! the system `sort` tool (spec.md section 6) and reports its exit status.
//! Otherwise — no `sort` on `PATH`, a non-Unix target, or compressed
//! input/output requiring this process's own codec — falls back to the
//! in-process path: concatenates every input file into one line stream,
//! runs it through the external-sort pipe, optionally drops adjacent
//! duplicate lines (sorted order makes "unique" equivalent to an
//! adjacent-dedup pass), and writes the result to the output file.

use crate::infrastructure::operators::concat::Concat;
use crate::infrastructure::operators::sort::ExternalSort;
use crate::infrastructure::operators::source::LineSource;
use crate::infrastructure::storage::compression::encoding_writer;
use anyhow::{Context, Result};
use sluice_domain::{CompressionKind, Pipe};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

pub struct SortFileConfig {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub memory_limit_mb: usize,
    pub unique: bool,
    pub reverse: bool,
}

/// Rough average line length used to translate a megabyte budget into the
/// in-memory item count `ExternalSort` actually understands.
const ASSUMED_BYTES_PER_LINE: usize = 100;

#[derive(Default)]
pub struct SortFileUseCase;

impl SortFileUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, config: SortFileConfig) -> Result<u64> {
        #[cfg(unix)]
        if let Some(result) = posix_sort_path(&config) {
            return result;
        }
        self.execute_in_process(config)
    }

    fn execute_in_process(&self, config: SortFileConfig) -> Result<u64> {
        type LineSupplier = Box<dyn FnMut() -> Box<dyn Pipe<String>> + Send>;
        let mut suppliers: Vec<LineSupplier> = Vec::with_capacity(config.inputs.len());
        for path in &config.inputs {
            let file = std::fs::File::open(path).with_context(|| format!("opening sort input {}", path.display()))?;
            let compression = CompressionKind::detect_from_filename(&path.to_string_lossy());
            let source = LineSource::new(Box::new(file), compression, None).with_context(|| format!("reading sort input {}", path.display()))?;
            let mut slot: Option<Box<dyn Pipe<String>>> = Some(Box::new(source));
            suppliers.push(Box::new(move || slot.take().expect("sort input supplier invoked more than once")));
        }
        let concat = Concat::new(suppliers);

        let reverse = config.reverse;
        let cmp = move |a: &String, b: &String| if reverse { b.cmp(a) } else { a.cmp(b) };
        let limit = ((config.memory_limit_mb * 1024 * 1024) / ASSUMED_BYTES_PER_LINE).max(1);
        let temp_dir = std::env::temp_dir().join("sluice-sort");
        let mut sorted = ExternalSort::new(Box::new(concat), limit, temp_dir, CompressionKind::None, cmp);

        let output_compression = CompressionKind::detect_from_filename(&config.output.to_string_lossy());
        let output_file = std::fs::File::create(&config.output).with_context(|| format!("creating sort output {}", config.output.display()))?;
        let mut writer = encoding_writer(Box::new(output_file), output_compression, output_compression.default_level())?;

        sorted.start()?;
        let mut written = 0u64;
        let mut previous: Option<String> = None;
        while let Some(line) = sorted.next()? {
            if config.unique && previous.as_deref() == Some(line.as_str()) {
                continue;
            }
            writeln!(writer, "{line}")?;
            written += 1;
            previous = Some(line);
        }
        sorted.close()?;
        writer.finish()?;
        info!(lines = written, output = %config.output.display(), "sort complete");
        Ok(written)
    }
}

/// Attempts the POSIX `sort`-backed path (spec.md section 6); returns `None`
/// when it doesn't apply (no `sort` on `PATH`, or compressed input/output
/// the external tool can't read/write directly) so the caller falls back to
/// the in-process external sort.
#[cfg(unix)]
fn posix_sort_path(config: &SortFileConfig) -> Option<Result<u64>> {
    if !posix_sort_on_path() {
        return None;
    }
    let all_plain = config.inputs.iter().all(|p| CompressionKind::detect_from_filename(&p.to_string_lossy()) == CompressionKind::None)
        && CompressionKind::detect_from_filename(&config.output.to_string_lossy()) == CompressionKind::None;
    if !all_plain {
        return None;
    }
    Some(run_posix_sort(config))
}

#[cfg(unix)]
fn posix_sort_on_path() -> bool {
    std::process::Command::new("sort")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
fn run_posix_sort(config: &SortFileConfig) -> Result<u64> {
    let temp_dir = std::env::temp_dir().join("sluice-sort");
    std::fs::create_dir_all(&temp_dir).with_context(|| format!("creating sort temp dir {}", temp_dir.display()))?;

    let mut command = std::process::Command::new("sort");
    command.env("LC_ALL", "C");
    command.arg("-T").arg(&temp_dir);
    command.arg(format!("--buffer-size={}m", config.memory_limit_mb.max(1)));
    if config.unique {
        command.arg("-u");
    }
    if config.reverse {
        command.arg("-r");
    }
    command.arg("-o").arg(&config.output);
    command.args(&config.inputs);

    let output = command.output().context("invoking the system sort tool")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("system sort tool exited with {}: {}", output.status, stderr.trim());
    }

    let written_file = std::fs::File::open(&config.output).with_context(|| format!("reopening sort output {} to count lines", config.output.display()))?;
    let written = std::io::BufReader::new(written_file).lines().count() as u64;
    info!(lines = written, output = %config.output.display(), "sort complete (system sort)");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_merges_multiple_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "banana\napple\n").unwrap();
        std::fs::write(&b, "cherry\napple\n").unwrap();
        let output = dir.path().join("out.txt");

        let written = SortFileUseCase::new()
            .execute(SortFileConfig {
                inputs: vec![a, b],
                output: output.clone(),
                memory_limit_mb: 64,
                unique: false,
                reverse: false,
            })
            .unwrap();

        assert_eq!(written, 4);
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["apple", "apple", "banana", "cherry"]);
    }

    #[test]
    fn unique_drops_adjacent_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "banana\napple\napple\n").unwrap();
        let output = dir.path().join("out.txt");

        let written = SortFileUseCase::new()
            .execute(SortFileConfig {
                inputs: vec![a],
                output: output.clone(),
                memory_limit_mb: 64,
                unique: true,
                reverse: false,
            })
            .unwrap();

        assert_eq!(written, 2);
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["apple", "banana"]);
    }

    #[test]
    fn reverse_sorts_descending() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "apple\nbanana\ncherry\n").unwrap();
        let output = dir.path().join("out.txt");

        SortFileUseCase::new()
            .execute(SortFileConfig {
                inputs: vec![a],
                output: output.clone(),
                memory_limit_mb: 64,
                unique: false,
                reverse: true,
            })
            .unwrap();

        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["cherry", "banana", "apple"]);
    }

    /// Forces the in-process path directly, independent of whether the host
    /// has a `sort` binary on `PATH`.
    #[test]
    fn in_process_path_sorts_and_merges_multiple_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "banana\napple\n").unwrap();
        std::fs::write(&b, "cherry\napple\n").unwrap();
        let output = dir.path().join("out.txt");

        let written = SortFileUseCase::new()
            .execute_in_process(SortFileConfig {
                inputs: vec![a, b],
                output: output.clone(),
                memory_limit_mb: 64,
                unique: false,
                reverse: false,
            })
            .unwrap();

        assert_eq!(written, 4);
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["apple", "apple", "banana", "cherry"]);
    }

    /// Compressed output forces the in-process fallback even on a platform
    /// where the system `sort` tool is available.
    #[cfg(unix)]
    #[test]
    fn compressed_output_falls_back_to_in_process_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "banana\napple\n").unwrap();
        let output = dir.path().join("out.txt.gz");

        assert!(posix_sort_path(&SortFileConfig {
            inputs: vec![a.clone()],
            output: output.clone(),
            memory_limit_mb: 64,
            unique: false,
            reverse: false,
        })
        .is_none());

        let written = SortFileUseCase::new()
            .execute(SortFileConfig {
                inputs: vec![a],
                output: output.clone(),
                memory_limit_mb: 64,
                unique: false,
                reverse: false,
            })
            .unwrap();
        assert_eq!(written, 2);
    }
}
