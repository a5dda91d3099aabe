// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "sluice")]
#[command(about = concat!("Sluice pipeline tool v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override CPU worker thread count
    ///
    /// Controls the number of concurrent CPU-bound operators (sort merge,
    /// hash join, sharding). Default: num_cpus - 1.
    #[arg(long)]
    pub cpu_threads: Option<usize>,

    /// Override I/O worker thread count
    ///
    /// Controls the number of concurrent bucket reads/writes.
    #[arg(long)]
    pub io_threads: Option<usize>,

    /// Specify storage device type for I/O optimization
    ///
    /// Affects default I/O thread count if --io-threads not specified.
    /// Values: nvme (queue depth 24), ssd (12), hdd (4).
    #[arg(long, value_parser = parse_storage_type)]
    pub storage_type: Option<String>,

    /// Channel depth for the sync/async bridge queues between pipe stages
    #[arg(long, default_value = "4")]
    pub channel_depth: usize,
}

/// Join strategy for the `join` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum JoinModeArg {
    Left,
    Inner,
    FullInner,
    Outer,
}

/// Sharding strategy for the `shard` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShardStrategyArg {
    ByHash,
    ByItem,
    ByRun,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// External sort over newline-delimited input files
    Sort {
        /// Input files to sort (concatenated logically before sorting)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Approximate in-memory batch size, in megabytes, before spilling a
        /// run to disk
        #[arg(long, default_value = "64")]
        memory_limit_mb: usize,

        /// Drop duplicate lines from the sorted output
        #[arg(long)]
        unique: bool,

        /// Sort in descending order
        #[arg(long)]
        reverse: bool,
    },

    /// Hash-join two sorted or unsorted CSV-ish inputs on a key column
    Join {
        /// Left-hand input file
        #[arg(long)]
        left: PathBuf,

        /// Right-hand input file
        #[arg(long)]
        right: PathBuf,

        /// Zero-based key column index shared by both inputs
        #[arg(long, default_value = "0")]
        key_column: usize,

        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: char,

        /// Join mode
        #[arg(long, value_enum, default_value_t = JoinModeArg::Inner)]
        mode: JoinModeArg,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of hash-table partitions to use while joining
        #[arg(long, default_value = "16")]
        partitions: usize,
    },

    /// Shard an input file into an output folder or bucket
    Shard {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output folder (or `bucket://` URL) to write shard files into
        #[arg(short, long)]
        output: PathBuf,

        /// Sharding strategy
        #[arg(long, value_enum, default_value_t = ShardStrategyArg::ByHash)]
        strategy: ShardStrategyArg,

        /// Number of shards to produce
        #[arg(long, default_value = "4")]
        shard_count: usize,

        /// Zero-based key column used by `by-hash` sharding (ignored otherwise)
        #[arg(long, default_value = "0")]
        key_column: usize,
    },

    /// Concatenate and stream one or more bucket objects to stdout
    Cat {
        /// Object keys or `protocol://bucket/key` URLs to read, in order
        #[arg(required = true)]
        objects: Vec<String>,

        /// Local-disk bucket root to resolve bare keys against
        #[arg(long)]
        bucket_root: Option<PathBuf>,
    },

    /// Operate directly on a local-disk bucket
    Bucket {
        #[command(subcommand)]
        action: BucketAction,

        /// Local-disk bucket root
        #[arg(long)]
        bucket_root: PathBuf,
    },
}

/// Subcommands of `sluice bucket`.
#[derive(Subcommand, Debug, Clone)]
pub enum BucketAction {
    /// Upload a local file to an object key
    Put {
        /// Local source file
        source: PathBuf,
        /// Destination object key
        key: String,
    },
    /// Download an object to a local file
    Get {
        /// Source object key
        key: String,
        /// Local destination file
        destination: PathBuf,
    },
    /// List objects under a key prefix
    Ls {
        /// Key prefix (empty lists the whole bucket)
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Write an advisory lock file for an object key
    Lock {
        /// Object key to lock
        key: String,
    },
}

/// Parse and validate storage type from CLI argument
fn parse_storage_type(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "nvme" | "ssd" | "hdd" => Ok(s.to_lowercase()),
        _ => Err(format!("Invalid storage type '{}'. Valid options: nvme, ssd, hdd", s)),
    }
}

/// Parse CLI arguments
///
/// # Panics
///
/// Clap will exit the process with appropriate error message if parsing fails
pub fn parse_cli() -> Cli {
    Cli::parse()
}
