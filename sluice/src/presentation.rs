// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Interface Layer
//!
//! Translates a validated CLI command into a call against the matching
//! application use case, and renders that use case's result back to the
//! terminal.
//!
//! This is the outermost layer: it receives an already-parsed and
//! already-validated [`sluice_bootstrap::cli::ValidatedCommand`] (argument
//! parsing and path/numeric sanitization happen in `sluice-bootstrap`, not
//! here) and has no knowledge of `clap` or signal handling.

use crate::application::use_cases::{
    bucket_operation::{BucketOperationConfig, BucketOperationOutcome, BucketOperationUseCase},
    cat_objects::{CatObjectsConfig, CatObjectsUseCase},
    join_files::{JoinFilesConfig, JoinFilesUseCase},
    shard_file::{ShardFileConfig, ShardFileUseCase},
    sort_file::{SortFileConfig, SortFileUseCase},
};
use anyhow::Result;
use sluice_bootstrap::cli::ValidatedCommand;
use tokio::io::{stdout, AsyncWriteExt};

/// Runs one validated CLI command to completion, printing its
/// human-readable result to stdout.
pub async fn dispatch(command: ValidatedCommand) -> Result<()> {
    match command {
        ValidatedCommand::Sort { inputs, output, memory_limit_mb, unique, reverse } => {
            let lines = SortFileUseCase::new().execute(SortFileConfig { inputs, output, memory_limit_mb, unique, reverse })?;
            println!("sorted {lines} lines");
            Ok(())
        }
        ValidatedCommand::Join { left, right, key_column, delimiter, mode, output, partitions } => {
            let lines = JoinFilesUseCase::new().execute(JoinFilesConfig { left, right, key_column, delimiter, mode, output, partitions })?;
            println!("joined {lines} lines");
            Ok(())
        }
        ValidatedCommand::Shard { input, output, strategy, shard_count, key_column } => {
            let report = ShardFileUseCase::new().execute(ShardFileConfig { input, output, strategy, shard_count, key_column })?;
            for (shard_id, count) in report.iter() {
                println!("{shard_id}\t{count}");
            }
            println!("total {}", report.total());
            Ok(())
        }
        ValidatedCommand::Cat { objects, bucket_root } => {
            let mut sink = stdout();
            let bytes = CatObjectsUseCase::new().execute(CatObjectsConfig { objects, bucket_root }, &mut sink).await?;
            sink.flush().await?;
            eprintln!("streamed {bytes} bytes");
            Ok(())
        }
        ValidatedCommand::Bucket { action, bucket_root } => {
            let outcome = BucketOperationUseCase::new().execute(BucketOperationConfig { action, bucket_root }).await?;
            render_bucket_outcome(outcome);
            Ok(())
        }
    }
}

fn render_bucket_outcome(outcome: BucketOperationOutcome) {
    match outcome {
        BucketOperationOutcome::Put => println!("put ok"),
        BucketOperationOutcome::Get => println!("get ok"),
        BucketOperationOutcome::Ls(keys) => {
            for key in keys {
                println!("{key}");
            }
        }
        BucketOperationOutcome::Lock { acquired } => {
            println!("{}", if acquired { "lock acquired" } else { "lock already held" });
        }
    }
}
