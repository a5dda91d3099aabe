// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cat use case: the `sluice cat` subcommand. Streams one or more bucket
//! objects, in order, to any `AsyncWrite` sink (stdout in production,
//! an in-memory buffer in tests).

use crate::infrastructure::storage::LocalBucket;
use anyhow::{Context, Result};
use futures::StreamExt;
use sluice_domain::Bucket;
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub struct CatObjectsConfig {
    pub objects: Vec<String>,
    pub bucket_root: Option<PathBuf>,
}

const STREAM_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Default)]
pub struct CatObjectsUseCase;

impl CatObjectsUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, config: CatObjectsConfig, mut sink: impl AsyncWrite + Unpin) -> Result<u64> {
        let root = config.bucket_root.unwrap_or_else(|| PathBuf::from("."));
        let bucket = LocalBucket::new(root);
        let mut total = 0u64;
        for key in &config.objects {
            debug!(key, "cat streaming object");
            let mut stream = bucket.get_as_stream(key, STREAM_CHUNK_SIZE).await.with_context(|| format!("reading object {key}"))?;
            while let Some(chunk) = stream.bytes.next().await {
                let chunk = chunk.with_context(|| format!("streaming object {key}"))?;
                sink.write_all(&chunk).await?;
                total += chunk.len() as u64;
            }
        }
        sink.flush().await?;
        Ok(total)
    }
}
