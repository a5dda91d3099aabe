// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bucket use case: the `sluice bucket` subcommand's put/get/ls/lock
//! actions against a local-disk `Bucket`.

use crate::infrastructure::storage::LocalBucket;
use anyhow::{Context, Result};
use futures::StreamExt;
use sluice_bootstrap::cli::BucketAction;
use sluice_domain::repositories::PutOptions;
use sluice_domain::Bucket;
use std::path::PathBuf;
use tracing::info;

pub struct BucketOperationConfig {
    pub action: BucketAction,
    pub bucket_root: PathBuf,
}

/// A line of human-readable output for each bucket action, printed by the
/// caller (stdout in production, collected in tests).
pub enum BucketOperationOutcome {
    Put,
    Get,
    Ls(Vec<String>),
    Lock { acquired: bool },
}

#[derive(Default)]
pub struct BucketOperationUseCase;

impl BucketOperationUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, config: BucketOperationConfig) -> Result<BucketOperationOutcome> {
        let bucket = LocalBucket::new(&config.bucket_root);
        match config.action {
            BucketAction::Put { source, key } => {
                let bytes = tokio::fs::read(&source).await.with_context(|| format!("reading local file {}", source.display()))?;
                bucket.put(&key, bytes, PutOptions::default()).await.with_context(|| format!("putting object {key}"))?;
                info!(key, "bucket put complete");
                Ok(BucketOperationOutcome::Put)
            }
            BucketAction::Get { key, destination } => {
                bucket.get(&key, &destination).await.with_context(|| format!("getting object {key}"))?;
                info!(key, destination = %destination.display(), "bucket get complete");
                Ok(BucketOperationOutcome::Get)
            }
            BucketAction::Ls { prefix } => {
                let mut stream = bucket.list_objects(&prefix, true).await.with_context(|| format!("listing prefix {prefix}"))?;
                let mut keys = Vec::new();
                while let Some(object) = stream.next().await {
                    keys.push(object?.path().to_string());
                }
                keys.sort();
                Ok(BucketOperationOutcome::Ls(keys))
            }
            BucketAction::Lock { key } => {
                let acquired = bucket.put_lock_file(&key).await.with_context(|| format!("locking object {key}"))?;
                info!(key, acquired, "bucket lock attempted");
                Ok(BucketOperationOutcome::Lock { acquired })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_ls_finds_the_object() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("payload.txt");
        std::fs::write(&source, b"data").unwrap();

        BucketOperationUseCase::new()
            .execute(BucketOperationConfig {
                action: BucketAction::Put {
                    source,
                    key: "objects/payload.txt".to_string(),
                },
                bucket_root: dir.path().to_path_buf(),
            })
            .await
            .unwrap();

        let outcome = BucketOperationUseCase::new()
            .execute(BucketOperationConfig {
                action: BucketAction::Ls { prefix: "".to_string() },
                bucket_root: dir.path().to_path_buf(),
            })
            .await
            .unwrap();

        match outcome {
            BucketOperationOutcome::Ls(keys) => assert_eq!(keys, vec!["objects/payload.txt".to_string()]),
            _ => panic!("expected Ls outcome"),
        }
    }

    #[tokio::test]
    async fn lock_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let first = BucketOperationUseCase::new()
            .execute(BucketOperationConfig {
                action: BucketAction::Lock { key: "x".to_string() },
                bucket_root: dir.path().to_path_buf(),
            })
            .await
            .unwrap();
        let second = BucketOperationUseCase::new()
            .execute(BucketOperationConfig {
                action: BucketAction::Lock { key: "x".to_string() },
                bucket_root: dir.path().to_path_buf(),
            })
            .await
            .unwrap();

        assert!(matches!(first, BucketOperationOutcome::Lock { acquired: true }));
        assert!(matches!(second, BucketOperationOutcome::Lock { acquired: false }));
    }
}
