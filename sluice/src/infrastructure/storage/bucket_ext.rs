// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bucket derived operations (spec.md section 4.6): convenience operations
//! built entirely on top of the mandatory [`Bucket`] contract, plus the two
//! bulk variants backed by the parallel task processor's bounded worker
//! pool (spec.md section 4.8).

use crate::infrastructure::storage::parallel_task_processor::run_bounded;
use async_trait::async_trait;
use sluice_domain::repositories::PutOptions;
use sluice_domain::{Bucket, PipeError};
use std::path::{Path, PathBuf};

#[async_trait]
pub trait BucketExt: Bucket {
    /// Uploads a local file's contents to `key`.
    async fn put_file(&self, key: &str, source_file: &Path, options: PutOptions) -> Result<(), PipeError> {
        let bytes = tokio::fs::read(source_file)
            .await
            .map_err(|_| PipeError::not_found(source_file.display().to_string()))?;
        self.put(key, bytes, options).await
    }

    /// `put` with `is_public` set.
    async fn put_public(&self, key: &str, bytes: Vec<u8>) -> Result<(), PipeError> {
        self.put(
            key,
            bytes,
            PutOptions {
                is_public: true,
                ..PutOptions::default()
            },
        )
        .await
    }

    /// `put` with `is_public` cleared.
    async fn put_private(&self, key: &str, bytes: Vec<u8>) -> Result<(), PipeError> {
        self.put(
            key,
            bytes,
            PutOptions {
                is_public: false,
                ..PutOptions::default()
            },
        )
        .await
    }

    /// Writes `bytes` under `folder` at a freshly generated key built from
    /// a uniform random 64-bit identifier, marking the object public.
    /// Returns the generated key.
    async fn put_unique_public(&self, folder: &str, bytes: Vec<u8>) -> Result<String, PipeError> {
        let key = unique_key(folder);
        self.put_public(&key, bytes).await?;
        Ok(key)
    }

    /// Same as [`BucketExt::put_unique_public`], marking the object private.
    async fn put_unique_private(&self, folder: &str, bytes: Vec<u8>) -> Result<String, PipeError> {
        let key = unique_key(folder);
        self.put_private(&key, bytes).await?;
        Ok(key)
    }

    /// Writes an empty `_DONE` marker under `folder_path`, the conventional
    /// way a batch pipeline signals that a folder's contents are complete.
    async fn put_done_file(&self, folder_path: &str) -> Result<(), PipeError> {
        let key = format!("{}/_DONE", folder_path.trim_end_matches('/'));
        self.put(&key, Vec::new(), PutOptions::default()).await
    }

    /// Uploads every `(local_path, key)` pair in `files`, at most `workers`
    /// uploads in flight at once. The first failure cancels the rest and is
    /// returned to the caller; runs on the calling task's thread.
    async fn put_all_interruptibly(&self, files: Vec<(PathBuf, String)>, workers: usize) -> Result<(), PipeError> {
        let handle = tokio::runtime::Handle::current();
        run_bounded(files, workers, move |(path, key)| {
            let bytes = std::fs::read(&path).map_err(|_| PipeError::not_found(path.display().to_string()))?;
            handle.block_on(self.put(&key, bytes, PutOptions::default()))
        })
    }

    /// Recursively mirrors every file under `source_dir` into `dest_folder`,
    /// preserving relative paths, with the same bounded worker pool as
    /// [`BucketExt::put_all_interruptibly`].
    async fn put_all_recursive_interruptibly(&self, source_dir: &Path, dest_folder: &str, workers: usize) -> Result<(), PipeError> {
        let mut files = Vec::new();
        collect_files_recursive(source_dir, source_dir, dest_folder, &mut files)?;
        self.put_all_interruptibly(files, workers).await
    }
}

impl<T: Bucket + ?Sized> BucketExt for T {}

fn unique_key(folder: &str) -> String {
    let (high, _) = uuid::Uuid::new_v4().as_u64_pair();
    format!("{}/{:016x}", folder.trim_end_matches('/'), high)
}

fn collect_files_recursive(dir: &Path, root: &Path, dest_folder: &str, out: &mut Vec<(PathBuf, String)>) -> Result<(), PipeError> {
    for entry in std::fs::read_dir(dir).map_err(|e| PipeError::io(e.to_string()))? {
        let entry = entry.map_err(|e| PipeError::io(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, root, dest_folder, out)?;
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            let key = format!("{}/{relative}", dest_folder.trim_end_matches('/'));
            out.push((path, key));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::LocalBucket;

    #[tokio::test]
    async fn put_file_reads_local_file_into_the_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("payload.bin");
        std::fs::write(&source, b"data").unwrap();

        let bucket = LocalBucket::new(dir.path());
        bucket.put_file("objects/payload.bin", &source, PutOptions::default()).await.unwrap();
        assert!(bucket.exists("objects/payload.bin").await.unwrap());
    }

    #[tokio::test]
    async fn put_unique_public_generates_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path());

        let first = bucket.put_unique_public("uploads", b"a".to_vec()).await.unwrap();
        let second = bucket.put_unique_public("uploads", b"b".to_vec()).await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("uploads/"));
        assert!(bucket.exists(&first).await.unwrap());
        assert!(bucket.exists(&second).await.unwrap());
    }

    #[tokio::test]
    async fn put_done_file_writes_an_empty_marker() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path());
        bucket.put_done_file("batch-1").await.unwrap();
        assert!(bucket.exists("batch-1/_DONE").await.unwrap());
    }

    #[tokio::test]
    async fn put_all_interruptibly_uploads_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        let a = source_dir.path().join("a.txt");
        let b = source_dir.path().join("b.txt");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        let bucket = LocalBucket::new(dir.path());
        bucket
            .put_all_interruptibly(vec![(a, "out/a.txt".to_string()), (b, "out/b.txt".to_string())], 2)
            .await
            .unwrap();

        assert!(bucket.exists("out/a.txt").await.unwrap());
        assert!(bucket.exists("out/b.txt").await.unwrap());
    }

    #[tokio::test]
    async fn put_all_recursive_interruptibly_preserves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(source_dir.path().join("nested")).unwrap();
        std::fs::write(source_dir.path().join("top.txt"), "top").unwrap();
        std::fs::write(source_dir.path().join("nested/child.txt"), "child").unwrap();

        let bucket = LocalBucket::new(dir.path());
        bucket.put_all_recursive_interruptibly(source_dir.path(), "mirror", 2).await.unwrap();

        assert!(bucket.exists("mirror/top.txt").await.unwrap());
        assert!(bucket.exists("mirror/nested/child.txt").await.unwrap());
    }

    #[tokio::test]
    async fn put_all_interruptibly_stops_on_first_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = LocalBucket::new(dir.path());
        let result = bucket
            .put_all_interruptibly(vec![(PathBuf::from("/nonexistent/path/does-not-exist"), "x".to_string())], 2)
            .await;
        assert!(result.is_err());
    }
}
