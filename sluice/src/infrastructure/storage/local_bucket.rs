// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The local-disk reference implementation of [`Bucket`] (spec.md section
//! 4.6). Sketched as a reference, not a production object-store adapter —
//! real cloud providers are explicit non-goals of this crate.
//!
//! Atomicity is achieved by writing to a sibling temp file and renaming it
//! into place: `rename(2)` on POSIX filesystems is atomic within the same
//! directory, so a concurrent reader never observes a partially-written
//! file (testable property 17). Virtual folders (spec.md section 3) are
//! not materialized as directory entries on disk beyond what's needed to
//! hold their files; `list_objects` walks the real directory tree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use sluice_domain::repositories::{PutOptions, SizedStream};
use sluice_domain::{Bucket, ObjectMetadata, PipeError};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// A [`Bucket`] rooted at a directory on local disk.
pub struct LocalBucket {
    root: PathBuf,
}

impl LocalBucket {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }

    async fn write_atomically(&self, target: &Path, bytes: &[u8], allow_override: bool) -> Result<(), PipeError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !allow_override && tokio::fs::metadata(target).await.is_ok() {
            return Err(PipeError::already_exists(target.display().to_string()));
        }
        let temp_path = target.with_extension(format!(
            "{}.sluice-tmp-{}",
            target.extension().and_then(|e| e.to_str()).unwrap_or(""),
            std::process::id()
        ));
        {
            let mut temp = tokio::fs::File::create(&temp_path).await?;
            temp.write_all(bytes).await?;
            temp.sync_all().await?;
        }
        tokio::fs::rename(&temp_path, target).await?;
        Ok(())
    }

    async fn metadata_for(&self, key: &str) -> Result<ObjectMetadata, PipeError> {
        let path = self.resolve(key);
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|_| PipeError::not_found(key.to_string()))?;
        if meta.is_dir() {
            return Err(PipeError::not_found(format!("{key} is a folder")));
        }
        let modified: DateTime<Utc> = meta.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now());
        Ok(ObjectMetadata::new(key.to_string(), meta.len(), modified))
    }
}

#[async_trait]
impl Bucket for LocalBucket {
    async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions) -> Result<(), PipeError> {
        if sluice_domain::value_objects::object_path::is_folder(key) {
            return Err(PipeError::validation(format!("put rejects folder-like key: {key}")));
        }
        let target = self.resolve(key);
        self.write_atomically(&target, &bytes, options.allow_override).await
    }

    async fn get(&self, key: &str, target_file: &Path) -> Result<(), PipeError> {
        let source = self.resolve(key);
        tokio::fs::copy(&source, target_file)
            .await
            .map_err(|_| PipeError::not_found(key.to_string()))?;
        Ok(())
    }

    async fn get_as_stream(&self, key: &str, chunk_size: usize) -> Result<SizedStream, PipeError> {
        let path = self.resolve(key);
        let meta = tokio::fs::metadata(&path).await.map_err(|_| PipeError::not_found(key.to_string()))?;
        let length = Some(meta.len());
        let chunk_size = chunk_size.max(1);
        let mut file = tokio::fs::File::open(&path).await?;
        let bytes = stream::unfold(Vec::new(), move |mut buf| {
            let chunk_size = chunk_size;
            async move {
                buf.resize(chunk_size, 0);
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        Some((Ok(buf.clone()), buf))
                    }
                    Err(e) => Some((Err(PipeError::from(e)), buf)),
                }
            }
        })
        .boxed();
        Ok(SizedStream { length, bytes })
    }

    async fn delete(&self, key: &str) -> Result<(), PipeError> {
        let path = self.resolve(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn copy_to_another_bucket(&self, from_key: &str, to_bucket: &dyn Bucket, to_key: &str) -> Result<(), PipeError> {
        let path = self.resolve(from_key);
        let bytes = tokio::fs::read(&path).await.map_err(|_| PipeError::not_found(from_key.to_string()))?;
        to_bucket.put(to_key, bytes, PutOptions::default()).await
    }

    async fn exists(&self, key: &str) -> Result<bool, PipeError> {
        if sluice_domain::value_objects::object_path::is_folder(key) {
            return Ok(false);
        }
        let path = self.resolve(key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(_) => Ok(false),
        }
    }

    async fn list_objects(&self, folder_path: &str, recursive: bool) -> Result<BoxStream<'static, Result<ObjectMetadata, PipeError>>, PipeError> {
        let root = self.resolve(folder_path);
        let bucket_root = self.root.clone();
        let mut out = Vec::new();
        if tokio::fs::metadata(&root).await.is_ok() {
            collect_objects(&root, &bucket_root, recursive, &mut out).await?;
        }
        Ok(stream::iter(out.into_iter().map(Ok)).boxed())
    }

    async fn get_object_metadata(&self, key: &str) -> Result<ObjectMetadata, PipeError> {
        self.metadata_for(key).await
    }

    async fn compose(&self, paths: &[String], target_path: &str, remove_sources: bool) -> Result<(), PipeError> {
        let mut combined = Vec::new();
        for p in paths {
            let source = self.resolve(p);
            let mut chunk = tokio::fs::read(&source).await.map_err(|_| PipeError::not_found(p.clone()))?;
            combined.append(&mut chunk);
        }
        let target = self.resolve(target_path);
        self.write_atomically(&target, &combined, true).await?;
        if remove_sources {
            for p in paths {
                let _ = self.delete(p).await;
            }
        }
        Ok(())
    }

    async fn put_lock_file(&self, key: &str) -> Result<bool, PipeError> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn collect_objects<'a>(
    dir: &'a Path,
    bucket_root: &'a Path,
    recursive: bool,
    out: &'a mut Vec<ObjectMetadata>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), PipeError>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let meta = entry.metadata().await?;
            if meta.is_dir() {
                if recursive {
                    collect_objects(&path, bucket_root, recursive, out).await?;
                }
                continue;
            }
            let relative = path.strip_prefix(bucket_root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            let modified: DateTime<Utc> = meta.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now());
            out.push(ObjectMetadata::new(relative, meta.len(), modified));
        }
        Ok(())
    })
}
