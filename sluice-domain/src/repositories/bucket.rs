// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bucket — the object-store abstraction
//!
//! `Bucket` is an infrastructure port, like the teacher's `FileIOService`:
//! I/O-bound, so it is async even though the rest of the domain layer's
//! traits are sync. See spec.md section 4.6.
//!
//! Every concrete implementation (the local-disk reference implementation
//! in `sluice::infrastructure::storage::local_bucket`, or a future
//! cloud-provider adapter) must uphold:
//!
//! - **Atomicity**: `put` never leaves a reader observing a truncated
//!   write (testable property 17).
//! - **Read-after-write consistency**: once `put` returns, the object is
//!   visible to any subsequent reader on any thread.
//! - **Virtual folders**: a key ending in `/` is a folder and is rejected
//!   by `put`; folders exist only as a consequence of contained files.

use crate::error::PipeError;
use crate::value_objects::ObjectMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::Path;

/// Options controlling a `put`.
#[derive(Debug, Clone)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub is_public: bool,
    pub allow_override: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            is_public: false,
            allow_override: true,
        }
    }
}

/// A size-bearing byte stream: some sources know their length up front
/// (e.g. a local file), others don't (a network response without
/// `Content-Length`). Carrying the length lets progress tracking work
/// without forcing every source to buffer.
pub struct SizedStream {
    pub length: Option<u64>,
    pub bytes: BoxStream<'static, Result<Vec<u8>, PipeError>>,
}

/// A time-limited, bearer capability URL for reading or writing a single
/// key (spec.md section 4.6: "Signed URLs").
#[derive(Debug, Clone)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
    pub max_size_bytes: Option<u64>,
}

/// The object-store contract every bucket implementation provides.
///
/// Mandatory operations are plain trait methods; operations that an
/// implementation may legitimately not support (signed URLs, lock files,
/// streaming upload) return [`PipeError::Unsupported`] rather than being
/// split into a separate trait, matching the "may throw `Unsupported`"
/// wording of spec.md section 4.6.
#[async_trait]
pub trait Bucket: Send + Sync {
    /// Writes `bytes` to `key` atomically. Rejects keys ending in `/`.
    /// A successful return guarantees read-after-write consistency for
    /// every subsequent reader, on any thread.
    async fn put(&self, key: &str, bytes: Vec<u8>, options: PutOptions) -> Result<(), PipeError>;

    /// Downloads `key` to `target_file` on local disk.
    async fn get(&self, key: &str, target_file: &Path) -> Result<(), PipeError>;

    /// Opens `key` as a size-bearing byte stream.
    async fn get_as_stream(&self, key: &str, chunk_size: usize) -> Result<SizedStream, PipeError>;

    /// Deletes `key`. A no-op (not an error) if the key is absent.
    async fn delete(&self, key: &str) -> Result<(), PipeError>;

    /// Copies `from_key` in this bucket to `to_key` in `to_bucket`.
    async fn copy_to_another_bucket(&self, from_key: &str, to_bucket: &dyn Bucket, to_key: &str) -> Result<(), PipeError>;

    /// Whether `key` exists as a file. Always `false` for folder paths.
    async fn exists(&self, key: &str) -> Result<bool, PipeError>;

    /// Lazily lists objects under `folder_path`. An empty stream for a
    /// missing folder; no ordering guarantee unless the implementation
    /// documents one.
    async fn list_objects(&self, folder_path: &str, recursive: bool) -> Result<BoxStream<'static, Result<ObjectMetadata, PipeError>>, PipeError>;

    /// Fetches metadata for `key`. Fails with `NotFound` for a missing key
    /// or a folder path.
    async fn get_object_metadata(&self, key: &str) -> Result<ObjectMetadata, PipeError>;

    /// Concatenates the byte content of `paths` (in order) into a single
    /// object at `target_path`, atomically for the final object. Best
    /// effort cleans up intermediate remote objects under the target
    /// folder when `remove_sources` is set.
    async fn compose(&self, paths: &[String], target_path: &str, remove_sources: bool) -> Result<(), PipeError>;

    /// Atomically creates `key` as a zero-length file iff it did not
    /// already exist, for use as a mutual-exclusion lock. Returns `true`
    /// iff this call created the key. Implementations that cannot support
    /// exclusive create return `Err(PipeError::Unsupported)`.
    async fn put_lock_file(&self, _key: &str) -> Result<bool, PipeError> {
        Err(PipeError::unsupported("lock files"))
    }

    /// Issues a time-limited, read-only signed URL for `key`.
    async fn signed_read_url(&self, _key: &str, _expires_in_secs: u64) -> Result<SignedUrl, PipeError> {
        Err(PipeError::unsupported("signed urls"))
    }

    /// Issues a time-limited signed upload URL for `key`.
    async fn signed_upload_url(
        &self,
        _key: &str,
        _expires_in_secs: u64,
        _max_size_bytes: Option<u64>,
    ) -> Result<SignedUrl, PipeError> {
        Err(PipeError::unsupported("signed upload urls"))
    }
}
