// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The storage substrate: compressed I/O, binary coding, size-counting
//! streams, reservoir sampling, retry, bounded parallelism, config records
//! for file-backed pipes, and the local-disk `Bucket` reference
//! implementation (spec.md sections 4.5-4.8).

pub mod binary_coding;
pub mod bucket_ext;
pub mod compression;
pub mod file_options;
pub mod local_bucket;
pub mod parallel_task_processor;
pub mod retrier;
pub mod sampling;
pub mod size_counting;

pub use bucket_ext::BucketExt;
pub use local_bucket::LocalBucket;
