// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! One module per CLI subcommand's use case.

pub mod bucket_operation;
pub mod cat_objects;
pub mod join_files;
pub mod shard_file;
pub mod sort_file;

pub use bucket_operation::BucketOperationUseCase;
pub use cat_objects::CatObjectsUseCase;
pub use join_files::JoinFilesUseCase;
pub use shard_file::ShardFileUseCase;
pub use sort_file::SortFileUseCase;
