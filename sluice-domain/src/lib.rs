// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sluice Domain
//!
//! Pure, reusable types for the pipe execution model, the intermediate
//! operator algebra, and the bucket/storage contract. This crate has no
//! I/O of its own and no logging — those are infrastructure concerns that
//! live in the `sluice` crate, which implements the ports defined here
//! (`Bucket`) and builds the operator algebra (`Pipe`/`AsyncPipe`
//! combinators) on top of these types.
//!
//! ## Layout
//!
//! - [`error`] — the [`PipeError`] taxonomy every fallible operation in this
//!   workspace returns.
//! - [`state`] — the [`PipeState`] lifecycle and its atomic cell.
//! - [`progress`] — monotone `[0.0, 1.0]` progress tracking and the
//!   combinators multi-upstream operators use to derive their own progress.
//! - [`pipe`] / [`async_pipe`] — the `Pipe<T>` and `AsyncPipe<T>` contracts
//!   (spec.md sections 4.1, 4.2).
//! - [`queue_item`] — the tagged `QueueItem<T>` used on every sync<->async
//!   bridge.
//! - [`join`] — `JoinRecord` and `JoinMode` for the hash-join operator.
//! - [`sharding`] — the `ShardReport` sharders publish after a run.
//! - [`repositories`] — the `Bucket` port.
//! - [`value_objects`] — `CompressionKind`, `ObjectMetadata`, `ObjectUrl`,
//!   `RetryPolicy`.

pub mod async_pipe;
pub mod error;
pub mod join;
pub mod pipe;
pub mod progress;
pub mod queue_item;
pub mod repositories;
pub mod sharding;
pub mod state;
pub mod value_objects;

pub use async_pipe::{AsyncPipe, Listener};
pub use error::PipeError;
pub use join::{JoinMode, JoinRecord};
pub use pipe::Pipe;
pub use progress::Progress;
pub use queue_item::QueueItem;
pub use repositories::Bucket;
pub use sharding::{ShardId, ShardReport};
pub use state::{PipeState, PipeStateCell};
pub use value_objects::{CompressionKind, ObjectMetadata, ObjectUrl, RetryPolicy};
