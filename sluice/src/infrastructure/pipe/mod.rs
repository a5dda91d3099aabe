// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pipe runtime plumbing: the sync<->async bridges (spec.md section 4.3)
//! and the one-item look-ahead buffer most operators are built around.

pub mod async_to_sync;
pub mod bounded_queue;
pub mod peek_slot;
pub mod sync_to_async;

pub use async_to_sync::AsyncToSync;
pub use bounded_queue::BoundedQueue;
pub use peek_slot::PeekSlot;
pub use sync_to_async::SyncToAsync;
