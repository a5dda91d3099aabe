// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure ports: traits implemented by the `sluice` crate's
//! infrastructure layer, defined here so that application code can depend
//! on the abstraction rather than a concrete implementation.

mod bucket;

pub use bucket::{Bucket, PutOptions, SignedUrl, SizedStream};
