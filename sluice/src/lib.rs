// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sluice
//!
//! The composable batch data-processing pipeline: the operator algebra,
//! the local-disk storage substrate, the application use cases built on
//! top of them, and the CLI interface layer that drives them.
//!
//! ## Layout
//!
//! - [`infrastructure`] — the `Pipe`/`AsyncPipe` operator algebra
//!   (`infrastructure::operators`), the bucket/compression/file-option
//!   storage substrate (`infrastructure::storage`), and the ambient stack
//!   (`infrastructure::config`, `infrastructure::logging`,
//!   `infrastructure::metrics`).
//! - [`application`] — the five use cases behind the `sort`/`join`/
//!   `shard`/`cat`/`bucket` subcommands, built entirely on the
//!   infrastructure layer's public API.
//! - [`presentation`] — translates a validated CLI command into a call
//!   against the matching use case.

pub mod application;
pub mod infrastructure;
pub mod presentation;
