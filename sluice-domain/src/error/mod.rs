// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipe Error Taxonomy
//!
//! Every operation on a [`crate::Pipe`], [`crate::AsyncPipe`], or
//! [`crate::Bucket`] either returns normally (possibly carrying the
//! terminator) or raises one of the [`PipeError`] variants defined here.
//!
//! The taxonomy is deliberately flat: a handful of string-carrying variants
//! rather than a deep hierarchy, so that call sites can match on category
//! without needing to know which concrete operator produced the error.

mod pipe_error;

pub use pipe_error::PipeError;
