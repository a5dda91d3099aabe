// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics
//!
//! A `prometheus` registry and collector tracking pipe lifecycle counts,
//! bucket operations, and retry attempts. The wire format/export endpoint
//! is out of scope here — only the collector and its registration exist;
//! nothing serves `/metrics` over HTTP.

pub mod collector;

pub use collector::MetricsCollector;
