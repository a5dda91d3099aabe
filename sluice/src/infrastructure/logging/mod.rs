// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging
//!
//! Subscriber construction lives here; span/field conventions used when
//! instrumenting a pipeline run live in [`observability`].

pub mod observability;

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber: `RUST_LOG`-driven filtering
/// (defaulting to `info`) with human-readable formatted output.
///
/// Safe to call more than once per process — the second and subsequent
/// calls are no-ops, matching `tracing`'s own "already set" semantics.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// Like [`init`], but forces a fixed filter directive regardless of
/// `RUST_LOG` — used by the bootstrap layer's `--verbose` flag.
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::new(level);
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
