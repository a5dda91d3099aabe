// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sluice CLI
//!
//! Entry point for the `sluice` binary: `sort`, `join`, `shard`, `cat`, and
//! `bucket` subcommands over local files and a local-disk bucket.

use sluice::infrastructure::config::RuntimeConfig;
use sluice::infrastructure::logging;
use sluice::presentation;
use sluice_bootstrap::ExitCode;
use tracing::{debug, warn};

#[tokio::main]
async fn main() {
    let cli = match sluice_bootstrap::bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("sluice: {err}");
            std::process::exit(ExitCode::UsageError.as_i32());
        }
    };

    if cli.verbose {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    let runtime_config = match RuntimeConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sluice: invalid configuration: {err}");
            std::process::exit(ExitCode::Config.as_i32());
        }
    };
    debug!(worker_threads = runtime_config.effective_worker_threads(), "runtime configuration loaded");
    if cli.cpu_threads.is_some() || cli.io_threads.is_some() || cli.storage_type.is_some() {
        warn!("--cpu-threads/--io-threads/--storage-type are accepted for compatibility but do not override the runtime configuration");
    }

    match presentation::dispatch(cli.command).await {
        Ok(()) => std::process::exit(ExitCode::Success.as_i32()),
        Err(err) => {
            eprintln!("sluice: {err:#}");
            std::process::exit(ExitCode::from_error(&err).as_i32());
        }
    }
}
