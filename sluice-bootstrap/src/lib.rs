// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** the pipe/operator/bucket layers and
//! provides:
//!
//! - **Entry point** - application lifecycle management
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - graceful shutdown (SIGTERM, SIGINT, SIGHUP)
//! - **Argument parsing** - secure CLI argument validation for the `sluice`
//!   binary's `sort`/`join`/`shard`/`cat`/`bucket` subcommands
//! - **Error handling** - Unix exit code mapping
//!
//! ## Module Structure
//!
//! - `platform` - OS abstraction (Unix/Windows)
//! - `signals` - signal handling (SIGTERM, SIGINT, SIGHUP)
//! - `cli` - secure argument parsing
//! - `config` - bootstrap-phase application configuration
//! - `exit_code` - Unix exit code enumeration
//! - `logger` - bootstrap-specific logging
//! - `shutdown` - shutdown coordination

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::ExitCode;

/// Bootstrap and parse CLI arguments.
///
/// Handles CLI parsing with clap and security validation, returning a
/// validated configuration. The caller is responsible for running the
/// application logic and mapping the result to an [`ExitCode`].
///
/// # Errors
///
/// Returns `cli::ParseError` if CLI parsing or validation fails. Clap
/// handles `--help`/`--version` itself and exits the process.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
