// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse()                 │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::validate()           │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedConfig                 │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer
//! - `commands` - Validated command parameters

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, BucketAction, Cli, Commands, JoinModeArg, ShardStrategyArg};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration
///
/// This structure holds all CLI arguments after security validation.
/// All paths are canonicalized and all values are range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub cpu_threads: Option<usize>,
    pub io_threads: Option<usize>,
    pub storage_type: Option<String>,
    pub channel_depth: usize,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Sort {
        inputs: Vec<PathBuf>,
        output: PathBuf,
        memory_limit_mb: usize,
        unique: bool,
        reverse: bool,
    },
    Join {
        left: PathBuf,
        right: PathBuf,
        key_column: usize,
        delimiter: char,
        mode: JoinModeArg,
        output: PathBuf,
        partitions: usize,
    },
    Shard {
        input: PathBuf,
        output: PathBuf,
        strategy: ShardStrategyArg,
        shard_count: usize,
        key_column: usize,
    },
    Cat {
        objects: Vec<String>,
        bucket_root: Option<PathBuf>,
    },
    Bucket {
        action: BucketAction,
        bucket_root: PathBuf,
    },
}

/// Parse and validate CLI arguments
///
/// This function combines parsing and validation:
/// 1. Parse CLI with clap
/// 2. Validate all paths with SecureArgParser
/// 3. Validate all numeric values
/// 4. Return ValidatedCli on success
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

/// Validate parsed CLI arguments
///
/// Applies security validation to all CLI arguments:
/// - Path canonicalization and security checks
/// - Numeric range validation
/// - String pattern validation
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
        Some(path.clone())
    } else {
        None
    };

    if cli.channel_depth == 0 {
        return Err(ParseError::InvalidValue {
            arg: "channel-depth".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }

    if let Some(threads) = cli.cpu_threads {
        if threads == 0 || threads > 128 {
            return Err(ParseError::InvalidValue {
                arg: "cpu-threads".to_string(),
                reason: "must be between 1 and 128".to_string(),
            });
        }
    }

    if let Some(threads) = cli.io_threads {
        if threads == 0 || threads > 256 {
            return Err(ParseError::InvalidValue {
                arg: "io-threads".to_string(),
                reason: "must be between 1 and 256".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Sort {
            inputs,
            output,
            memory_limit_mb,
            unique,
            reverse,
        } => {
            if inputs.is_empty() {
                return Err(ParseError::MissingArgument("inputs".to_string()));
            }

            let mut validated_inputs = Vec::with_capacity(inputs.len());
            for input in &inputs {
                validated_inputs.push(SecureArgParser::validate_path(&input.to_string_lossy())?);
            }

            SecureArgParser::validate_argument(&output.to_string_lossy())?;

            if memory_limit_mb == 0 || memory_limit_mb > 100_000 {
                return Err(ParseError::InvalidValue {
                    arg: "memory-limit-mb".to_string(),
                    reason: "must be between 1 and 100000 MB".to_string(),
                });
            }

            ValidatedCommand::Sort {
                inputs: validated_inputs,
                output,
                memory_limit_mb,
                unique,
                reverse,
            }
        }
        Commands::Join {
            left,
            right,
            key_column,
            delimiter,
            mode,
            output,
            partitions,
        } => {
            let validated_left = SecureArgParser::validate_path(&left.to_string_lossy())?;
            let validated_right = SecureArgParser::validate_path(&right.to_string_lossy())?;
            SecureArgParser::validate_argument(&output.to_string_lossy())?;

            if partitions == 0 || partitions > 4096 {
                return Err(ParseError::InvalidValue {
                    arg: "partitions".to_string(),
                    reason: "must be between 1 and 4096".to_string(),
                });
            }

            ValidatedCommand::Join {
                left: validated_left,
                right: validated_right,
                key_column,
                delimiter,
                mode,
                output,
                partitions,
            }
        }
        Commands::Shard {
            input,
            output,
            strategy,
            shard_count,
            key_column,
        } => {
            let validated_input = SecureArgParser::validate_path(&input.to_string_lossy())?;
            SecureArgParser::validate_argument(&output.to_string_lossy())?;

            if shard_count == 0 || shard_count > 65536 {
                return Err(ParseError::InvalidValue {
                    arg: "shard-count".to_string(),
                    reason: "must be between 1 and 65536".to_string(),
                });
            }

            ValidatedCommand::Shard {
                input: validated_input,
                output,
                strategy,
                shard_count,
                key_column,
            }
        }
        Commands::Cat { objects, bucket_root } => {
            if objects.is_empty() {
                return Err(ParseError::MissingArgument("objects".to_string()));
            }

            for object in &objects {
                SecureArgParser::validate_argument(object)?;
            }

            let validated_bucket_root = if let Some(ref path) = bucket_root {
                Some(SecureArgParser::validate_path(&path.to_string_lossy())?)
            } else {
                None
            };

            ValidatedCommand::Cat {
                objects,
                bucket_root: validated_bucket_root,
            }
        }
        Commands::Bucket { action, bucket_root } => {
            let validated_bucket_root = SecureArgParser::validate_path(&bucket_root.to_string_lossy())?;

            match &action {
                BucketAction::Put { source, key } => {
                    SecureArgParser::validate_path(&source.to_string_lossy())?;
                    SecureArgParser::validate_argument(key)?;
                }
                BucketAction::Get { key, destination } => {
                    SecureArgParser::validate_argument(key)?;
                    SecureArgParser::validate_argument(&destination.to_string_lossy())?;
                }
                BucketAction::Ls { prefix } => {
                    SecureArgParser::validate_argument(prefix)?;
                }
                BucketAction::Lock { key } => {
                    SecureArgParser::validate_argument(key)?;
                }
            }

            ValidatedCommand::Bucket {
                action,
                bucket_root: validated_bucket_root,
            }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
        cpu_threads: cli.cpu_threads,
        io_threads: cli.io_threads,
        storage_type: cli.storage_type,
        channel_depth: cli.channel_depth,
    })
}
