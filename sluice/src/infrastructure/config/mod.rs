// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Configuration
//!
//! Runtime configuration governing pipe/operator defaults, distinct from
//! the bootstrap-phase `sluice_bootstrap::config::AppConfig` that only
//! carries what's needed before a pipeline is even assembled.
//!
//! Layered over TOML/YAML/JSON via the `config` crate: built-in defaults,
//! optionally overridden by a config file, optionally overridden again by
//! `SLUICE_*` environment variables.

use crate::infrastructure::storage::file_options::{FileReadOptions, FileWriteOptions};
use serde::{Deserialize, Serialize};
use sluice_domain::value_objects::CompressionKind;
use sluice_domain::RetryPolicy;
use std::path::Path;

/// Runtime configuration record (spec.md section 9's configuration-record
/// defaults), plus worker-pool width and the external sort memory limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub buffer_size: usize,
    pub compression: CompressionKind,
    pub charset: String,
    pub append: bool,
    pub temp: bool,
    pub retry_initial_backoff_ms: u64,
    pub retry_factor: f64,
    pub retry_max_attempts: u32,
    pub chunk_size: usize,
    /// Width of the worker pool backing `SyncToAsync` bridges and CPU-bound
    /// operators (sort merge, hash join, sharding). 0 means "pick a
    /// sensible default based on available parallelism".
    pub worker_threads: usize,
    /// In-memory item limit before `ExternalSort` spills a run to disk.
    pub sort_memory_limit: usize,
    /// Number of on-disk partitions `HashJoin` uses.
    pub join_partitions: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            buffer_size: 8192,
            compression: CompressionKind::None,
            charset: "UTF-8".to_string(),
            append: false,
            temp: false,
            retry_initial_backoff_ms: retry.initial_backoff_ms,
            retry_factor: retry.factor,
            retry_max_attempts: retry.max_attempts,
            chunk_size: 0,
            worker_threads: 0,
            sort_memory_limit: 1_000_000,
            join_partitions: 16,
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration layered as: built-in defaults, an optional
    /// config file (TOML/YAML/JSON inferred from extension), then
    /// `SLUICE_*` environment variable overrides (e.g. `SLUICE_BUFFER_SIZE`).
    pub fn load(config_file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&RuntimeConfig::default())?);
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("SLUICE").separator("_"));
        builder.build()?.try_deserialize()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_initial_backoff_ms, self.retry_factor, self.retry_max_attempts)
    }

    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
        } else {
            self.worker_threads
        }
    }

    pub fn file_read_options(&self) -> FileReadOptions {
        FileReadOptions {
            buffer_size: self.buffer_size,
            compression: self.compression,
            charset: self.charset.clone(),
            retry_policy: self.retry_policy(),
        }
    }

    pub fn file_write_options(&self) -> FileWriteOptions {
        FileWriteOptions {
            buffer_size: self.buffer_size,
            compression: self.compression,
            charset: self.charset.clone(),
            append: self.append,
            temp: self.temp,
            retry_policy: self.retry_policy(),
            chunk_size: self.chunk_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_configuration_record() {
        let config = RuntimeConfig::default();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.compression, CompressionKind::None);
        assert_eq!(config.charset, "UTF-8");
        assert!(!config.append);
        assert!(!config.temp);
        assert_eq!(config.chunk_size, 0);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn load_with_no_file_returns_defaults() {
        let config = RuntimeConfig::load(None).unwrap();
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.sort_memory_limit, 1_000_000);
    }

    #[test]
    fn load_applies_a_toml_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sluice.toml");
        std::fs::write(&path, "buffer_size = 4096\njoin_partitions = 32\n").unwrap();
        let config = RuntimeConfig::load(Some(&path)).unwrap();
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.join_partitions, 32);
    }

    #[test]
    fn worker_threads_zero_resolves_to_available_parallelism() {
        let config = RuntimeConfig { worker_threads: 0, ..RuntimeConfig::default() };
        assert!(config.effective_worker_threads() >= 1);
    }
}
