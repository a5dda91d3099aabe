// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Config records for file-backed pipes (spec.md section 9's redesign
//! flag): a handful of convenience constructors collapsed into two plain
//! structs with `Default` impls carrying the documented defaults, rather
//! than a sprawl of constructor overloads.

use sluice_domain::value_objects::CompressionKind;
use sluice_domain::RetryPolicy;

/// How a file-backed source pipe should read its input.
#[derive(Debug, Clone)]
pub struct FileReadOptions {
    /// Read buffer size in bytes.
    pub buffer_size: usize,
    pub compression: CompressionKind,
    pub charset: String,
    pub retry_policy: RetryPolicy,
}

impl Default for FileReadOptions {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            compression: CompressionKind::None,
            charset: "UTF-8".to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// How a file-backed sink pipe should write its output.
#[derive(Debug, Clone)]
pub struct FileWriteOptions {
    pub buffer_size: usize,
    pub compression: CompressionKind,
    pub charset: String,
    /// Append to an existing file instead of truncating it.
    pub append: bool,
    /// Write into a temp file and rename into place on close.
    pub temp: bool,
    pub retry_policy: RetryPolicy,
    /// Read/write chunk size for streaming copies; 0 means "pick a
    /// sensible default" (currently `buffer_size`).
    pub chunk_size: usize,
}

impl Default for FileWriteOptions {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            compression: CompressionKind::None,
            charset: "UTF-8".to_string(),
            append: false,
            temp: false,
            retry_policy: RetryPolicy::default(),
            chunk_size: 0,
        }
    }
}

impl FileWriteOptions {
    /// Resolves [`Self::chunk_size`]'s "0 means default" convention.
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            self.buffer_size
        } else {
            self.chunk_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_defaults_match_documented_values() {
        let opts = FileReadOptions::default();
        assert_eq!(opts.buffer_size, 8192);
        assert_eq!(opts.compression, CompressionKind::None);
        assert_eq!(opts.charset, "UTF-8");
    }

    #[test]
    fn write_defaults_match_documented_values() {
        let opts = FileWriteOptions::default();
        assert!(!opts.append);
        assert!(!opts.temp);
        assert_eq!(opts.chunk_size, 0);
    }

    #[test]
    fn zero_chunk_size_falls_back_to_buffer_size() {
        let opts = FileWriteOptions {
            buffer_size: 4096,
            chunk_size: 0,
            ..FileWriteOptions::default()
        };
        assert_eq!(opts.effective_chunk_size(), 4096);
    }
}
