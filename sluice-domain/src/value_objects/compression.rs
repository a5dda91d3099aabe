// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Compression kind value object (spec.md section 4.7).

use serde::{Deserialize, Serialize};

/// The compression variants the compressed-I/O substrate understands.
///
/// `Lz4` is reserved: recognised as a value (so configuration round-trips
/// and file-extension detection doesn't panic on it) but
/// `sluice::infrastructure::storage::compression` refuses to construct an
/// encoder/decoder for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionKind {
    None,
    Gzip,
    Zstd,
    Lz4,
}

impl CompressionKind {
    /// The canonical file extension for this compression kind, including
    /// the leading dot. `None` has no extension.
    pub fn extension(self) -> &'static str {
        match self {
            CompressionKind::None => "",
            CompressionKind::Gzip => ".gz",
            CompressionKind::Zstd => ".zst",
            CompressionKind::Lz4 => ".lz4",
        }
    }

    /// The implementation's default compression level for this kind.
    pub fn default_level(self) -> i32 {
        match self {
            CompressionKind::None => 0,
            CompressionKind::Gzip => 6,
            CompressionKind::Zstd => 3,
            CompressionKind::Lz4 => 1,
        }
    }

    /// Detects compression from a filename's suffix, per
    /// `FileReadOptions`'s auto-detect behaviour (spec.md section 4.7).
    ///
    /// Note: this deliberately strips only the trailing compression
    /// extension, matching the ambiguity spec.md section 9 calls out in
    /// `removeCSVExtension` (stripping `.csv.zst` removes only `.zst`, not
    /// `.csv.zst`) — callers that also want the inner codec extension
    /// removed must strip it themselves after calling this.
    pub fn detect_from_filename(name: &str) -> CompressionKind {
        if name.ends_with(".gz") {
            CompressionKind::Gzip
        } else if name.ends_with(".zst") {
            CompressionKind::Zstd
        } else if name.ends_with(".lz4") {
            CompressionKind::Lz4
        } else {
            CompressionKind::None
        }
    }
}

impl Default for CompressionKind {
    fn default() -> Self {
        CompressionKind::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(CompressionKind::detect_from_filename("a.txt.gz"), CompressionKind::Gzip);
        assert_eq!(CompressionKind::detect_from_filename("a.txt.zst"), CompressionKind::Zstd);
        assert_eq!(CompressionKind::detect_from_filename("a.txt"), CompressionKind::None);
    }

    #[test]
    fn strips_only_the_compression_suffix() {
        let stripped = "data.csv.zst".strip_suffix(CompressionKind::Zstd.extension()).unwrap();
        assert_eq!(stripped, "data.csv");
    }
}
