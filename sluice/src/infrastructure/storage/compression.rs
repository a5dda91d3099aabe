// /////////////////////////////////////////////////////////////////////////////
// Sluice
// SPDX-License-Identifier: Apache-2.0
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Compressed-stream plumbing (spec.md section 4.7).
//!
//! Wraps a raw byte stream with a decoder (`decoding_reader`) or an encoder
//! (`encoding_writer`) for one of the compression kinds in
//! [`CompressionKind`]. `Lz4` is recognised as a value everywhere else in
//! this workspace but deliberately refused here — it is reserved,
//! unimplemented, per spec.md section 4.7.

use sluice_domain::{CompressionKind, PipeError};
use std::io::{Read, Write};

/// Wraps `raw` with a decompressing reader for `kind`. `None` passes the
/// stream through unchanged.
pub fn decoding_reader(raw: Box<dyn Read + Send>, kind: CompressionKind) -> Result<Box<dyn Read + Send>, PipeError> {
    match kind {
        CompressionKind::None => Ok(raw),
        CompressionKind::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(raw))),
        CompressionKind::Zstd => {
            let decoder = zstd::stream::read::Decoder::new(raw).map_err(PipeError::from)?;
            Ok(Box::new(decoder))
        }
        CompressionKind::Lz4 => Err(PipeError::unsupported("lz4 compression is reserved, not implemented")),
    }
}

/// Wraps `raw` with a compressing writer for `kind` at `level` (clamped to
/// the codec's valid range; pass `kind.default_level()` when the caller has
/// no opinion). The returned writer must be explicitly finished via
/// [`finish_writer`] to flush trailing frame data.
pub fn encoding_writer(raw: Box<dyn Write + Send>, kind: CompressionKind, level: i32) -> Result<Box<dyn EncodingWriter>, PipeError> {
    match kind {
        CompressionKind::None => Ok(Box::new(PassthroughWriter(raw))),
        CompressionKind::Gzip => {
            let level = level.clamp(0, 9) as u32;
            Ok(Box::new(flate2::write::GzEncoder::new(raw, flate2::Compression::new(level))))
        }
        CompressionKind::Zstd => {
            let level = level.clamp(1, 22);
            let encoder = zstd::stream::write::Encoder::new(raw, level).map_err(PipeError::from)?;
            Ok(Box::new(encoder.auto_finish()))
        }
        CompressionKind::Lz4 => Err(PipeError::unsupported("lz4 compression is reserved, not implemented")),
    }
}

/// A compressing writer that must be explicitly finished so the final
/// frame/trailer is flushed before the underlying file is considered
/// complete.
pub trait EncodingWriter: Write + Send {
    fn finish(self: Box<Self>) -> Result<(), PipeError>;
}

struct PassthroughWriter(Box<dyn Write + Send>);
impl Write for PassthroughWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}
impl EncodingWriter for PassthroughWriter {
    fn finish(mut self: Box<Self>) -> Result<(), PipeError> {
        self.0.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> EncodingWriter for flate2::write::GzEncoder<W> {
    fn finish(self: Box<Self>) -> Result<(), PipeError> {
        (*self).finish()?;
        Ok(())
    }
}

impl<'a, W: Write + Send> EncodingWriter for zstd::stream::write::AutoFinishEncoder<'a, W> {
    fn finish(self: Box<Self>) -> Result<(), PipeError> {
        drop(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Cursor;

    fn round_trip(kind: CompressionKind, level: i32, payload: &[u8]) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        {
            let file = File::create(&path).unwrap();
            let mut w = encoding_writer(Box::new(file), kind, level).unwrap();
            w.write_all(payload).unwrap();
            w.finish().unwrap();
        }
        let file = File::open(&path).unwrap();
        let mut r = decoding_reader(Box::new(file), kind).unwrap();
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn gzip_round_trips() {
        assert_eq!(round_trip(CompressionKind::Gzip, 6, b"hello sluice"), b"hello sluice");
    }

    #[test]
    fn zstd_round_trips() {
        assert_eq!(round_trip(CompressionKind::Zstd, 3, b"hello zstd"), b"hello zstd");
    }

    #[test]
    fn none_round_trips() {
        assert_eq!(round_trip(CompressionKind::None, 0, b"plain"), b"plain");
    }

    #[test]
    fn lz4_is_refused() {
        assert!(decoding_reader(Box::new(Cursor::new(Vec::<u8>::new())), CompressionKind::Lz4).is_err());
        assert!(encoding_writer(Box::new(Cursor::new(Vec::<u8>::new())), CompressionKind::Lz4, 1).is_err());
    }
}
