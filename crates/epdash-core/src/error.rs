//! Error types for the epdash core.

use thiserror::Error;

/// Errors produced while decoding a zone bitmap.
///
/// Every variant means "malformed bitmap": the buffer cannot be interpreted
/// as the restricted 1-bit container this protocol speaks. A decode failure
/// is fatal to that render attempt only, never to the caller's loop.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("bad magic bytes: expected 'BM'")]
    BadMagic,

    #[error("truncated buffer: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unsupported bit depth: {0} (only 1-bit is spoken)")]
    UnsupportedBitDepth(u16),

    #[error("unsupported compression mode: {0}")]
    UnsupportedCompression(u32),

    #[error("bad dimensions: {width}x{height}")]
    BadDimensions { width: i32, height: i32 },

    #[error("pixel data offset {0} is inside the headers")]
    BadPixelOffset(u32),
}
