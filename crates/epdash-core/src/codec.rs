//! The bitmap wire codec.
//!
//! Zone content travels as a restricted BMP container: the exact profile the
//! device firmware can draw without transformation. The layout is fixed:
//!
//! ```text
//! offset  0  "BM" magic
//! offset  2  u32 total file size
//! offset  6  u32 reserved (zero)
//! offset 10  u32 pixel data offset (62 for this profile)
//! offset 14  u32 info header size (40)
//! offset 18  i32 width  (always positive)
//! offset 22  i32 height (sign carries row order: positive = bottom-up)
//! offset 26  u16 planes (1)
//! offset 28  u16 bits per pixel (1)
//! offset 30  u32 compression (0)
//! offset 34  u32 pixel data size
//! offset 38  2x i32 resolution, 2x u32 palette counts
//! offset 54  2x BGRA palette entries: index 0 black, index 1 white
//! offset 62  pixel rows, each padded to a 4-byte boundary, pad bits zero
//! ```
//!
//! All integers are little-endian. Encoding is deterministic: the same
//! raster always yields the same bytes, which is what makes the encoded
//! form fingerprintable.

use crate::error::CodecError;
use crate::raster::{Orientation, Raster};

/// Pixel data offset for this profile: 14-byte file header, 40-byte info
/// header, two 4-byte palette entries.
pub const PIXEL_DATA_OFFSET: usize = 62;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;
const HEADERS_LEN: usize = FILE_HEADER_LEN + INFO_HEADER_LEN;

/// Pixels per metre for a ~72 dpi hint; decoders ignore it.
const RESOLUTION_PPM: i32 = 2835;

/// Encode a raster into the wire container.
pub fn encode(raster: &Raster) -> Vec<u8> {
    let width = raster.width();
    let height = raster.height();
    let padded_stride = padded_stride_for(width);
    let pixel_bytes = padded_stride * height as usize;
    let total = PIXEL_DATA_OFFSET + pixel_bytes;

    let mut out = Vec::with_capacity(total);

    // File header
    out.extend_from_slice(b"BM");
    put_u32(&mut out, total as u32);
    put_u32(&mut out, 0);
    put_u32(&mut out, PIXEL_DATA_OFFSET as u32);

    // Info header
    put_u32(&mut out, INFO_HEADER_LEN as u32);
    put_i32(&mut out, width as i32);
    let signed_height = match raster.orientation() {
        Orientation::BottomUp => height as i32,
        Orientation::TopDown => -(height as i32),
    };
    put_i32(&mut out, signed_height);
    put_u16(&mut out, 1);
    put_u16(&mut out, 1);
    put_u32(&mut out, 0);
    put_u32(&mut out, pixel_bytes as u32);
    put_i32(&mut out, RESOLUTION_PPM);
    put_i32(&mut out, RESOLUTION_PPM);
    put_u32(&mut out, 2);
    put_u32(&mut out, 2);

    // Palette: index 0 black, index 1 white (BGRA)
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);

    // Pixel rows in wire order, padded to 4 bytes with zeros
    let stride = raster.stride();
    let pad = padded_stride - stride;
    for wire_row in 0..height {
        let mem_row = match raster.orientation() {
            Orientation::BottomUp => height - 1 - wire_row,
            Orientation::TopDown => wire_row,
        };
        out.extend_from_slice(raster.row(mem_row));
        out.extend(std::iter::repeat(0u8).take(pad));
    }

    out
}

/// Decode a wire container back into a raster.
///
/// Validates the magic bytes, bit depth, and buffer bounds; never reads
/// past the buffer. Trailing pad bits are normalized away so a decoded
/// raster compares equal to the raster that was encoded.
pub fn decode(buf: &[u8]) -> Result<Raster, CodecError> {
    if buf.len() < 2 {
        return Err(CodecError::Truncated {
            expected: HEADERS_LEN,
            actual: buf.len(),
        });
    }
    if &buf[0..2] != b"BM" {
        return Err(CodecError::BadMagic);
    }
    if buf.len() < HEADERS_LEN {
        return Err(CodecError::Truncated {
            expected: HEADERS_LEN,
            actual: buf.len(),
        });
    }

    let pixel_offset = read_u32(buf, 10) as usize;
    let width = read_i32(buf, 18);
    let height = read_i32(buf, 22);
    let bits_per_pixel = read_u16(buf, 28);
    let compression = read_u32(buf, 30);

    if bits_per_pixel != 1 {
        return Err(CodecError::UnsupportedBitDepth(bits_per_pixel));
    }
    if compression != 0 {
        return Err(CodecError::UnsupportedCompression(compression));
    }
    if width <= 0 || height == 0 {
        return Err(CodecError::BadDimensions { width, height });
    }
    if pixel_offset < HEADERS_LEN {
        return Err(CodecError::BadPixelOffset(pixel_offset as u32));
    }

    let orientation = if height > 0 {
        Orientation::BottomUp
    } else {
        Orientation::TopDown
    };
    let width = width as u32;
    let abs_height = height.unsigned_abs();

    let padded_stride = padded_stride_for(width);
    let needed = pixel_offset + padded_stride * abs_height as usize;
    if buf.len() < needed {
        return Err(CodecError::Truncated {
            expected: needed,
            actual: buf.len(),
        });
    }

    let stride = ((width as usize) + 7) / 8;
    let mut rows = Vec::with_capacity(stride * abs_height as usize);
    for mem_row in 0..abs_height {
        let wire_row = match orientation {
            Orientation::BottomUp => abs_height - 1 - mem_row,
            Orientation::TopDown => mem_row,
        };
        let start = pixel_offset + wire_row as usize * padded_stride;
        rows.extend_from_slice(&buf[start..start + stride]);
    }

    // Length is correct by construction at this point.
    Raster::from_packed_rows(width, abs_height, orientation, rows).ok_or(
        CodecError::BadDimensions {
            width: width as i32,
            height,
        },
    )
}

/// Row stride on the wire, padded to a 4-byte boundary.
fn padded_stride_for(width: u32) -> usize {
    ((width as usize) + 31) / 32 * 4
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn read_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

fn read_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn read_i32(buf: &[u8], off: usize) -> i32 {
    read_u32(buf, off) as i32
}
