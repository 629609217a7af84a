//! Zone naming and geometry.
//!
//! A zone is a named rectangle within a fixed canvas. Rectangles are
//! immutable for a given id; geometry lives in the server's zone table and
//! travels to the device as reply metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas width of the reference display (7.5" panel).
pub const CANVAS_W: u32 = 800;

/// Canvas height of the reference display.
pub const CANVAS_H: u32 = 480;

/// A zone identifier as requested over the wire.
///
/// Ids are short ASCII names ("header", "trains", ...). They are compared
/// verbatim; unknown ids are a client error, not a fallback.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    /// Create a zone id from a wire string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZoneId({})", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A zone's rectangle on the canvas.
///
/// Invariant: `w, h > 0`. The rectangle for a given zone id never changes
/// while the server runs; devices may fall back to a locally compiled table
/// but the reply metadata is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl ZoneRect {
    /// Construct a rectangle. Zero-area rectangles are not representable
    /// in the zone table, so this is a plain constructor.
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

impl fmt::Display for ZoneRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{}) {}x{}", self.x, self.y, self.w, self.h)
    }
}
