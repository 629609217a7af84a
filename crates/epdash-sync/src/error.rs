//! Error types for the sync module.

use epdash_core::{CodecError, ZoneId};
use thiserror::Error;

/// Errors that can occur while dispatching a zone request.
///
/// Render problems never appear here: a zone that cannot be rendered
/// degrades to its blank fallback instead of failing the dispatch. What
/// remains is the caller asking for something the table does not know.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested zone id is not in the zone table. A client error on
    /// the wire, never a 5xx.
    #[error("unknown zone: {0}")]
    UnknownZone(ZoneId),

    /// A reply payload failed to parse as the bitmap container.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
