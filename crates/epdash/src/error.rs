//! Error types for the server facade.

use epdash_sync::SyncError;
use thiserror::Error;

/// Errors a server method can return.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Zone dispatch failed (unknown zone id).
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The caller's token has no bound configuration. The wire maps this
    /// to the "setup required" signal, not to a server fault.
    #[error("configuration missing for device token")]
    ConfigurationMissing,
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
