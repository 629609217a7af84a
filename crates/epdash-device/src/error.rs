//! Error types for the device crate.

use std::time::Duration;

use epdash_store::StoreError;
use epdash_sync::ZoneFetchError;
use thiserror::Error;

/// Failure decoding a persisted state blob.
///
/// An unknown schema version is distinct from a malformed blob: it means a
/// newer firmware wrote the record, and silently defaulting would replay
/// provisioning on a perfectly healthy device.
#[derive(Debug, Error)]
pub enum StateDecodeError {
    #[error("malformed state blob: {0}")]
    Malformed(String),

    #[error("unknown state schema version: {0}")]
    UnknownVersion(u32),
}

/// Errors surfaced by device-side operations.
///
/// These never escape the control loop; the machine maps every one of them
/// onto the `Error` (or `SetupRequired`) state. They exist so endpoint
/// implementations and tests can speak precisely about what failed.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A bounded operation hit its timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The network link could not be established.
    #[error("network link down: {0}")]
    LinkDown(String),

    /// Zone fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] ZoneFetchError),

    /// Pairing endpoint failed at the transport level.
    #[error("pairing transport: {0}")]
    Pairing(String),

    /// Display hardware refused an operation.
    #[error("display: {0}")]
    Display(String),

    /// The state store failed.
    #[error("state store: {0}")]
    Store(#[from] StoreError),

    /// The persisted state blob could not be decoded.
    #[error("persisted state: {0}")]
    State(#[from] StateDecodeError),
}

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
