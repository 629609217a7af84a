//! Error types for pairing.

use thiserror::Error;

/// Errors in the pairing flow.
///
/// `NotFound`/`AlreadyPaired` also exist as [`crate::registry::PollOutcome`]
/// / [`crate::registry::SubmitOutcome`] variants because for the registry
/// they are ordinary control flow; the error forms are for callers that
/// need a failing result (e.g. a facade mapping them onto wire statuses).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairError {
    /// The code string is not a well-formed pairing code.
    #[error("invalid pairing code: {0}")]
    InvalidCode(String),

    /// No live session for this code.
    #[error("pairing code not found")]
    NotFound,

    /// The session existed but its window elapsed.
    #[error("pairing code expired")]
    Expired,

    /// The code is already bound to a configuration.
    #[error("pairing code already bound")]
    AlreadyBound,
}

/// Result type for pairing operations.
pub type Result<T> = std::result::Result<T, PairError>;
