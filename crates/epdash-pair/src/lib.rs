//! # Epdash Pair
//!
//! The pairing side of device provisioning: short-lived human-readable
//! codes that bind a freshly provisioned device to its server-side
//! configuration.
//!
//! ## Flow
//!
//! ```text
//! device                registry                 setup wizard
//!   │── create code ──────>│
//!   │<── "A7X9K2" ─────────│
//!   │   (shows code)       │<── submit(code, config) ──│
//!   │── poll(code) ───────>│
//!   │<── paired(config) ───│
//! ```
//!
//! The provisioning transport itself (a short-range channel) carries only
//! network credentials; the server location travels exclusively through the
//! bound configuration delivered here. Codes expire after a fixed TTL and
//! are single-use for writing: a late duplicate wizard submission cannot
//! overwrite a delivered configuration.

pub mod code;
pub mod error;
pub mod messages;
pub mod registry;

pub use code::{PairingCode, CODE_ALPHABET, CODE_LEN};
pub use error::{PairError, Result};
pub use messages::{PollResponse, SubmitRequest, SubmitResponse};
pub use registry::{
    BoundConfig, PairingRegistry, PairingSession, PollOutcome, SessionStatus, SubmitOutcome,
    DEFAULT_PAIRING_TTL_MS,
};
