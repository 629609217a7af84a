//! Device identity as a cache partition key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest token prefix that contributes to a key. Tokens are opaque
/// credentials of arbitrary length; the prefix is stable across requests
/// from the same device, which is all a partition key needs.
const KEY_PREFIX_LEN: usize = 16;

/// A stable cache partition key derived from an opaque device token.
///
/// Unknown or absent identities fall back to a single shared partition
/// rather than erroring: the protocol must serve unidentified callers, they
/// just share one change-tracking slot.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceKey(String);

impl DeviceKey {
    /// The shared partition for callers with no usable identity.
    pub fn shared() -> Self {
        Self("shared".to_string())
    }

    /// Derive a key from a caller-supplied token. Empty and absent tokens
    /// map to the shared partition.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => {
                let prefix: String = t
                    .trim()
                    .chars()
                    .take(KEY_PREFIX_LEN)
                    .map(|c| c.to_ascii_lowercase())
                    .collect();
                Self(prefix)
            }
            _ => Self::shared(),
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the shared fallback partition.
    pub fn is_shared(&self) -> bool {
        self.0 == "shared"
    }
}

impl fmt::Debug for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceKey({})", self.0)
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
