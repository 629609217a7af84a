//! Device state and its persisted form.

use serde::{Deserialize, Serialize};

use crate::error::StateDecodeError;

/// Schema version of [`PersistedState`]. Bump when the record shape
/// changes; loading a version this firmware does not know is an error,
/// never a silent default.
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Blob key for the persisted state record.
pub const STATE_KEY: &str = "device-state";

/// Blob key for the bound server configuration delivered by pairing.
pub const BOUND_CONFIG_KEY: &str = "bound-config";

/// The control loop's states. `Init` is initial; there is no terminal
/// state - the loop is perpetual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceState {
    Init,
    WifiConnect,
    Fetch,
    Render,
    Idle,
    Error,
    PairingMode,
    SetupRequired,
}

/// The state record written to stable storage on every transition.
///
/// A power cycle resumes the correct branch (full-redraw-needed vs normal
/// cadence) instead of replaying provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub schema_version: u32,
    pub state: DeviceState,
    /// Consecutive fetch/connect failures; resets on a successful fetch.
    pub error_count: u32,
    /// Partial renders since the last full redraw.
    pub refresh_count: u32,
    /// Unix ms of the last successful fetch cycle.
    pub last_success_ms: Option<i64>,
}

impl PersistedState {
    /// The record a never-provisioned device starts from.
    pub fn fresh() -> Self {
        Self {
            schema_version: STATE_SCHEMA_VERSION,
            state: DeviceState::Init,
            error_count: 0,
            refresh_count: 0,
            last_success_ms: None,
        }
    }

    /// Serialize for the blob store.
    pub fn encode(&self) -> Vec<u8> {
        // A struct of plain fields cannot fail to serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Deserialize from the blob store, gating on the schema version
    /// before touching the rest of the record.
    pub fn decode(bytes: &[u8]) -> Result<Self, StateDecodeError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| StateDecodeError::Malformed(e.to_string()))?;

        let version = value
            .get("schema_version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| StateDecodeError::Malformed("missing schema_version".into()))?;
        if version != STATE_SCHEMA_VERSION as u64 {
            return Err(StateDecodeError::UnknownVersion(version as u32));
        }

        serde_json::from_value(value).map_err(|e| StateDecodeError::Malformed(e.to_string()))
    }
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::fresh()
    }
}
