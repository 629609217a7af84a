//! Zone protocol wire types.
//!
//! These mirror the HTTP contract the firmware speaks: a request names a
//! zone and carries an opaque device token plus an optional force flag; the
//! reply is either a not-modified signal or the encoded bitmap with the
//! zone's rectangle and fingerprint as metadata.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use epdash_core::{Fingerprint, ZoneId, ZoneRect};

/// Message size limits.
pub mod limits {
    /// Max encoded zone payload the device buffer accepts. A full-canvas
    /// 800x480 frame encodes to 48,062 bytes; anything above this bound is
    /// a protocol violation, not a big zone.
    pub const MAX_ZONE_BYTES: usize = 49_152;

    /// Max length of a device token on the wire.
    pub const MAX_TOKEN_LEN: usize = 128;
}

/// A device's request for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRequest {
    /// Which zone to render.
    pub zone: ZoneId,
    /// Opaque device/config credential; partitions the server-side cache.
    pub device_token: Option<String>,
    /// Bypass the cache: the device discarded its last render and needs
    /// bytes regardless of change detection.
    pub force: bool,
}

impl ZoneRequest {
    /// Plain request without identity or force.
    pub fn new(zone: impl Into<ZoneId>) -> Self {
        Self {
            zone: zone.into(),
            device_token: None,
            force: false,
        }
    }

    /// Attach a device token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    /// Set the force flag.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Check wire limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if let Some(token) = &self.device_token {
            if token.len() > limits::MAX_TOKEN_LEN {
                return Err("device token too long");
            }
        }
        Ok(())
    }
}

/// The server's reply to a zone request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneReply {
    /// The device already holds this content; no bytes travel. The
    /// fingerprint lets the client verify its copy is the one the server
    /// means.
    NotModified { fingerprint: Fingerprint },

    /// Fresh content. The rectangle is authoritative: the device draws at
    /// this offset even if its local table disagrees.
    Payload {
        fingerprint: Fingerprint,
        rect: ZoneRect,
        bytes: Bytes,
    },
}

impl ZoneReply {
    /// The fingerprint carried by either arm.
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            ZoneReply::NotModified { fingerprint } => *fingerprint,
            ZoneReply::Payload { fingerprint, .. } => *fingerprint,
        }
    }

    /// Whether this reply carries bytes.
    pub fn is_payload(&self) -> bool {
        matches!(self, ZoneReply::Payload { .. })
    }

    /// Check wire limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if let ZoneReply::Payload { bytes, .. } = self {
            if bytes.len() > limits::MAX_ZONE_BYTES {
                return Err("zone payload too large");
            }
        }
        Ok(())
    }
}

/// Failure outcomes a device can see from a zone fetch.
///
/// This is the device's view of the exchange: server-reported conditions
/// plus the transport failures in between. `ConfigurationMissing` routes
/// the state machine to its setup-required branch, everything else to
/// error backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ZoneFetchError {
    /// The server has no bound configuration for this device yet.
    #[error("configuration missing: device not set up")]
    ConfigurationMissing,

    /// The server does not know the requested zone id.
    #[error("unknown zone: {0}")]
    UnknownZone(String),

    /// Network-level failure or timeout.
    #[error("transport failure: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = ZoneRequest::new("header").with_token("tok-1").forced();
        assert_eq!(req.zone.as_str(), "header");
        assert_eq!(req.device_token.as_deref(), Some("tok-1"));
        assert!(req.force);
    }

    #[test]
    fn test_reply_fingerprint_both_arms() {
        let fp = Fingerprint::of(b"x");
        let not_modified = ZoneReply::NotModified { fingerprint: fp };
        let payload = ZoneReply::Payload {
            fingerprint: fp,
            rect: ZoneRect::new(0, 0, 8, 8),
            bytes: Bytes::from_static(b"BM"),
        };
        assert_eq!(not_modified.fingerprint(), fp);
        assert_eq!(payload.fingerprint(), fp);
        assert!(!not_modified.is_payload());
        assert!(payload.is_payload());
    }

    #[test]
    fn test_limits_rejected() {
        let req = ZoneRequest::new("header").with_token("x".repeat(200));
        assert!(req.validate_limits().is_err());

        let reply = ZoneReply::Payload {
            fingerprint: Fingerprint::of(b"x"),
            rect: ZoneRect::new(0, 0, 8, 8),
            bytes: Bytes::from(vec![0u8; limits::MAX_ZONE_BYTES + 1]),
        };
        assert!(reply.validate_limits().is_err());
    }

    #[test]
    fn test_request_serde_roundtrip() {
        let req = ZoneRequest::new("legs").with_token("tok");
        let json = serde_json::to_string(&req).unwrap();
        let back: ZoneRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
