//! Content fingerprints for encoded zone bitmaps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte fingerprint, computed as Blake3 over the encoded bitmap bytes.
///
/// Two zones with identical encoded content have the same fingerprint; the
/// cache uses this for change detection only, so collision resistance is
/// required but unforgeability is not.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Fingerprint encoded bitmap bytes.
    pub fn of(encoded: &[u8]) -> Self {
        Self(*blake3::hash(encoded).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (the stable wire header form).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = Fingerprint::of(b"zone bytes");
        let b = Fingerprint::of(b"zone bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_content() {
        assert_ne!(Fingerprint::of(b"a"), Fingerprint::of(b"b"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let fp = Fingerprint::of(b"payload");
        let recovered = Fingerprint::from_hex(&fp.to_hex()).unwrap();
        assert_eq!(fp, recovered);
    }

    #[test]
    fn test_from_hex_rejects_short_input() {
        assert!(Fingerprint::from_hex("abcd").is_err());
    }
}
