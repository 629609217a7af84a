//! Pairing codes.
//!
//! A pairing code is what a person reads off the e-ink screen and types
//! into the setup wizard, so the alphabet excludes visually confusable
//! characters (no I, L, O, 0, 1) and comparison is case-insensitive.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PairError;

/// The unambiguous code alphabet.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Code length in characters.
pub const CODE_LEN: usize = 6;

/// A normalized (upper-case) pairing code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairingCode(String);

impl PairingCode {
    /// Draw a fresh code from the given RNG. Uniqueness among live codes is
    /// the registry's job, not this function's.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let chars: String = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(chars)
    }

    /// Parse user input: trims, upper-cases, and validates length and
    /// alphabet.
    pub fn parse(input: &str) -> Result<Self, PairError> {
        let normalized: String = input.trim().to_ascii_uppercase();
        if normalized.len() != CODE_LEN {
            return Err(PairError::InvalidCode(input.to_string()));
        }
        if !normalized.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(PairError::InvalidCode(input.to_string()));
        }
        Ok(Self(normalized))
    }

    /// The code as displayed to the user.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Debug and Display both show the code verbatim; it is user-facing data.
impl fmt::Debug for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairingCode({})", self.0)
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
