//! Address-like identities
//!
//! An [`Identity`] is the 20-byte address derived from the key that controls a
//! DID. Identities are never created by the ledger; they exist implicitly the
//! first time a request names them.

use crate::errors::{CustodyError, CustodyResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of bytes in an identity.
pub const IDENTITY_LEN: usize = 20;

/// Token amounts held in custody.
pub type Amount = u128;

/// Per-identity replay counter.
pub type Nonce = u64;

/// 20-byte address identifying a DID (or any token holder).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// The all-zero address.
    pub const ZERO: Identity = Identity([0u8; IDENTITY_LEN]);

    /// Create an identity from raw bytes
    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an identity from a slice, which must be exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> CustodyResult<Self> {
        let array: [u8; IDENTITY_LEN] = bytes.try_into().map_err(|_| {
            CustodyError::serialization(format!(
                "identity must be {IDENTITY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Whether this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; IDENTITY_LEN]
    }

    /// Canonical text form: `0x` followed by lowercase hex.
    ///
    /// Ownership proofs are signed over this representation, so it must never
    /// change (no checksum casing).
    pub fn to_canonical_string(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}

impl FromStr for Identity {
    type Err = CustodyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(trimmed)
            .map_err(|e| CustodyError::serialization(format!("invalid identity '{s}': {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl From<[u8; IDENTITY_LEN]> for Identity {
    fn from(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Identity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_lowercase_with_prefix() {
        let id = Identity::from_bytes([0xAB; IDENTITY_LEN]);
        assert_eq!(id.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn parses_mixed_case_with_and_without_prefix() {
        let lower: Identity = "0x00000000000000000000000000000000000000ff".parse().unwrap();
        let upper: Identity = "00000000000000000000000000000000000000FF".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_bytes()[19], 0xff);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("0x1234".parse::<Identity>().is_err());
        assert!(Identity::from_slice(&[0u8; 21]).is_err());
    }

    #[test]
    fn serde_uses_text_form() {
        let id = Identity::from_bytes([7u8; IDENTITY_LEN]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
