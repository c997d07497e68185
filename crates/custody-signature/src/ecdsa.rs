//! Recoverable secp256k1 signatures
//!
//! Messages are hashed with keccak-256 and signed without any prefix. A
//! signature is `r ∥ s ∥ v` (65 bytes); the signer's identity is the last 20
//! bytes of the keccak-256 hash of its uncompressed public key.

use crate::errors::{SignatureError, SignatureResult};
use custody_core::Identity;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

/// Length of an encoded recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Half of the secp256k1 group order; canonical signatures have `s <= N/2`.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// keccak-256 of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Identity controlled by a public key
pub fn identity_from_verifying_key(key: &VerifyingKey) -> Identity {
    let point = key.as_affine().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Identity::from_bytes(bytes)
}

/// A parsed `r ∥ s ∥ v` signature
#[derive(Debug, Clone, Copy)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Parse 65 signature bytes, rejecting malleable encodings
    pub fn from_bytes(bytes: &[u8]) -> SignatureResult<Self> {
        if bytes.is_empty() {
            return Err(SignatureError::Empty);
        }
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }

        let v = bytes[64];
        let recovery_byte = match v {
            0 | 1 => v,
            27 | 28 => v - 27,
            other => return Err(SignatureError::InvalidRecoveryId(other)),
        };
        let recovery_id = RecoveryId::from_byte(recovery_byte)
            .ok_or(SignatureError::InvalidRecoveryId(v))?;

        if bytes[32..64] > HALF_ORDER[..] {
            return Err(SignatureError::HighS);
        }

        let signature = Signature::from_slice(&bytes[..64])
            .map_err(|e| SignatureError::Malformed(e.to_string()))?;

        Ok(Self {
            signature,
            recovery_id,
        })
    }

    /// Build from k256 parts
    pub fn from_parts(signature: Signature, recovery_id: RecoveryId) -> Self {
        Self {
            signature,
            recovery_id,
        }
    }

    /// Encode as `r ∥ s ∥ v` with `v` in {27, 28}
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&self.signature.to_bytes());
        out[64] = self.recovery_id.to_byte() + 27;
        out
    }

    /// Recover the identity that signed `message`
    pub fn recover(&self, message: &[u8]) -> SignatureResult<Identity> {
        let digest = keccak256(message);
        let key = VerifyingKey::recover_from_prehash(&digest, &self.signature, self.recovery_id)
            .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;
        Ok(identity_from_verifying_key(&key))
    }
}

/// Recover the signer of `message` from raw signature bytes
pub fn recover_signer(message: &[u8], signature: &[u8]) -> SignatureResult<Identity> {
    RecoverableSignature::from_bytes(signature)?.recover(message)
}
