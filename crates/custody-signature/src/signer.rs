//! Signing side of the protocol
//!
//! Relayer clients and collaborators use [`ContextSigner`] to produce request
//! signatures and ownership proofs that the ledger will accept.

use crate::domain::collaborator_payload;
use crate::ecdsa::{identity_from_verifying_key, keccak256, RecoverableSignature};
use crate::errors::{SignatureError, SignatureResult};
use custody_core::{ownership_proof_message, Identity, Nonce, SignedOperation};
use k256::ecdsa::SigningKey;
use std::fmt;

/// A secp256k1 key able to sign requests and proofs
#[derive(Clone)]
pub struct ContextSigner {
    key: SigningKey,
    identity: Identity,
}

impl ContextSigner {
    /// Load a signer from a 32-byte secret scalar
    pub fn from_secret_bytes(secret: &[u8]) -> SignatureResult<Self> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| SignatureError::Malformed(format!("invalid secret key: {e}")))?;
        Ok(Self::from_signing_key(key))
    }

    /// Wrap an existing k256 signing key
    pub fn from_signing_key(key: SigningKey) -> Self {
        let identity = identity_from_verifying_key(key.verifying_key());
        Self { key, identity }
    }

    /// Derive a signer deterministically from a seed string.
    ///
    /// The secret is the keccak-256 chain of the seed; the chain continues until
    /// a valid scalar is found.
    pub fn from_seed(seed: &str) -> Self {
        let mut secret = keccak256(seed.as_bytes());
        loop {
            if let Ok(key) = SigningKey::from_slice(&secret) {
                return Self::from_signing_key(key);
            }
            secret = keccak256(&secret);
        }
    }

    /// Generate a fresh random signer
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// Identity controlled by this key
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Sign `message` (keccak-256, no prefix) as `r ∥ s ∥ v`
    pub fn sign(&self, message: &[u8]) -> SignatureResult<Vec<u8>> {
        let digest = keccak256(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SignatureError::Malformed(e.to_string()))?;
        Ok(RecoverableSignature::from_parts(signature, recovery_id)
            .to_bytes()
            .to_vec())
    }

    /// Sign a typed operation bound to `nonce`
    pub fn sign_operation(
        &self,
        operation: &SignedOperation,
        nonce: Nonce,
    ) -> SignatureResult<Vec<u8>> {
        self.sign(&operation.payload(nonce))
    }

    /// Sign collaborator `params` for `domain`, acting as `identity`
    pub fn sign_collaborator(
        &self,
        identity: &Identity,
        domain: &str,
        params: &[u8],
        nonce: Nonce,
    ) -> SignatureResult<Vec<u8>> {
        self.sign(&collaborator_payload(identity, domain, params, nonce)?)
    }

    /// Ownership proof over `"{self}{self}"`
    pub fn self_proof(&self) -> SignatureResult<Vec<u8>> {
        self.proof_for(&self.identity)
    }

    /// Ownership proof over `"{self}{context_signer}"`, vouching that
    /// `context_signer` signs on this key's behalf
    pub fn proof_for(&self, context_signer: &Identity) -> SignatureResult<Vec<u8>> {
        self.sign(&ownership_proof_message(&self.identity, context_signer))
    }
}

impl fmt::Debug for ContextSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSigner")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_signers_are_deterministic() {
        let a = ContextSigner::from_seed("alice");
        let b = ContextSigner::from_seed("alice");
        let c = ContextSigner::from_seed("bob");
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let signer = ContextSigner::from_seed("debug");
        let text = format!("{signer:?}");
        assert!(text.contains(&signer.identity().to_string()));
        assert!(!text.contains("SigningKey"));
    }

    #[test]
    fn rejects_zero_secret() {
        assert!(ContextSigner::from_secret_bytes(&[0u8; 32]).is_err());
    }
}
