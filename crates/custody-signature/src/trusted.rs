//! Globally trusted signers
//!
//! Trusted signers vouch for off-ledger data (reward claims, attestations)
//! rather than for identities. A data signature recovers a context signer, and
//! the accompanying proof must be a trusted signer's signature over
//! `"{trusted}{context_signer}"`.

use crate::ecdsa::recover_signer;
use crate::errors::{SignatureError, SignatureResult};
use crate::verifier::SignatureVerifier;
use custody_core::{ownership_proof_message, CustodyError, CustodyResult, Identity};
use indexmap::IndexSet;
use parking_lot::RwLock;

/// Administrator-managed set of trusted signers
#[derive(Debug, Default)]
pub struct TrustedSignerRegistry {
    signers: RwLock<IndexSet<Identity>>,
}

impl TrustedSignerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with initial signers
    pub fn with_signers(signers: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            signers: RwLock::new(signers.into_iter().collect()),
        }
    }

    /// Register a trusted signer
    pub fn add(&self, signer: Identity) -> CustodyResult<()> {
        if !self.signers.write().insert(signer) {
            return Err(CustodyError::RegisteredSigner {
                signer: signer.to_string(),
            });
        }
        tracing::info!(%signer, "trusted signer added");
        Ok(())
    }

    /// Remove a trusted signer
    pub fn remove(&self, signer: &Identity) -> CustodyResult<()> {
        if !self.signers.write().shift_remove(signer) {
            return Err(CustodyError::UnregisteredSigner {
                signer: signer.to_string(),
            });
        }
        tracing::info!(%signer, "trusted signer removed");
        Ok(())
    }

    /// Drop every trusted signer and register `signers` instead
    pub fn replace_all(&self, signers: impl IntoIterator<Item = Identity>) {
        *self.signers.write() = signers.into_iter().collect();
    }

    /// Whether `signer` is trusted
    pub fn contains(&self, signer: &Identity) -> bool {
        self.signers.read().contains(signer)
    }

    /// All trusted signers in registration order
    pub fn signers(&self) -> Vec<Identity> {
        self.signers.read().iter().copied().collect()
    }

    /// Verify data vouched for by a trusted signer; returns that signer
    pub fn verify_data(
        &self,
        data: &[u8],
        signature: &[u8],
        proof: &[u8],
    ) -> SignatureResult<Identity> {
        let context_signer = recover_signer(data, signature)?;
        let verifier = SignatureVerifier::new();

        let signers = self.signers.read();
        signers
            .iter()
            .find(|trusted| {
                let message = ownership_proof_message(trusted, &context_signer);
                verifier.verify(&message, proof, trusted)
            })
            .copied()
            .ok_or(SignatureError::UntrustedProof)
    }
}
