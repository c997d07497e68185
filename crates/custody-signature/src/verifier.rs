//! Request signature and ownership proof verification
//!
//! A request carries two signatures:
//!
//! - the **request signature** over the packed payload, made by a *context
//!   signer* (often, but not necessarily, the identity's own key);
//! - the **ownership proof**, binding the context signer to the identity. It
//!   is a signature over `"{owner}{context_signer}"` made either by the
//!   identity itself or by one of its registered delegates.
//!
//! Both must verify independently. Verification is read-only.

use crate::ecdsa::recover_signer;
use crate::errors::{SignatureError, SignatureResult};
use custody_core::{ownership_proof_message, Identity, RequestAuthority};

/// Source of an identity's delegated signers
pub trait DelegateLookup {
    /// Delegates registered by `identity`, in registration order
    fn delegates_of(&self, identity: &Identity) -> Vec<Identity>;
}

/// Lookup for callers that do not support delegation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelegates;

impl DelegateLookup for NoDelegates {
    fn delegates_of(&self, _identity: &Identity) -> Vec<Identity> {
        Vec::new()
    }
}

/// Who vouched for a verified request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofAuthority {
    /// The identity signed the proof itself
    Owner,
    /// A registered delegate signed the proof
    Delegate(Identity),
}

impl ProofAuthority {
    /// Signer of the ownership proof for a request acting as `identity`
    pub fn vouched_by(&self, identity: &Identity) -> Identity {
        match self {
            ProofAuthority::Owner => *identity,
            ProofAuthority::Delegate(delegate) => *delegate,
        }
    }
}

/// Outcome of a successful request verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// Identity the request acts for
    pub identity: Identity,
    /// Key that signed the payload
    pub context_signer: Identity,
    /// Who produced the ownership proof
    pub authority: ProofAuthority,
}

impl From<VerifiedRequest> for RequestAuthority {
    fn from(verified: VerifiedRequest) -> Self {
        RequestAuthority {
            context_signer: verified.context_signer,
            vouched_by: verified.authority.vouched_by(&verified.identity),
        }
    }
}

/// Stateless verifier
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a verifier
    pub fn new() -> Self {
        Self
    }

    /// Whether `signature` over `message` recovers to `expected_signer`
    pub fn verify(&self, message: &[u8], signature: &[u8], expected_signer: &Identity) -> bool {
        self.verify_signer(message, signature, expected_signer)
            .is_ok()
    }

    /// Like [`verify`](Self::verify) but reports why verification failed
    pub fn verify_signer(
        &self,
        message: &[u8],
        signature: &[u8],
        expected_signer: &Identity,
    ) -> SignatureResult<()> {
        let actual = recover_signer(message, signature)?;
        if actual != *expected_signer {
            return Err(SignatureError::SignerMismatch {
                expected: *expected_signer,
                actual,
            });
        }
        Ok(())
    }

    /// Verify an ownership proof binding `context_signer` to `identity`
    pub fn verify_ownership_proof(
        &self,
        identity: &Identity,
        context_signer: &Identity,
        proof: &[u8],
        delegates: &impl DelegateLookup,
    ) -> SignatureResult<ProofAuthority> {
        let owner_message = ownership_proof_message(identity, context_signer);
        let owner_signer = recover_signer(&owner_message, proof)?;
        if owner_signer == *identity {
            return Ok(ProofAuthority::Owner);
        }

        for delegate in delegates.delegates_of(identity) {
            let message = ownership_proof_message(&delegate, context_signer);
            if self.verify(&message, proof, &delegate) {
                tracing::debug!(%identity, %delegate, "ownership proof made by delegate");
                return Ok(ProofAuthority::Delegate(delegate));
            }
        }

        Err(SignatureError::UnauthorizedProofSigner {
            identity: *identity,
            signer: owner_signer,
        })
    }

    /// Verify the request signature over `payload` and its ownership proof
    pub fn verify_request(
        &self,
        identity: &Identity,
        payload: &[u8],
        signature: &[u8],
        proof: &[u8],
        delegates: &impl DelegateLookup,
    ) -> SignatureResult<VerifiedRequest> {
        let context_signer = recover_signer(payload, signature)?;
        let authority = self.verify_ownership_proof(identity, &context_signer, proof, delegates)?;

        tracing::debug!(
            %identity,
            %context_signer,
            ?authority,
            payload_len = payload.len(),
            "request signature verified"
        );

        Ok(VerifiedRequest {
            identity: *identity,
            context_signer,
            authority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::ContextSigner;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    struct Delegations(HashMap<Identity, Vec<Identity>>);

    impl DelegateLookup for Delegations {
        fn delegates_of(&self, identity: &Identity) -> Vec<Identity> {
            self.0.get(identity).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn verify_matches_expected_signer_only() {
        let alice = ContextSigner::from_seed("alice");
        let bob = ContextSigner::from_seed("bob");
        let sig = alice.sign(b"payload").unwrap();
        let verifier = SignatureVerifier::new();

        assert!(verifier.verify(b"payload", &sig, &alice.identity()));
        assert!(!verifier.verify(b"payload", &sig, &bob.identity()));
        assert!(!verifier.verify(b"payload", &[], &alice.identity()));
    }

    #[test]
    fn self_signed_request_verifies() {
        let alice = ContextSigner::from_seed("alice");
        let sig = alice.sign(b"payload").unwrap();
        let proof = alice.self_proof().unwrap();

        let verified = SignatureVerifier::new()
            .verify_request(&alice.identity(), b"payload", &sig, &proof, &NoDelegates)
            .unwrap();
        assert_eq!(verified.context_signer, alice.identity());
        assert_eq!(verified.authority, ProofAuthority::Owner);
    }

    #[test]
    fn owner_can_vouch_for_context_key() {
        let alice = ContextSigner::from_seed("alice");
        let context = ContextSigner::from_seed("alice-app-context");
        let sig = context.sign(b"payload").unwrap();
        let proof = alice.proof_for(&context.identity()).unwrap();

        let verified = SignatureVerifier::new()
            .verify_request(&alice.identity(), b"payload", &sig, &proof, &NoDelegates)
            .unwrap();
        assert_eq!(verified.context_signer, context.identity());
    }

    #[test]
    fn substituted_proof_is_rejected() {
        let alice = ContextSigner::from_seed("alice");
        let mallory = ContextSigner::from_seed("mallory");
        let sig = alice.sign(b"payload").unwrap();
        let proof = mallory.self_proof().unwrap();

        assert_matches!(
            SignatureVerifier::new().verify_request(
                &alice.identity(),
                b"payload",
                &sig,
                &proof,
                &NoDelegates
            ),
            Err(SignatureError::UnauthorizedProofSigner { .. })
        );
    }

    #[test]
    fn registered_delegate_can_prove_ownership() {
        let alice = ContextSigner::from_seed("alice");
        let delegate = ContextSigner::from_seed("delegate");
        let sig = alice.sign(b"payload").unwrap();
        let proof = delegate.proof_for(&alice.identity()).unwrap();

        let verifier = SignatureVerifier::new();
        assert!(verifier
            .verify_request(&alice.identity(), b"payload", &sig, &proof, &NoDelegates)
            .is_err());

        let lookup = Delegations(HashMap::from([(
            alice.identity(),
            vec![delegate.identity()],
        )]));
        let verified = verifier
            .verify_request(&alice.identity(), b"payload", &sig, &proof, &lookup)
            .unwrap();
        assert_eq!(verified.authority, ProofAuthority::Delegate(delegate.identity()));
        let authority = RequestAuthority::from(verified);
        assert_eq!(authority.vouched_by, delegate.identity());
        assert!(authority.is_delegated(&verified.identity));
    }

    #[test]
    fn empty_proof_is_rejected() {
        let alice = ContextSigner::from_seed("alice");
        let sig = alice.sign(b"payload").unwrap();
        assert_matches!(
            SignatureVerifier::new().verify_request(
                &alice.identity(),
                b"payload",
                &sig,
                &[],
                &NoDelegates
            ),
            Err(SignatureError::Empty)
        );
    }
}
