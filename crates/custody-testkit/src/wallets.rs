//! Deterministic test wallets
//!
//! A wallet owns an identity key and optionally signs requests with a separate
//! context key, vouched for by the identity key through an ownership proof.

use custody_core::{Identity, Nonce, SignedOperation};
use custody_ledger::RequestAuth;
use custody_signature::ContextSigner;

/// Identity with a deterministic key pair
#[derive(Debug)]
pub struct TestWallet {
    name: String,
    owner: ContextSigner,
    context: Option<ContextSigner>,
}

impl TestWallet {
    /// Wallet whose identity key signs its own requests
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: ContextSigner::from_seed(name),
            context: None,
        }
    }

    /// Wallet that signs requests with a context key distinct from the
    /// identity key
    pub fn with_context_key(name: &str, context: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: ContextSigner::from_seed(name),
            context: Some(ContextSigner::from_seed(&format!("{name}/{context}"))),
        }
    }

    /// Seed name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wallet's identity
    pub fn identity(&self) -> Identity {
        self.owner.identity()
    }

    /// Identity key
    pub fn owner(&self) -> &ContextSigner {
        &self.owner
    }

    /// Key that signs request payloads
    pub fn request_signer(&self) -> &ContextSigner {
        self.context.as_ref().unwrap_or(&self.owner)
    }

    /// Ownership proof for the request signer
    pub fn proof(&self) -> Vec<u8> {
        self.owner
            .proof_for(&self.request_signer().identity())
            .unwrap()
    }

    /// Sign `operation` at `nonce`
    pub fn sign(&self, operation: &SignedOperation, nonce: Nonce) -> RequestAuth {
        RequestAuth::new(
            nonce,
            self.request_signer().sign_operation(operation, nonce).unwrap(),
            self.proof(),
        )
    }

    /// Signature and proof over collaborator `params` for `domain` at `nonce`
    pub fn sign_collaborator(
        &self,
        domain: &str,
        params: &[u8],
        nonce: Nonce,
    ) -> (Vec<u8>, Vec<u8>) {
        let signature = self
            .request_signer()
            .sign_collaborator(&self.identity(), domain, params, nonce)
            .unwrap();
        (signature, self.proof())
    }
}

/// Request signed by `context` and vouched for by `delegate` rather than by
/// the identity in `operation`
pub fn delegated_auth(
    delegate: &ContextSigner,
    context: &ContextSigner,
    operation: &SignedOperation,
    nonce: Nonce,
) -> RequestAuth {
    RequestAuth::new(
        nonce,
        context.sign_operation(operation, nonce).unwrap(),
        delegate.proof_for(&context.identity()).unwrap(),
    )
}
