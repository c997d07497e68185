//! # Custody Signature - Request authentication
//!
//! **Purpose**: Pure cryptographic verification for delegated requests.
//!
//! - keccak-256 digests and recoverable secp256k1 signatures
//! - request signature + ownership proof verification, with delegates
//! - domain-separated collaborator payloads
//! - globally trusted signers for off-ledger data
//! - a signing helper for relayer clients
//!
//! No ledger state lives here; delegate sets are supplied through
//! [`DelegateLookup`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Collaborator request payloads
pub mod domain;

/// keccak-256 and recoverable signatures
pub mod ecdsa;

/// Signature error types
pub mod errors;

/// Signing helper
pub mod signer;

/// Trusted signer registry
pub mod trusted;

/// Request and proof verification
pub mod verifier;

pub use domain::{collaborator_digest, collaborator_payload, validate_domain};
pub use ecdsa::{
    identity_from_verifying_key, keccak256, recover_signer, RecoverableSignature, SIGNATURE_LEN,
};
pub use errors::{SignatureError, SignatureResult};
pub use signer::ContextSigner;
pub use trusted::TrustedSignerRegistry;
pub use verifier::{
    DelegateLookup, NoDelegates, ProofAuthority, SignatureVerifier, VerifiedRequest,
};
