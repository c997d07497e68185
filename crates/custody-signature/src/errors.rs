//! Signature verification errors

use custody_core::{CustodyError, Identity};

/// Reasons a signature or proof fails to verify
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// No signature bytes supplied
    #[error("signature is empty")]
    Empty,

    /// Signature is not 65 bytes
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    /// `v` byte is not 0, 1, 27 or 28
    #[error("invalid recovery byte {0}")]
    InvalidRecoveryId(u8),

    /// `s` lies in the upper half of the curve order
    #[error("non-canonical signature (high s)")]
    HighS,

    /// `r`/`s` are not valid scalars
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// Public key recovery failed
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Signature recovered to someone else
    #[error("signed by {actual}, expected {expected}")]
    SignerMismatch {
        /// Identity the caller expected
        expected: Identity,
        /// Identity the signature recovered to
        actual: Identity,
    },

    /// Proof signer is neither the identity nor one of its delegates
    #[error("proof signer {signer} is not authorized for {identity}")]
    UnauthorizedProofSigner {
        /// Identity being acted for
        identity: Identity,
        /// Identity the proof recovered to
        signer: Identity,
    },

    /// Collaborator domain is empty or contains the digest separator
    #[error("invalid collaborator domain {domain:?}")]
    InvalidDomain {
        /// Rejected domain name
        domain: String,
    },

    /// No trusted signer vouched for the data
    #[error("no trusted signer produced the proof")]
    UntrustedProof,
}

impl From<SignatureError> for CustodyError {
    fn from(err: SignatureError) -> Self {
        CustodyError::invalid_signature(err.to_string())
    }
}

/// Result type for signature operations
pub type SignatureResult<T> = std::result::Result<T, SignatureError>;
