//! Packed payload encoding
//!
//! Signed payloads are the tight concatenation of their fields in declared
//! order: addresses as 20 raw bytes, unsigned integers as 32-byte big-endian
//! words, booleans as a single byte and strings as raw UTF-8. There are no
//! separators or length prefixes, so the field order is part of the format.
//!
//! The nonce is always the last field and is appended by
//! [`SignedOperation::payload`] rather than carried by the operation itself.
//!
//! Payloads of different operations must never coincide. Purpose-carrying
//! payloads have valid UTF-8 right after the identity, so the operations this
//! ledger adds put a tag byte there that can never start a UTF-8 sequence:
//!
//! | byte 20 | payload |
//! |---|---|
//! | `0xFF` | [`SignedOperation::AddDelegate`], 73 bytes |
//! | `0xFE` | [`SignedOperation::RemoveDelegate`], 73 bytes |
//! | `0xFD` | [`collaborator_payload`], 85 bytes |
//!
//! [`SignedOperation::Withdraw`] has an arbitrary byte 20 but is always
//! 104 bytes long.

use crate::identity::{Amount, Identity, Nonce};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of an encoded unsigned integer.
pub const UINT_WIDTH: usize = 32;

/// Tag following the identity in a delegate registration.
pub const DELEGATE_ADD_TAG: u8 = 0xFF;
/// Tag following the identity in a delegate revocation.
pub const DELEGATE_REMOVE_TAG: u8 = 0xFE;
/// Tag following the identity in a collaborator payload.
pub const COLLABORATOR_TAG: u8 = 0xFD;

/// Builder for packed payloads
#[derive(Debug, Default, Clone)]
pub struct PackedEncoder {
    buf: Vec<u8>,
}

impl PackedEncoder {
    /// Create an empty encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an address
    pub fn address(mut self, identity: &Identity) -> Self {
        self.buf.extend_from_slice(identity.as_bytes());
        self
    }

    /// Append a string as raw UTF-8
    pub fn string(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Append an unsigned integer as a 32-byte big-endian word
    pub fn uint(mut self, value: u128) -> Self {
        let mut word = [0u8; UINT_WIDTH];
        word[UINT_WIDTH - 16..].copy_from_slice(&value.to_be_bytes());
        self.buf.extend_from_slice(&word);
        self
    }

    /// Append a boolean as one byte
    pub fn boolean(mut self, value: bool) -> Self {
        self.buf.push(u8::from(value));
        self
    }

    /// Append raw bytes
    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Finish and return the encoded payload
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Kind of state-changing operation an identity can authorize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Lock funds under a purpose
    Lock,
    /// Release a purpose lock back into the balance
    Unlock,
    /// Release a purpose lock directly to a recipient
    UnlockAndWithdraw,
    /// Withdraw from the deposited balance
    Withdraw,
    /// Register a delegated signer
    AddDelegate,
    /// Revoke a delegated signer
    RemoveDelegate,
    /// Opaque payload authorized on behalf of a collaborator
    External,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Lock => "lock",
            OperationKind::Unlock => "unlock",
            OperationKind::UnlockAndWithdraw => "unlock_and_withdraw",
            OperationKind::Withdraw => "withdraw",
            OperationKind::AddDelegate => "add_delegate",
            OperationKind::RemoveDelegate => "remove_delegate",
            OperationKind::External => "external",
        };
        f.write_str(name)
    }
}

/// Typed parameters of a signed request, without the nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedOperation {
    /// `identity ∥ purpose ∥ amount ∥ with_deposit`, where `with_deposit` is
    /// `!from_balance`
    Lock {
        /// Identity whose funds are locked
        identity: Identity,
        /// Purpose label
        purpose: String,
        /// Amount to lock
        amount: Amount,
        /// Fund the lock from the idle deposited balance
        from_balance: bool,
    },
    /// `identity ∥ purpose`
    Unlock {
        /// Identity owning the lock
        identity: Identity,
        /// Purpose label
        purpose: String,
    },
    /// `identity ∥ purpose ∥ recipient`
    UnlockAndWithdraw {
        /// Identity owning the lock
        identity: Identity,
        /// Purpose label
        purpose: String,
        /// Receiver of the released tokens
        recipient: Identity,
    },
    /// `identity ∥ recipient ∥ amount`
    Withdraw {
        /// Identity whose balance is debited
        identity: Identity,
        /// Receiver of the tokens
        recipient: Identity,
        /// Amount to withdraw
        amount: Amount,
    },
    /// `identity ∥ 0xFF ∥ delegate`
    AddDelegate {
        /// Identity granting the delegation
        identity: Identity,
        /// Signer allowed to produce ownership proofs
        delegate: Identity,
    },
    /// `identity ∥ 0xFE ∥ delegate`
    RemoveDelegate {
        /// Identity revoking the delegation
        identity: Identity,
        /// Signer losing the delegation
        delegate: Identity,
    },
}

impl SignedOperation {
    /// Identity that must have authorized the operation
    pub fn identity(&self) -> &Identity {
        match self {
            SignedOperation::Lock { identity, .. }
            | SignedOperation::Unlock { identity, .. }
            | SignedOperation::UnlockAndWithdraw { identity, .. }
            | SignedOperation::Withdraw { identity, .. }
            | SignedOperation::AddDelegate { identity, .. }
            | SignedOperation::RemoveDelegate { identity, .. } => identity,
        }
    }

    /// Operation kind
    pub fn kind(&self) -> OperationKind {
        match self {
            SignedOperation::Lock { .. } => OperationKind::Lock,
            SignedOperation::Unlock { .. } => OperationKind::Unlock,
            SignedOperation::UnlockAndWithdraw { .. } => OperationKind::UnlockAndWithdraw,
            SignedOperation::Withdraw { .. } => OperationKind::Withdraw,
            SignedOperation::AddDelegate { .. } => OperationKind::AddDelegate,
            SignedOperation::RemoveDelegate { .. } => OperationKind::RemoveDelegate,
        }
    }

    /// Packed parameters, excluding the nonce
    pub fn params(&self) -> Vec<u8> {
        match self {
            SignedOperation::Lock {
                identity,
                purpose,
                amount,
                from_balance,
            } => PackedEncoder::new()
                .address(identity)
                .string(purpose)
                .uint(*amount)
                .boolean(!*from_balance)
                .finish(),
            SignedOperation::Unlock { identity, purpose } => PackedEncoder::new()
                .address(identity)
                .string(purpose)
                .finish(),
            SignedOperation::UnlockAndWithdraw {
                identity,
                purpose,
                recipient,
            } => PackedEncoder::new()
                .address(identity)
                .string(purpose)
                .address(recipient)
                .finish(),
            SignedOperation::Withdraw {
                identity,
                recipient,
                amount,
            } => PackedEncoder::new()
                .address(identity)
                .address(recipient)
                .uint(*amount)
                .finish(),
            SignedOperation::AddDelegate { identity, delegate } => PackedEncoder::new()
                .address(identity)
                .bytes(&[DELEGATE_ADD_TAG])
                .address(delegate)
                .finish(),
            SignedOperation::RemoveDelegate { identity, delegate } => PackedEncoder::new()
                .address(identity)
                .bytes(&[DELEGATE_REMOVE_TAG])
                .address(delegate)
                .finish(),
        }
    }

    /// Full signed payload: parameters followed by the nonce
    pub fn payload(&self, nonce: Nonce) -> Vec<u8> {
        with_nonce(&self.params(), nonce)
    }
}

fn with_nonce(params: &[u8], nonce: Nonce) -> Vec<u8> {
    PackedEncoder::new()
        .bytes(params)
        .uint(u128::from(nonce))
        .finish()
}

/// Payload a collaborator request signs: `identity ∥ 0xFD ∥ digest ∥ nonce`.
///
/// `digest` commits to the collaborator's domain and parameters; see
/// `custody_signature::collaborator_digest`.
pub fn collaborator_payload(identity: &Identity, digest: &[u8; 32], nonce: Nonce) -> Vec<u8> {
    PackedEncoder::new()
        .address(identity)
        .bytes(&[COLLABORATOR_TAG])
        .bytes(digest)
        .uint(u128::from(nonce))
        .finish()
}

/// Message an ownership proof signs: `"{owner}{signer}"`, lowercased.
pub fn ownership_proof_message(owner: &Identity, signer: &Identity) -> Vec<u8> {
    format!(
        "{}{}",
        owner.to_canonical_string(),
        signer.to_canonical_string()
    )
    .to_lowercase()
    .into_bytes()
}
