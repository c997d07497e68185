//! Typed request parameters
//!
//! A relayer submits one of these together with a [`RequestAuth`]. Each
//! request maps onto the [`SignedOperation`] whose packed payload the identity
//! signed.

use custody_core::{Amount, Identity, Nonce, SignedOperation};
use serde::{Deserialize, Serialize};

/// Signatures and nonce accompanying a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAuth {
    /// Nonce the payload was signed with
    pub nonce: Nonce,
    /// Signature over the packed payload
    pub signature: Vec<u8>,
    /// Ownership proof binding the payload signer to the identity
    pub proof: Vec<u8>,
}

impl RequestAuth {
    /// Bundle a nonce with its signatures
    pub fn new(nonce: Nonce, signature: Vec<u8>, proof: Vec<u8>) -> Self {
        Self {
            nonce,
            signature,
            proof,
        }
    }
}

/// Lock funds under a purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRequest {
    /// Identity owning the lock
    pub identity: Identity,
    /// Purpose label, non-empty
    pub purpose: String,
    /// Amount to lock, non-zero
    pub amount: Amount,
    /// Take the amount from the idle balance instead of the caller
    pub from_balance: bool,
}

/// Release a purpose lock into the balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRequest {
    /// Identity owning the lock
    pub identity: Identity,
    /// Purpose label
    pub purpose: String,
}

/// Release a purpose lock straight to a recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockAndWithdrawRequest {
    /// Identity owning the lock
    pub identity: Identity,
    /// Purpose label
    pub purpose: String,
    /// Receiver of the released tokens
    pub recipient: Identity,
}

/// Withdraw from the deposited balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// Debited identity
    pub identity: Identity,
    /// Receiver of the tokens
    pub recipient: Identity,
    /// Amount to withdraw, non-zero
    pub amount: Amount,
}

/// Register or revoke a delegated signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRequest {
    /// Identity granting or revoking the delegation
    pub identity: Identity,
    /// Delegated signer
    pub delegate: Identity,
}

impl From<&LockRequest> for SignedOperation {
    fn from(request: &LockRequest) -> Self {
        SignedOperation::Lock {
            identity: request.identity,
            purpose: request.purpose.clone(),
            amount: request.amount,
            from_balance: request.from_balance,
        }
    }
}

impl From<&UnlockRequest> for SignedOperation {
    fn from(request: &UnlockRequest) -> Self {
        SignedOperation::Unlock {
            identity: request.identity,
            purpose: request.purpose.clone(),
        }
    }
}

impl From<&UnlockAndWithdrawRequest> for SignedOperation {
    fn from(request: &UnlockAndWithdrawRequest) -> Self {
        SignedOperation::UnlockAndWithdraw {
            identity: request.identity,
            purpose: request.purpose.clone(),
            recipient: request.recipient,
        }
    }
}

impl From<&WithdrawRequest> for SignedOperation {
    fn from(request: &WithdrawRequest) -> Self {
        SignedOperation::Withdraw {
            identity: request.identity,
            recipient: request.recipient,
            amount: request.amount,
        }
    }
}

impl DelegateRequest {
    /// Operation signed to register the delegate
    pub fn add_operation(&self) -> SignedOperation {
        SignedOperation::AddDelegate {
            identity: self.identity,
            delegate: self.delegate,
        }
    }

    /// Operation signed to revoke the delegate
    pub fn remove_operation(&self) -> SignedOperation {
        SignedOperation::RemoveDelegate {
            identity: self.identity,
            delegate: self.delegate,
        }
    }
}
