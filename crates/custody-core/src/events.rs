//! Typed ledger outcomes
//!
//! Each committed mutation produces a [`Receipt`]. Receipts are returned to the
//! caller and published to subscribers so collaborators can react without
//! depending on a particular transport.

use crate::encoding::OperationKind;
use crate::identity::{Amount, Identity, Nonce};
use serde::{Deserialize, Serialize};

/// What happened to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Tokens were deposited for an identity
    Deposited {
        /// Credited identity
        identity: Identity,
        /// Holder the tokens were pulled from
        from: Identity,
        /// Deposited amount
        amount: Amount,
    },
    /// Funds were locked under a purpose
    Locked {
        /// Identity owning the lock
        identity: Identity,
        /// Purpose label
        purpose: String,
        /// Amount added by this request
        amount: Amount,
        /// Whether the idle balance funded the lock
        from_balance: bool,
        /// Total now locked under the purpose
        total_locked: Amount,
    },
    /// A purpose lock was released into the balance
    Unlocked {
        /// Identity owning the lock
        identity: Identity,
        /// Purpose label
        purpose: String,
        /// Released amount
        amount: Amount,
    },
    /// A purpose lock was released straight to a recipient
    UnlockedAndWithdrawn {
        /// Identity owning the lock
        identity: Identity,
        /// Purpose label
        purpose: String,
        /// Released amount
        amount: Amount,
        /// Receiver of the tokens
        recipient: Identity,
    },
    /// Tokens left custody from the deposited balance
    Withdrawn {
        /// Debited identity
        identity: Identity,
        /// Receiver of the tokens
        recipient: Identity,
        /// Withdrawn amount
        amount: Amount,
    },
    /// A delegated signer was registered
    DelegateAdded {
        /// Identity granting the delegation
        identity: Identity,
        /// New delegate
        delegate: Identity,
    },
    /// A delegated signer was revoked
    DelegateRemoved {
        /// Identity revoking the delegation
        identity: Identity,
        /// Revoked delegate
        delegate: Identity,
    },
    /// An opaque collaborator payload was authorized
    Authorized {
        /// Authorizing identity
        identity: Identity,
        /// Collaborator whose request was authorized
        domain: String,
    },
}

impl LedgerEvent {
    /// Identity the event concerns
    pub fn identity(&self) -> &Identity {
        match self {
            LedgerEvent::Deposited { identity, .. }
            | LedgerEvent::Locked { identity, .. }
            | LedgerEvent::Unlocked { identity, .. }
            | LedgerEvent::UnlockedAndWithdrawn { identity, .. }
            | LedgerEvent::Withdrawn { identity, .. }
            | LedgerEvent::DelegateAdded { identity, .. }
            | LedgerEvent::DelegateRemoved { identity, .. }
            | LedgerEvent::Authorized { identity, .. } => identity,
        }
    }

    /// Kind of signed operation that produced the event, if any
    pub fn operation(&self) -> Option<OperationKind> {
        match self {
            LedgerEvent::Deposited { .. } => None,
            LedgerEvent::Locked { .. } => Some(OperationKind::Lock),
            LedgerEvent::Unlocked { .. } => Some(OperationKind::Unlock),
            LedgerEvent::UnlockedAndWithdrawn { .. } => Some(OperationKind::UnlockAndWithdraw),
            LedgerEvent::Withdrawn { .. } => Some(OperationKind::Withdraw),
            LedgerEvent::DelegateAdded { .. } => Some(OperationKind::AddDelegate),
            LedgerEvent::DelegateRemoved { .. } => Some(OperationKind::RemoveDelegate),
            LedgerEvent::Authorized { .. } => Some(OperationKind::External),
        }
    }
}

/// Who authenticated a signed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestAuthority {
    /// Key that signed the request payload
    pub context_signer: Identity,
    /// Signer of the ownership proof: the identity itself or one of its
    /// delegates
    pub vouched_by: Identity,
}

impl RequestAuthority {
    /// Whether a delegate rather than the identity vouched for the request
    pub fn is_delegated(&self, identity: &Identity) -> bool {
        self.vouched_by != *identity
    }
}

/// Result of a committed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// The event
    pub event: LedgerEvent,
    /// Deposited balance of the identity after the mutation
    pub balance: Amount,
    /// Nonce consumed by the request, for signed operations
    pub nonce: Option<Nonce>,
    /// Signers that authenticated the request; `None` for deposits
    pub authority: Option<RequestAuthority>,
}
