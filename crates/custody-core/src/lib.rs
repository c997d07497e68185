//! # Custody Core - Foundation types
//!
//! **Purpose**: Shared vocabulary for the delegated-authorization custody ledger.
//!
//! - [`Identity`], [`Amount`] and [`Nonce`]
//! - the [`CustodyError`] taxonomy
//! - byte-exact packed encoding of signed request payloads
//! - typed ledger events and receipts
//! - ledger configuration
//!
//! This crate performs no cryptography and holds no state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Ledger configuration
pub mod config;

/// Packed payload encoding
pub mod encoding;

/// Unified error types
pub mod errors;

/// Ledger events and receipts
pub mod events;

/// Identities, amounts and nonces
pub mod identity;

pub use config::{EventConfig, LedgerConfig, StakingConfig, MAX_PAGE_SIZE};
pub use encoding::{
    collaborator_payload, ownership_proof_message, OperationKind, PackedEncoder,
    SignedOperation, COLLABORATOR_TAG, DELEGATE_ADD_TAG, DELEGATE_REMOVE_TAG,
};
pub use errors::{CustodyError, CustodyResult};
pub use events::{LedgerEvent, Receipt, RequestAuthority};
pub use identity::{Amount, Identity, Nonce, IDENTITY_LEN};
