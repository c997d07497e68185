//! # Custody Ledger - Signed custody operations
//!
//! **Purpose**: Nonce-guarded balances and purpose locks, mutated only by
//! requests an identity signed off-line and a relayer submitted.
//!
//! - [`LedgerStore`]: injected identity-keyed storage
//! - [`NonceTracker`], [`CustodyLedger`], [`PurposeLockTable`]: rules over a
//!   staged [`AccountRecord`]
//! - [`StakeRequirement`] and [`TokenCustody`]: external collaborators
//! - [`CustodyEngine`]: verifies, stages and commits each request atomically
//! - [`LedgerSnapshot`]: versioned export, import and migration
//!
//! ```rust,ignore
//! let engine = CustodyEngine::new(store, vault, policy, LedgerConfig::default())?;
//! engine.deposit(&alice, &relayer, 1_000)?;
//! engine.lock(&relayer, &lock_request, &auth)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Deposited balances
pub mod custody;

/// Request Authorization Engine
pub mod engine;

/// Purpose lock table
pub mod locks;

/// Replay protection
pub mod nonce;

/// Typed request parameters
pub mod requests;

/// Versioned snapshots
pub mod snapshot;

/// Required stake collaborator
pub mod stake;

/// Account storage
pub mod store;

/// Token custody collaborator
pub mod token;

pub use custody::CustodyLedger;
pub use engine::CustodyEngine;
pub use locks::{LockEntry, PurposeLockTable};
pub use nonce::{NonceScope, NonceTracker};
pub use requests::{
    DelegateRequest, LockRequest, RequestAuth, UnlockAndWithdrawRequest, UnlockRequest,
    WithdrawRequest,
};
pub use snapshot::{migrate, LedgerSnapshot, SNAPSHOT_VERSION};
pub use stake::{NoStake, SlotStakePolicy, StakeRequirement};
pub use store::{AccountRecord, LedgerStore, MemoryLedgerStore};
pub use token::{MemoryTokenVault, TokenCustody};

/// Engine over the in-memory collaborators
pub type MemoryCustodyEngine = CustodyEngine<MemoryLedgerStore, MemoryTokenVault, SlotStakePolicy>;
