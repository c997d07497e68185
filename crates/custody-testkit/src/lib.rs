//! Custody testing infrastructure
//!
//! Shared fixtures for custody integration tests: deterministic wallets,
//! signed-request factories, a ready-made in-memory ledger and proptest
//! strategies.
//!
//! Add this to a crate's dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! custody-testkit = { path = "../custody-testkit" }
//! ```
//!
//! Then in tests:
//! ```rust,no_run
//! use custody_testkit::*;
//!
//! let ledger = TestLedger::new();
//! let alice = TestWallet::new("alice");
//! ledger.fund(&alice.identity(), 1_000);
//! ledger.lock(&alice, "storage", 300, true).unwrap();
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod factories;
pub mod fixtures;
pub mod logging;
pub mod strategies;
pub mod wallets;

pub use factories::*;
pub use fixtures::*;
pub use logging::init_tracing;
pub use wallets::*;

pub use custody_core::{Amount, CustodyError, Identity, LedgerConfig, Nonce, SignedOperation};
pub use custody_ledger::{MemoryCustodyEngine, RequestAuth};
