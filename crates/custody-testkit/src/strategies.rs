//! Property test strategies for custody types
//!
//! Generated values stay small so sequences exercise both the success and the
//! insufficient-funds paths.

use custody_core::{Amount, Identity};
use proptest::prelude::*;

pub use proptest;

/// Purpose labels drawn from a small pool so locks collide
pub const PURPOSES: &[&str] = &["storage", "bandwidth", "compute", "name", "app"];

/// Strategy for arbitrary identities
pub fn arb_identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 20]>().prop_map(Identity::from_bytes)
}

/// Strategy for one of [`PURPOSES`]
pub fn arb_purpose() -> impl Strategy<Value = String> {
    prop::sample::select(PURPOSES).prop_map(str::to_string)
}

/// Strategy for non-zero amounts up to `max`
pub fn arb_amount(max: Amount) -> impl Strategy<Value = Amount> {
    1..=max
}

/// One step of a ledger workload for a single identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    /// Relayer deposits for the identity
    Deposit(Amount),
    /// Lock under a purpose
    Lock {
        /// Purpose label
        purpose: String,
        /// Amount
        amount: Amount,
        /// Fund from the idle balance
        from_balance: bool,
    },
    /// Release a purpose into the balance
    Unlock(String),
    /// Release a purpose to an external recipient
    UnlockAndWithdraw(String),
    /// Withdraw from the balance
    Withdraw(Amount),
}

/// Strategy for a single [`LedgerOp`]
pub fn arb_ledger_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        arb_amount(500).prop_map(LedgerOp::Deposit),
        (arb_purpose(), arb_amount(400), any::<bool>()).prop_map(|(purpose, amount, from_balance)| {
            LedgerOp::Lock {
                purpose,
                amount,
                from_balance,
            }
        }),
        arb_purpose().prop_map(LedgerOp::Unlock),
        arb_purpose().prop_map(LedgerOp::UnlockAndWithdraw),
        arb_amount(400).prop_map(LedgerOp::Withdraw),
    ]
}

/// Strategy for workloads of up to `max_len` steps
pub fn arb_ledger_ops(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(arb_ledger_op(), 1..=max_len)
}
