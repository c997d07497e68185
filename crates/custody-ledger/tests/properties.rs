//! Ledger properties over generated workloads

use custody_core::{Amount, CustodyError};
use custody_testkit::strategies::{arb_amount, arb_ledger_ops, arb_purpose, LedgerOp, PURPOSES};
use custody_testkit::*;
use proptest::prelude::*;
use std::collections::HashMap;

/// Reference model of one identity's funds
#[derive(Debug, Default)]
struct Model {
    balance: Amount,
    locks: HashMap<String, Amount>,
    paid_out: Amount,
    successes: u64,
}

fn apply(
    ledger: &TestLedger,
    wallet: &TestWallet,
    recipient: &Identity,
    model: &mut Model,
    op: &LedgerOp,
) -> Result<(), TestCaseError> {
    let identity = wallet.identity();
    match op {
        LedgerOp::Deposit(amount) => {
            ledger.fund(&identity, *amount);
            model.balance += amount;
        }
        LedgerOp::Lock {
            purpose,
            amount,
            from_balance,
        } => {
            if !from_balance {
                ledger.vault.mint(ledger.relayer, *amount).unwrap();
            }
            let result = ledger.lock(wallet, purpose, *amount, *from_balance);
            if *from_balance && *amount > model.balance {
                let insufficient = matches!(result, Err(CustodyError::InsufficientBalance { .. }));
                prop_assert!(insufficient);
            } else {
                prop_assert!(result.is_ok());
                if *from_balance {
                    model.balance -= amount;
                }
                *model.locks.entry(purpose.clone()).or_insert(0) += amount;
                model.successes += 1;
            }
        }
        LedgerOp::Unlock(purpose) => {
            let result = ledger.unlock(wallet, purpose);
            match model.locks.remove(purpose) {
                Some(amount) => {
                    prop_assert!(result.is_ok());
                    model.balance += amount;
                    model.successes += 1;
                }
                None => {
                    let invalid = matches!(result, Err(CustodyError::InvalidPurpose { .. }));
                    prop_assert!(invalid);
                }
            }
        }
        LedgerOp::UnlockAndWithdraw(purpose) => {
            let result = ledger.unlock_and_withdraw(wallet, purpose, recipient);
            match model.locks.remove(purpose) {
                Some(amount) => {
                    prop_assert!(result.is_ok());
                    model.paid_out += amount;
                    model.successes += 1;
                }
                None => {
                    let invalid = matches!(result, Err(CustodyError::InvalidPurpose { .. }));
                    prop_assert!(invalid);
                }
            }
        }
        LedgerOp::Withdraw(amount) => {
            let result = ledger.withdraw(wallet, recipient, *amount);
            if *amount > model.balance {
                let insufficient = matches!(result, Err(CustodyError::InsufficientBalance { .. }));
                prop_assert!(insufficient);
            } else {
                prop_assert!(result.is_ok());
                model.balance -= amount;
                model.paid_out += amount;
                model.successes += 1;
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ledger_matches_reference_model(ops in arb_ledger_ops(24)) {
        let ledger = TestLedger::new();
        let wallet = TestWallet::new("alice");
        let recipient = TestWallet::new("recipient").identity();
        let identity = wallet.identity();
        let mut model = Model::default();

        for op in &ops {
            apply(&ledger, &wallet, &recipient, &mut model, op)?;

            prop_assert_eq!(ledger.engine.balance(&identity), model.balance);
            prop_assert_eq!(ledger.engine.nonce(&identity), model.successes);
            for purpose in PURPOSES {
                let expected = model.locks.get(*purpose).copied().unwrap_or(0);
                prop_assert_eq!(ledger.engine.locked(&identity, purpose), expected);
            }
            let total_locked: Amount = model.locks.values().sum();
            prop_assert_eq!(ledger.engine.custody_balance(), model.balance + total_locked);
            prop_assert_eq!(ledger.vault.balance_of(&recipient), model.paid_out);

            let listed = ledger.engine.list_locks(&identity, 100, 1).unwrap();
            prop_assert_eq!(listed.len(), model.locks.len());
            prop_assert!(listed.iter().all(|entry| entry.amount > 0));
        }
    }

    #[test]
    fn unlock_then_relock_restores_lock_state(
        purpose in arb_purpose(),
        amount in arb_amount(1_000),
        extra in arb_amount(1_000),
    ) {
        let ledger = TestLedger::new();
        let wallet = TestWallet::new("alice");
        let identity = wallet.identity();
        ledger.fund(&identity, amount + extra);
        ledger.lock(&wallet, &purpose, amount, true).unwrap();
        let before_locks = ledger.engine.list_locks(&identity, 100, 1).unwrap();
        let before_balance = ledger.engine.balance(&identity);

        ledger.unlock(&wallet, &purpose).unwrap();
        ledger.lock(&wallet, &purpose, amount, true).unwrap();

        prop_assert_eq!(ledger.engine.list_locks(&identity, 100, 1).unwrap(), before_locks);
        prop_assert_eq!(ledger.engine.balance(&identity), before_balance);
    }

    #[test]
    fn signed_payload_succeeds_at_most_once(amount in arb_amount(500)) {
        let ledger = TestLedger::new();
        let wallet = TestWallet::new("alice");
        let identity = wallet.identity();
        ledger.fund(&identity, 1_000);

        let request = withdraw_request(identity, identity, amount);
        let auth = ledger.sign(&wallet, &SignedOperation::from(&request));
        prop_assert!(ledger.engine.withdraw(&request, &auth).is_ok());
        for _ in 0..3 {
            let replay = ledger.engine.withdraw(&request, &auth);
            let rejected = matches!(replay, Err(CustodyError::InvalidSignature { .. }));
            prop_assert!(rejected);
        }
        prop_assert_eq!(ledger.engine.balance(&identity), 1_000 - amount);
    }
}
