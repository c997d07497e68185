//! Deposited balances
//!
//! Pure balance arithmetic over a staged [`AccountRecord`]. The stake an
//! identity must keep is supplied by the caller on every call and never
//! stored, so the excess always reflects the current stake policy.

use crate::store::AccountRecord;
use custody_core::{Amount, CustodyError, CustodyResult};

/// Balance operations
#[derive(Debug, Default, Clone, Copy)]
pub struct CustodyLedger;

impl CustodyLedger {
    /// Deposited balance
    pub fn balance(account: &AccountRecord) -> Amount {
        account.deposited
    }

    /// Deposited funds not committed to the required stake
    pub fn excess(account: &AccountRecord, required_stake: Amount) -> Amount {
        account.deposited.saturating_sub(required_stake)
    }

    /// Credit `amount` to the balance
    pub fn credit(account: &mut AccountRecord, amount: Amount) -> CustodyResult<Amount> {
        if amount == 0 {
            return Err(CustodyError::invalid_amount("amount must be greater than 0"));
        }
        account.deposited = account
            .deposited
            .checked_add(amount)
            .ok_or_else(|| CustodyError::invalid_amount("balance overflow"))?;
        Ok(account.deposited)
    }

    /// Debit `amount`, which may not exceed the excess over `required_stake`
    pub fn debit_excess(
        account: &mut AccountRecord,
        amount: Amount,
        required_stake: Amount,
    ) -> CustodyResult<Amount> {
        if amount == 0 {
            return Err(CustodyError::invalid_amount("amount must be greater than 0"));
        }
        let available = Self::excess(account, required_stake);
        if amount > available {
            return Err(CustodyError::insufficient_balance(available, amount));
        }
        account.deposited -= amount;
        Ok(account.deposited)
    }
}
