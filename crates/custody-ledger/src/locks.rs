//! Purpose-scoped locks
//!
//! Each identity partitions locked funds into buckets named by a purpose
//! label. A bucket exists only while it holds a non-zero amount: releasing it
//! removes the entry, so absence and zero are the same state.
//!
//! Querying an absent lock yields zero. Releasing an absent lock is an error.

use crate::store::AccountRecord;
use custody_core::{Amount, CustodyError, CustodyResult};
use serde::{Deserialize, Serialize};

/// One live lock, as returned by listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    /// Purpose label
    pub purpose: String,
    /// Locked amount
    pub amount: Amount,
}

/// Lock operations over a staged account record
#[derive(Debug, Default, Clone, Copy)]
pub struct PurposeLockTable;

impl PurposeLockTable {
    /// Reject empty purposes and zero amounts
    pub fn validate(purpose: &str, amount: Amount) -> CustodyResult<()> {
        if purpose.is_empty() {
            return Err(CustodyError::invalid_purpose(purpose));
        }
        if amount == 0 {
            return Err(CustodyError::invalid_amount("amount must be greater than 0"));
        }
        Ok(())
    }

    /// Add `amount` to the lock for `purpose`; returns the new total
    pub fn lock(account: &mut AccountRecord, purpose: &str, amount: Amount) -> CustodyResult<Amount> {
        Self::validate(purpose, amount)?;
        let current = Self::locked(account, purpose);
        let total = current
            .checked_add(amount)
            .ok_or_else(|| CustodyError::invalid_amount("locked amount overflow"))?;
        account.locks.insert(purpose.to_string(), total);
        Ok(total)
    }

    /// Remove the lock for `purpose`; returns the released amount
    pub fn release(account: &mut AccountRecord, purpose: &str) -> CustodyResult<Amount> {
        // shift_remove keeps the remaining purposes in insertion order
        account
            .locks
            .shift_remove(purpose)
            .ok_or_else(|| CustodyError::invalid_purpose(purpose))
    }

    /// Locked amount for `purpose`, zero when absent
    pub fn locked(account: &AccountRecord, purpose: &str) -> Amount {
        account.locks.get(purpose).copied().unwrap_or(0)
    }

    /// Sum of all live locks
    pub fn total_locked(account: &AccountRecord) -> Amount {
        account
            .locks
            .values()
            .fold(0, |acc: Amount, amount| acc.saturating_add(*amount))
    }

    /// Check page bounds: `page_size` in `1..=max_page_size`, `page_number >= 1`
    pub fn validate_page(
        page_size: usize,
        page_number: usize,
        max_page_size: usize,
    ) -> CustodyResult<()> {
        if page_size == 0 || page_size > max_page_size {
            return Err(CustodyError::InvalidPageSize { size: page_size });
        }
        if page_number == 0 {
            return Err(CustodyError::InvalidPageNumber { page: page_number });
        }
        Ok(())
    }

    /// One page of live locks in insertion order. Pages past the end are empty.
    pub fn page(account: &AccountRecord, page_size: usize, page_number: usize) -> Vec<LockEntry> {
        let Some(start) = (page_number - 1).checked_mul(page_size) else {
            return Vec::new();
        };
        account
            .locks
            .iter()
            .skip(start)
            .take(page_size)
            .map(|(purpose, amount)| LockEntry {
                purpose: purpose.clone(),
                amount: *amount,
            })
            .collect()
    }
}
