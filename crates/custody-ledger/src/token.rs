//! Token custody collaborator
//!
//! Moving real tokens in and out of custody is delegated to a
//! [`TokenCustody`] implementation. The engine calls it as the last fallible
//! step of a request, after the staged ledger change has been fully checked.

use custody_core::{Amount, CustodyError, CustodyResult, Identity};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Moves tokens between holders and the custody pool
pub trait TokenCustody: Send {
    /// Pull `amount` from `from` into custody
    fn transfer_in(&mut self, from: &Identity, amount: Amount) -> CustodyResult<()>;

    /// Push `amount` out of custody to `to`
    fn transfer_out(&mut self, to: &Identity, amount: Amount) -> CustodyResult<()>;

    /// Tokens currently held in custody
    fn custody_balance(&self) -> Amount;
}

#[derive(Debug, Default)]
struct VaultState {
    holders: HashMap<Identity, Amount>,
    pool: Amount,
}

/// In-memory token ledger; clones share state
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenVault {
    state: Arc<Mutex<VaultState>>,
}

impl MemoryTokenVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Create tokens for `holder`
    pub fn mint(&self, holder: Identity, amount: Amount) -> CustodyResult<()> {
        let mut state = self.state.lock();
        let balance = state.holders.entry(holder).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CustodyError::token_transfer("mint overflow"))?;
        Ok(())
    }

    /// Tokens held by `holder` outside custody
    pub fn balance_of(&self, holder: &Identity) -> Amount {
        self.state.lock().holders.get(holder).copied().unwrap_or(0)
    }
}

impl TokenCustody for MemoryTokenVault {
    fn transfer_in(&mut self, from: &Identity, amount: Amount) -> CustodyResult<()> {
        let mut state = self.state.lock();
        let held = state.holders.get(from).copied().unwrap_or(0);
        if held < amount {
            return Err(CustodyError::token_transfer(format!(
                "{from} holds {held}, needs {amount}"
            )));
        }
        let pool = state
            .pool
            .checked_add(amount)
            .ok_or_else(|| CustodyError::token_transfer("custody pool overflow"))?;
        state.holders.insert(*from, held - amount);
        state.pool = pool;
        Ok(())
    }

    fn transfer_out(&mut self, to: &Identity, amount: Amount) -> CustodyResult<()> {
        let mut state = self.state.lock();
        if state.pool < amount {
            return Err(CustodyError::token_transfer(format!(
                "custody pool holds {}, needs {amount}",
                state.pool
            )));
        }
        let held = state.holders.get(to).copied().unwrap_or(0);
        let credited = held
            .checked_add(amount)
            .ok_or_else(|| CustodyError::token_transfer("recipient balance overflow"))?;
        state.pool -= amount;
        state.holders.insert(*to, credited);
        Ok(())
    }

    fn custody_balance(&self) -> Amount {
        self.state.lock().pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn transfers_move_between_holder_and_pool() {
        let alice = Identity::from_bytes([1; 20]);
        let bob = Identity::from_bytes([2; 20]);
        let mut vault = MemoryTokenVault::new();
        vault.mint(alice, 100).unwrap();

        vault.transfer_in(&alice, 60).unwrap();
        assert_eq!(vault.balance_of(&alice), 40);
        assert_eq!(vault.custody_balance(), 60);

        vault.transfer_out(&bob, 25).unwrap();
        assert_eq!(vault.balance_of(&bob), 25);
        assert_eq!(vault.custody_balance(), 35);
    }

    #[test]
    fn failed_transfers_change_nothing() {
        let alice = Identity::from_bytes([1; 20]);
        let mut vault = MemoryTokenVault::new();
        vault.mint(alice, 10).unwrap();

        assert_matches!(
            vault.transfer_in(&alice, 11),
            Err(CustodyError::TokenTransfer { .. })
        );
        assert_matches!(
            vault.transfer_out(&alice, 1),
            Err(CustodyError::TokenTransfer { .. })
        );
        assert_eq!(vault.balance_of(&alice), 10);
        assert_eq!(vault.custody_balance(), 0);
    }

    #[test]
    fn clones_share_state() {
        let alice = Identity::from_bytes([1; 20]);
        let vault = MemoryTokenVault::new();
        let handle = vault.clone();
        vault.mint(alice, 5).unwrap();
        assert_eq!(handle.balance_of(&alice), 5);
    }
}
