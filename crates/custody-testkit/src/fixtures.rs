//! In-memory ledger fixture
//!
//! [`TestLedger`] wires a [`MemoryCustodyEngine`] to a shared
//! [`MemoryTokenVault`] and [`SlotStakePolicy`], and signs every request with
//! the wallet's current nonce.

use crate::factories::*;
use crate::wallets::TestWallet;
use custody_core::{Amount, CustodyResult, Identity, LedgerConfig, Receipt, SignedOperation};
use custody_ledger::{
    MemoryCustodyEngine, MemoryLedgerStore, MemoryTokenVault, RequestAuth, SlotStakePolicy,
};
use custody_signature::ContextSigner;
use std::sync::Arc;

/// Seed of the relayer that funds deposits in fixtures
pub const RELAYER_SEED: &str = "relayer";

/// Engine plus handles on its collaborators
#[derive(Debug)]
pub struct TestLedger {
    /// Engine under test
    pub engine: MemoryCustodyEngine,
    /// Token vault shared with the engine
    pub vault: MemoryTokenVault,
    /// Stake policy shared with the engine
    pub policy: Arc<SlotStakePolicy>,
    /// Relayer submitting requests and funding deposits
    pub relayer: Identity,
}

impl Default for TestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLedger {
    /// Ledger with default configuration
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Ledger with `config`
    pub fn with_config(config: LedgerConfig) -> Self {
        crate::init_tracing();
        let vault = MemoryTokenVault::new();
        let policy = Arc::new(SlotStakePolicy::new(&config.staking));
        let engine = MemoryCustodyEngine::new(
            MemoryLedgerStore::new(),
            vault.clone(),
            policy.clone(),
            config,
        )
        .expect("valid test configuration");
        Self {
            engine,
            vault,
            policy,
            relayer: ContextSigner::from_seed(RELAYER_SEED).identity(),
        }
    }

    /// Mint tokens to the relayer and deposit them for `identity`
    pub fn fund(&self, identity: &Identity, amount: Amount) -> Receipt {
        self.vault.mint(self.relayer, amount).unwrap();
        let receipt = self.engine.deposit(identity, &self.relayer, amount).unwrap();
        tracing::debug!(%identity, amount, "funded test identity");
        receipt
    }

    /// Sign `operation` for `wallet` with its current nonce
    pub fn sign(&self, wallet: &TestWallet, operation: &SignedOperation) -> RequestAuth {
        wallet.sign(operation, self.engine.nonce(&wallet.identity()))
    }

    /// Signed lock submitted by the relayer
    pub fn lock(
        &self,
        wallet: &TestWallet,
        purpose: &str,
        amount: Amount,
        from_balance: bool,
    ) -> CustodyResult<Receipt> {
        let request = lock_request(wallet.identity(), purpose, amount, from_balance);
        let auth = self.sign(wallet, &SignedOperation::from(&request));
        self.engine.lock(&self.relayer, &request, &auth)
    }

    /// Signed unlock
    pub fn unlock(&self, wallet: &TestWallet, purpose: &str) -> CustodyResult<Receipt> {
        let request = unlock_request(wallet.identity(), purpose);
        let auth = self.sign(wallet, &SignedOperation::from(&request));
        self.engine.unlock(&request, &auth)
    }

    /// Signed unlock-and-withdraw
    pub fn unlock_and_withdraw(
        &self,
        wallet: &TestWallet,
        purpose: &str,
        recipient: &Identity,
    ) -> CustodyResult<Receipt> {
        let request = unlock_and_withdraw_request(wallet.identity(), purpose, *recipient);
        let auth = self.sign(wallet, &SignedOperation::from(&request));
        self.engine.unlock_and_withdraw(&request, &auth)
    }

    /// Signed withdrawal
    pub fn withdraw(
        &self,
        wallet: &TestWallet,
        recipient: &Identity,
        amount: Amount,
    ) -> CustodyResult<Receipt> {
        let request = withdraw_request(wallet.identity(), *recipient, amount);
        let auth = self.sign(wallet, &SignedOperation::from(&request));
        self.engine.withdraw(&request, &auth)
    }

    /// Signed delegate registration
    pub fn add_delegate(&self, wallet: &TestWallet, delegate: &Identity) -> CustodyResult<Receipt> {
        let request = delegate_request(wallet.identity(), *delegate);
        let auth = self.sign(wallet, &request.add_operation());
        self.engine.add_delegate(&request, &auth)
    }

    /// Signed delegate revocation
    pub fn remove_delegate(
        &self,
        wallet: &TestWallet,
        delegate: &Identity,
    ) -> CustodyResult<Receipt> {
        let request = delegate_request(wallet.identity(), *delegate);
        let auth = self.sign(wallet, &request.remove_operation());
        self.engine.remove_delegate(&request, &auth)
    }
}
