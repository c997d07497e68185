//! Request Authorization Engine
//!
//! Every state-changing request runs as one atomic unit under a single ledger
//! mutex:
//!
//! 1. stage a copy of the identity's [`AccountRecord`]
//! 2. verify the request signature and ownership proof over the packed payload
//! 3. consume the nonce on the staged copy (the ledger counter, or the
//!    collaborator domain's counter for [`CustodyEngine::authorize`])
//! 4. apply the balance/lock mutation to the staged copy
//! 5. move tokens through the [`TokenCustody`] collaborator
//! 6. write the staged copy back and publish a [`Receipt`]
//!
//! Steps 1-5 may fail; step 6 cannot. A failure anywhere leaves the store
//! untouched, including the nonce, so a rejected request can be corrected and
//! resubmitted with the same nonce.

use crate::custody::CustodyLedger;
use crate::locks::{LockEntry, PurposeLockTable};
use crate::nonce::{NonceScope, NonceTracker};
use crate::requests::{
    DelegateRequest, LockRequest, RequestAuth, UnlockAndWithdrawRequest, UnlockRequest,
    WithdrawRequest,
};
use crate::snapshot::LedgerSnapshot;
use crate::stake::StakeRequirement;
use crate::store::{AccountRecord, LedgerStore};
use crate::token::TokenCustody;
use custody_core::{
    Amount, CustodyError, CustodyResult, Identity, LedgerConfig, LedgerEvent, Nonce,
    OperationKind, Receipt, RequestAuthority, SignedOperation, MAX_PAGE_SIZE,
};
use custody_signature::{collaborator_payload, SignatureVerifier, TrustedSignerRegistry};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Token movement performed once a staged mutation has been checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    In { from: Identity, amount: Amount },
    Out { to: Identity, amount: Amount },
}

impl Transfer {
    fn execute<T: TokenCustody>(self, token: &mut T) -> CustodyResult<()> {
        match self {
            Transfer::In { from, amount } => token.transfer_in(&from, amount),
            Transfer::Out { to, amount } => token.transfer_out(&to, amount),
        }
    }
}

struct LedgerState<S, T> {
    store: S,
    token: T,
}

/// Validates signed requests and applies them to the custody ledger
pub struct CustodyEngine<S, T, P> {
    state: Mutex<LedgerState<S, T>>,
    stake: Arc<P>,
    trusted: TrustedSignerRegistry,
    verifier: SignatureVerifier,
    receipts: broadcast::Sender<Receipt>,
    config: LedgerConfig,
}

impl<S, T, P> CustodyEngine<S, T, P>
where
    S: LedgerStore,
    T: TokenCustody,
    P: StakeRequirement,
{
    /// Build an engine over injected collaborators
    pub fn new(store: S, token: T, stake: Arc<P>, config: LedgerConfig) -> CustodyResult<Self> {
        config.validate()?;
        let (receipts, _) = broadcast::channel(config.events.channel_capacity);
        Ok(Self {
            state: Mutex::new(LedgerState { store, token }),
            stake,
            trusted: TrustedSignerRegistry::new(),
            verifier: SignatureVerifier::new(),
            receipts,
            config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Stake policy collaborator
    pub fn stake_policy(&self) -> &Arc<P> {
        &self.stake
    }

    /// Receive every future receipt
    pub fn subscribe(&self) -> broadcast::Receiver<Receipt> {
        self.receipts.subscribe()
    }

    // ------------------------------------------------------------------
    // Signed operations
    // ------------------------------------------------------------------

    /// Authorize an opaque collaborator payload for `identity`.
    ///
    /// `params` are the collaborator's packed parameters. The identity signs
    /// [`collaborator_payload`] over `domain` and `params`, and `nonce` is
    /// drawn from the domain's own counter, so collaborator requests neither
    /// consume ledger nonces nor verify as ledger operations. Succeeds at most
    /// once per domain nonce.
    #[tracing::instrument(skip_all, fields(%domain, %identity, nonce = nonce))]
    pub fn authorize(
        &self,
        domain: &str,
        identity: &Identity,
        params: &[u8],
        signature: &[u8],
        proof: &[u8],
        nonce: Nonce,
    ) -> CustodyResult<Receipt> {
        let auth = RequestAuth::new(nonce, signature.to_vec(), proof.to_vec());
        let result = collaborator_payload(identity, domain, params, nonce)
            .map_err(CustodyError::from)
            .and_then(|payload| {
                let scope = NonceScope::Collaborator(domain);
                self.execute_in(scope, *identity, &payload, &auth, |_, _| {
                    let event = LedgerEvent::Authorized {
                        identity: *identity,
                        domain: domain.to_string(),
                    };
                    Ok((event, None))
                })
            });
        self.finish(OperationKind::External, identity, result)
    }

    /// Lock funds under a purpose.
    ///
    /// With `from_balance` the amount comes out of the identity's excess;
    /// otherwise it is pulled from `caller` into custody in the same unit.
    #[tracing::instrument(
        skip_all,
        fields(identity = %request.identity, purpose = %request.purpose, amount = request.amount, from_balance = request.from_balance)
    )]
    pub fn lock(
        &self,
        caller: &Identity,
        request: &LockRequest,
        auth: &RequestAuth,
    ) -> CustodyResult<Receipt> {
        let result =
            PurposeLockTable::validate(&request.purpose, request.amount).and_then(|()| {
                let payload = SignedOperation::from(request).payload(auth.nonce);
                self.execute_signed(request.identity, &payload, auth, |record, required_stake| {
                    let transfer = if request.from_balance {
                        CustodyLedger::debit_excess(record, request.amount, required_stake)?;
                        None
                    } else {
                        Some(Transfer::In {
                            from: *caller,
                            amount: request.amount,
                        })
                    };
                    let total_locked =
                        PurposeLockTable::lock(record, &request.purpose, request.amount)?;
                    let event = LedgerEvent::Locked {
                        identity: request.identity,
                        purpose: request.purpose.clone(),
                        amount: request.amount,
                        from_balance: request.from_balance,
                        total_locked,
                    };
                    Ok((event, transfer))
                })
            });
        self.finish(OperationKind::Lock, &request.identity, result)
    }

    /// Release a purpose lock back into the deposited balance
    #[tracing::instrument(skip_all, fields(identity = %request.identity, purpose = %request.purpose))]
    pub fn unlock(&self, request: &UnlockRequest, auth: &RequestAuth) -> CustodyResult<Receipt> {
        let payload = SignedOperation::from(request).payload(auth.nonce);
        let result = self.execute_signed(request.identity, &payload, auth, |record, _| {
            let amount = PurposeLockTable::release(record, &request.purpose)?;
            CustodyLedger::credit(record, amount)?;
            let event = LedgerEvent::Unlocked {
                identity: request.identity,
                purpose: request.purpose.clone(),
                amount,
            };
            Ok((event, None))
        });
        self.finish(OperationKind::Unlock, &request.identity, result)
    }

    /// Release a purpose lock straight to a recipient; the deposited balance
    /// is not touched
    #[tracing::instrument(
        skip_all,
        fields(identity = %request.identity, purpose = %request.purpose, recipient = %request.recipient)
    )]
    pub fn unlock_and_withdraw(
        &self,
        request: &UnlockAndWithdrawRequest,
        auth: &RequestAuth,
    ) -> CustodyResult<Receipt> {
        let payload = SignedOperation::from(request).payload(auth.nonce);
        let result = self.execute_signed(request.identity, &payload, auth, |record, _| {
            let amount = PurposeLockTable::release(record, &request.purpose)?;
            let event = LedgerEvent::UnlockedAndWithdrawn {
                identity: request.identity,
                purpose: request.purpose.clone(),
                amount,
                recipient: request.recipient,
            };
            let transfer = Transfer::Out {
                to: request.recipient,
                amount,
            };
            Ok((event, Some(transfer)))
        });
        self.finish(OperationKind::UnlockAndWithdraw, &request.identity, result)
    }

    /// Withdraw from the deposited balance to a recipient
    #[tracing::instrument(
        skip_all,
        fields(identity = %request.identity, recipient = %request.recipient, amount = request.amount)
    )]
    pub fn withdraw(&self, request: &WithdrawRequest, auth: &RequestAuth) -> CustodyResult<Receipt> {
        let result = if request.amount == 0 {
            Err(CustodyError::invalid_amount("amount must be greater than 0"))
        } else {
            let payload = SignedOperation::from(request).payload(auth.nonce);
            self.execute_signed(request.identity, &payload, auth, |record, required_stake| {
                CustodyLedger::debit_excess(record, request.amount, required_stake)?;
                let event = LedgerEvent::Withdrawn {
                    identity: request.identity,
                    recipient: request.recipient,
                    amount: request.amount,
                };
                let transfer = Transfer::Out {
                    to: request.recipient,
                    amount: request.amount,
                };
                Ok((event, Some(transfer)))
            })
        };
        self.finish(OperationKind::Withdraw, &request.identity, result)
    }

    /// Register a signer allowed to make ownership proofs for the identity
    #[tracing::instrument(skip_all, fields(identity = %request.identity, delegate = %request.delegate))]
    pub fn add_delegate(
        &self,
        request: &DelegateRequest,
        auth: &RequestAuth,
    ) -> CustodyResult<Receipt> {
        let payload = request.add_operation().payload(auth.nonce);
        let result = self.execute_signed(request.identity, &payload, auth, |record, _| {
            if !record.delegates.insert(request.delegate) {
                return Err(CustodyError::RegisteredSigner {
                    signer: request.delegate.to_string(),
                });
            }
            let event = LedgerEvent::DelegateAdded {
                identity: request.identity,
                delegate: request.delegate,
            };
            Ok((event, None))
        });
        self.finish(OperationKind::AddDelegate, &request.identity, result)
    }

    /// Revoke a delegated signer
    #[tracing::instrument(skip_all, fields(identity = %request.identity, delegate = %request.delegate))]
    pub fn remove_delegate(
        &self,
        request: &DelegateRequest,
        auth: &RequestAuth,
    ) -> CustodyResult<Receipt> {
        let payload = request.remove_operation().payload(auth.nonce);
        let result = self.execute_signed(request.identity, &payload, auth, |record, _| {
            if !record.delegates.shift_remove(&request.delegate) {
                return Err(CustodyError::UnregisteredSigner {
                    signer: request.delegate.to_string(),
                });
            }
            let event = LedgerEvent::DelegateRemoved {
                identity: request.identity,
                delegate: request.delegate,
            };
            Ok((event, None))
        });
        self.finish(OperationKind::RemoveDelegate, &request.identity, result)
    }

    // ------------------------------------------------------------------
    // Unsigned operations
    // ------------------------------------------------------------------

    /// Credit `identity` with `amount` pulled from `funder`
    #[tracing::instrument(skip_all, fields(%identity, %funder, amount = amount))]
    pub fn deposit(
        &self,
        identity: &Identity,
        funder: &Identity,
        amount: Amount,
    ) -> CustodyResult<Receipt> {
        let result = self.apply_deposit(identity, funder, amount);
        self.finish("deposit", identity, result)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Nonce the next signed ledger request for `identity` must carry
    pub fn nonce(&self, identity: &Identity) -> Nonce {
        self.read(identity, NonceTracker::current)
    }

    /// Nonce the next request `identity` authorizes for `domain` must carry
    pub fn collaborator_nonce(&self, identity: &Identity, domain: &str) -> Nonce {
        self.read(identity, |record| {
            NonceTracker::current_in(record, NonceScope::Collaborator(domain))
        })
    }

    /// Deposited balance; zero for unknown identities
    pub fn balance(&self, identity: &Identity) -> Amount {
        self.read(identity, CustodyLedger::balance)
    }

    /// Deposited balance above the currently required stake
    pub fn excess(&self, identity: &Identity) -> Amount {
        let required_stake = self.stake.required_stake(identity);
        self.read(identity, |record| {
            CustodyLedger::excess(record, required_stake)
        })
    }

    /// Amount locked under `purpose`; zero when absent
    pub fn locked(&self, identity: &Identity, purpose: &str) -> Amount {
        self.read(identity, |record| PurposeLockTable::locked(record, purpose))
    }

    /// Sum of every live lock held by `identity`
    pub fn total_locked(&self, identity: &Identity) -> Amount {
        self.read(identity, PurposeLockTable::total_locked)
    }

    /// One page (1-based) of live locks in insertion order
    pub fn list_locks(
        &self,
        identity: &Identity,
        page_size: usize,
        page_number: usize,
    ) -> CustodyResult<Vec<LockEntry>> {
        PurposeLockTable::validate_page(page_size, page_number, MAX_PAGE_SIZE)?;
        Ok(self.read(identity, |record| {
            PurposeLockTable::page(record, page_size, page_number)
        }))
    }

    /// Delegates registered by `identity`
    pub fn delegates(&self, identity: &Identity) -> Vec<Identity> {
        self.read(identity, |record| record.delegates.iter().copied().collect())
    }

    /// Tokens held by the custody collaborator
    pub fn custody_balance(&self) -> Amount {
        self.state.lock().token.custody_balance()
    }

    // ------------------------------------------------------------------
    // Trusted signers
    // ------------------------------------------------------------------

    /// Register a globally trusted signer
    pub fn add_trusted_signer(&self, signer: Identity) -> CustodyResult<()> {
        self.trusted.add(signer)
    }

    /// Remove a globally trusted signer
    pub fn remove_trusted_signer(&self, signer: &Identity) -> CustodyResult<()> {
        self.trusted.remove(signer)
    }

    /// Globally trusted signers in registration order
    pub fn trusted_signers(&self) -> Vec<Identity> {
        self.trusted.signers()
    }

    /// Verify data vouched for by a trusted signer; returns that signer
    pub fn verify_trusted_data(
        &self,
        data: &[u8],
        signature: &[u8],
        proof: &[u8],
    ) -> CustodyResult<Identity> {
        self.trusted
            .verify_data(data, signature, proof)
            .map_err(|error| {
                tracing::warn!(%error, "trusted data rejected");
                CustodyError::from(error)
            })
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Capture the whole ledger at the current schema version
    pub fn export_snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot::new(state.store.accounts(), self.trusted.signers())
    }

    /// Replace the whole ledger with `snapshot`
    pub fn import_snapshot(&self, snapshot: LedgerSnapshot) -> CustodyResult<()> {
        snapshot.validate()?;
        let mut state = self.state.lock();
        tracing::info!(
            accounts = snapshot.accounts.len(),
            trusted_signers = snapshot.trusted_signers.len(),
            "importing ledger snapshot"
        );
        state.store.replace_all(snapshot.accounts);
        self.trusted.replace_all(snapshot.trusted_signers);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn stage(store: &S, identity: &Identity) -> AccountRecord {
        store
            .account(identity)
            .unwrap_or_else(|| AccountRecord::new(*identity))
    }

    fn apply_deposit(
        &self,
        identity: &Identity,
        funder: &Identity,
        amount: Amount,
    ) -> CustodyResult<Receipt> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut staged = Self::stage(&state.store, identity);
        CustodyLedger::credit(&mut staged, amount)?;
        Transfer::In {
            from: *funder,
            amount,
        }
        .execute(&mut state.token)?;

        let receipt = Receipt {
            event: LedgerEvent::Deposited {
                identity: *identity,
                from: *funder,
                amount,
            },
            balance: staged.deposited,
            nonce: None,
            authority: None,
        };
        state.store.put_account(staged);
        self.publish(&receipt);
        Ok(receipt)
    }

    fn read<R>(&self, identity: &Identity, f: impl FnOnce(&AccountRecord) -> R) -> R {
        let state = self.state.lock();
        f(&Self::stage(&state.store, identity))
    }

    fn execute_signed<F>(
        &self,
        identity: Identity,
        payload: &[u8],
        auth: &RequestAuth,
        apply: F,
    ) -> CustodyResult<Receipt>
    where
        F: FnOnce(&mut AccountRecord, Amount) -> CustodyResult<(LedgerEvent, Option<Transfer>)>,
    {
        self.execute_in(NonceScope::Ledger, identity, payload, auth, apply)
    }

    fn execute_in<F>(
        &self,
        scope: NonceScope<'_>,
        identity: Identity,
        payload: &[u8],
        auth: &RequestAuth,
        apply: F,
    ) -> CustodyResult<Receipt>
    where
        F: FnOnce(&mut AccountRecord, Amount) -> CustodyResult<(LedgerEvent, Option<Transfer>)>,
    {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mut staged = Self::stage(&state.store, &identity);

        let verified = self.verifier.verify_request(
            &identity,
            payload,
            &auth.signature,
            &auth.proof,
            &staged,
        )?;
        let nonce = NonceTracker::consume_in(&mut staged, scope, auth.nonce)?;

        // Recomputed per request; never cached across stake policy changes
        let required_stake = self.stake.required_stake(&identity);
        let (event, transfer) = apply(&mut staged, required_stake)?;
        if let Some(transfer) = transfer {
            transfer.execute(&mut state.token)?;
        }

        let receipt = Receipt {
            event,
            balance: staged.deposited,
            nonce: Some(nonce),
            authority: Some(RequestAuthority::from(verified)),
        };
        state.store.put_account(staged);
        self.publish(&receipt);
        Ok(receipt)
    }

    /// Publish while the ledger lock is held so subscribers see commit order
    fn publish(&self, receipt: &Receipt) {
        if self.receipts.send(receipt.clone()).is_err() {
            tracing::trace!("no receipt subscribers");
        }
    }

    fn finish(
        &self,
        operation: impl fmt::Display,
        identity: &Identity,
        result: CustodyResult<Receipt>,
    ) -> CustodyResult<Receipt> {
        match &result {
            Ok(receipt) => tracing::info!(
                %operation,
                %identity,
                balance = receipt.balance,
                nonce = ?receipt.nonce,
                vouched_by = ?receipt.authority.map(|authority| authority.vouched_by),
                "request committed"
            ),
            Err(error) => tracing::warn!(
                %operation,
                %identity,
                kind = error.kind(),
                %error,
                "request rejected"
            ),
        }
        result
    }
}

impl<S, T, P> fmt::Debug for CustodyEngine<S, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodyEngine")
            .field("config", &self.config)
            .field("trusted", &self.trusted)
            .finish_non_exhaustive()
    }
}
