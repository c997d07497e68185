//! Identity-keyed ledger storage
//!
//! Everything an identity owns (balance, nonces, purpose locks, delegates)
//! lives in one [`AccountRecord`]. Requests stage a copy of the record, mutate
//! the copy and write it back in a single [`LedgerStore::put_account`], so a
//! failed request never leaves a partial write behind.

use custody_core::{Amount, Identity, Nonce};
use custody_signature::DelegateLookup;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All ledger state owned by one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Owning identity
    pub identity: Identity,
    /// Deposited balance not committed to a purpose lock
    pub deposited: Amount,
    /// Next nonce a signed ledger request must carry
    pub nonce: Nonce,
    /// Next nonce per collaborator domain, kept apart from ledger requests
    #[serde(default)]
    pub collaborator_nonces: IndexMap<String, Nonce>,
    /// Live purpose locks in insertion order; never holds a zero amount
    pub locks: IndexMap<String, Amount>,
    /// Signers allowed to produce ownership proofs for this identity
    pub delegates: IndexSet<Identity>,
}

impl AccountRecord {
    /// Empty record for an identity that has never been seen
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            deposited: 0,
            nonce: 0,
            collaborator_nonces: IndexMap::new(),
            locks: IndexMap::new(),
            delegates: IndexSet::new(),
        }
    }

    /// Whether the record holds nothing worth persisting
    pub fn is_empty(&self) -> bool {
        self.deposited == 0
            && self.nonce == 0
            && self.collaborator_nonces.is_empty()
            && self.locks.is_empty()
            && self.delegates.is_empty()
    }
}

impl DelegateLookup for AccountRecord {
    fn delegates_of(&self, identity: &Identity) -> Vec<Identity> {
        if *identity != self.identity {
            return Vec::new();
        }
        self.delegates.iter().copied().collect()
    }
}

/// Backing store for account records
///
/// Writes are infallible: the engine only writes after every check and every
/// external token movement has succeeded.
pub trait LedgerStore: Send {
    /// Record for `identity`, if one was ever written
    fn account(&self, identity: &Identity) -> Option<AccountRecord>;

    /// Replace the record for `record.identity`
    fn put_account(&mut self, record: AccountRecord);

    /// All stored records
    fn accounts(&self) -> Vec<AccountRecord>;

    /// Drop every record and load `records` instead
    fn replace_all(&mut self, records: Vec<AccountRecord>);
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryLedgerStore {
    accounts: HashMap<Identity, AccountRecord>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no record is stored
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn account(&self, identity: &Identity) -> Option<AccountRecord> {
        self.accounts.get(identity).cloned()
    }

    fn put_account(&mut self, record: AccountRecord) {
        self.accounts.insert(record.identity, record);
    }

    fn accounts(&self) -> Vec<AccountRecord> {
        let mut records: Vec<_> = self.accounts.values().cloned().collect();
        records.sort_by_key(|r| r.identity);
        records
    }

    fn replace_all(&mut self, records: Vec<AccountRecord>) {
        self.accounts = records.into_iter().map(|r| (r.identity, r)).collect();
    }
}
