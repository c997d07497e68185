//! Versioned ledger snapshots
//!
//! The whole ledger can be exported to JSON and imported back. Older schema
//! versions are upgraded by [`migrate`] before import; the running ledger only
//! ever sees the current version.
//!
//! Schema history:
//! - v1: accounts with balance, nonce and locks
//! - v2: adds per-identity delegates and the trusted signer set; accounts
//!   written before collaborator nonces existed load with none

use crate::store::AccountRecord;
use custody_core::{Amount, CustodyError, CustodyResult, Identity, Nonce};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version written by [`LedgerSnapshot::to_json`]
pub const SNAPSHOT_VERSION: u32 = 2;

/// Complete ledger state at the current schema version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Schema version
    pub version: u32,
    /// Every stored account
    pub accounts: Vec<AccountRecord>,
    /// Globally trusted signers in registration order
    #[serde(default)]
    pub trusted_signers: Vec<Identity>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct AccountRecordV1 {
    identity: Identity,
    deposited: Amount,
    nonce: Nonce,
    #[serde(default)]
    locks: IndexMap<String, Amount>,
}

#[derive(Deserialize)]
struct LedgerSnapshotV1 {
    accounts: Vec<AccountRecordV1>,
}

impl LedgerSnapshot {
    /// Snapshot at the current version
    pub fn new(accounts: Vec<AccountRecord>, trusted_signers: Vec<Identity>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            accounts,
            trusted_signers,
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> CustodyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON of any supported version, migrating as needed
    pub fn from_json(json: &str) -> CustodyResult<Self> {
        migrate(json)
    }

    /// Reject snapshots that would break ledger invariants
    pub fn validate(&self) -> CustodyResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CustodyError::serialization(format!(
                "snapshot version {} is not current ({SNAPSHOT_VERSION})",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for account in &self.accounts {
            if !seen.insert(account.identity) {
                return Err(CustodyError::serialization(format!(
                    "duplicate account {}",
                    account.identity
                )));
            }
            for (purpose, amount) in &account.locks {
                if purpose.is_empty() || *amount == 0 {
                    return Err(CustodyError::serialization(format!(
                        "account {} holds an invalid lock {purpose:?} = {amount}",
                        account.identity
                    )));
                }
            }
        }

        let trusted: HashSet<_> = self.trusted_signers.iter().collect();
        if trusted.len() != self.trusted_signers.len() {
            return Err(CustodyError::serialization("duplicate trusted signer"));
        }
        Ok(())
    }
}

/// Upgrade a serialized snapshot of any supported version to the current one
pub fn migrate(json: &str) -> CustodyResult<LedgerSnapshot> {
    let probe: VersionProbe = serde_json::from_str(json)?;
    let snapshot = match probe.version {
        1 => {
            let v1: LedgerSnapshotV1 = serde_json::from_str(json)?;
            tracing::info!(accounts = v1.accounts.len(), "migrating snapshot from v1");
            migrate_v1(v1)
        }
        SNAPSHOT_VERSION => serde_json::from_str(json)?,
        other => {
            return Err(CustodyError::serialization(format!(
                "unsupported snapshot version {other}"
            )))
        }
    };
    snapshot.validate()?;
    Ok(snapshot)
}

fn migrate_v1(v1: LedgerSnapshotV1) -> LedgerSnapshot {
    let accounts = v1
        .accounts
        .into_iter()
        .map(|account| AccountRecord {
            identity: account.identity,
            deposited: account.deposited,
            nonce: account.nonce,
            collaborator_nonces: IndexMap::new(),
            // v1 writers could leave zeroed locks behind
            locks: account
                .locks
                .into_iter()
                .filter(|(_, amount)| *amount > 0)
                .collect(),
            delegates: IndexSet::new(),
        })
        .collect();
    LedgerSnapshot::new(accounts, Vec::new())
}
