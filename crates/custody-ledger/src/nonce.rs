//! Replay protection
//!
//! A request is valid only when it carries the identity's current nonce.
//! Consuming the nonce advances it by exactly one; the counter never moves
//! backwards, so a signed payload can succeed at most once.
//!
//! Ledger requests share one counter per identity. Each collaborator domain
//! gets its own counter, so collaborators never consume ledger nonces.

use crate::store::AccountRecord;
use custody_core::{CustodyError, CustodyResult, Nonce};

/// Counter a request draws its nonce from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceScope<'a> {
    /// Ledger operations
    Ledger,
    /// Requests authorized for a collaborator domain
    Collaborator(&'a str),
}

/// Nonce checks over a staged account record
#[derive(Debug, Default, Clone, Copy)]
pub struct NonceTracker;

impl NonceTracker {
    /// Nonce the next request must carry
    pub fn current(account: &AccountRecord) -> Nonce {
        account.nonce
    }

    /// Nonce the next request in `scope` must carry
    pub fn current_in(account: &AccountRecord, scope: NonceScope<'_>) -> Nonce {
        match scope {
            NonceScope::Ledger => account.nonce,
            NonceScope::Collaborator(domain) => account
                .collaborator_nonces
                .get(domain)
                .copied()
                .unwrap_or(0),
        }
    }

    /// Check `supplied` against the current ledger nonce and advance it.
    ///
    /// A mismatch is an `InvalidSignature`: the nonce is part of the signed
    /// message, so a stale one means the signature covers a different payload.
    pub fn consume(account: &mut AccountRecord, supplied: Nonce) -> CustodyResult<Nonce> {
        Self::consume_in(account, NonceScope::Ledger, supplied)
    }

    /// [`NonceTracker::consume`] against the counter of `scope`
    pub fn consume_in(
        account: &mut AccountRecord,
        scope: NonceScope<'_>,
        supplied: Nonce,
    ) -> CustodyResult<Nonce> {
        let current = Self::current_in(account, scope);
        if supplied != current {
            return Err(CustodyError::invalid_signature(format!(
                "nonce {supplied} does not match current nonce {current}"
            )));
        }
        let next = current
            .checked_add(1)
            .ok_or_else(|| CustodyError::invalid_signature("nonce space exhausted"))?;
        match scope {
            NonceScope::Ledger => account.nonce = next,
            NonceScope::Collaborator(domain) => {
                account.collaborator_nonces.insert(domain.to_string(), next);
            }
        }
        Ok(supplied)
    }
}
