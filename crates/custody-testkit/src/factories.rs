//! Request factories

use custody_core::{Amount, Identity};
use custody_ledger::{
    DelegateRequest, LockRequest, UnlockAndWithdrawRequest, UnlockRequest, WithdrawRequest,
};

/// Lock request
pub fn lock_request(identity: Identity, purpose: &str, amount: Amount, from_balance: bool) -> LockRequest {
    LockRequest {
        identity,
        purpose: purpose.to_string(),
        amount,
        from_balance,
    }
}

/// Unlock request
pub fn unlock_request(identity: Identity, purpose: &str) -> UnlockRequest {
    UnlockRequest {
        identity,
        purpose: purpose.to_string(),
    }
}

/// Unlock-and-withdraw request
pub fn unlock_and_withdraw_request(
    identity: Identity,
    purpose: &str,
    recipient: Identity,
) -> UnlockAndWithdrawRequest {
    UnlockAndWithdrawRequest {
        identity,
        purpose: purpose.to_string(),
        recipient,
    }
}

/// Withdraw request
pub fn withdraw_request(identity: Identity, recipient: Identity, amount: Amount) -> WithdrawRequest {
    WithdrawRequest {
        identity,
        recipient,
        amount,
    }
}

/// Delegate registration or revocation
pub fn delegate_request(identity: Identity, delegate: Identity) -> DelegateRequest {
    DelegateRequest { identity, delegate }
}
