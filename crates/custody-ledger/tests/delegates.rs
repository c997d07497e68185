//! Delegated ownership proofs and trusted signers

use assert_matches::assert_matches;
use custody_core::{CustodyError, LedgerEvent, SignedOperation};
use custody_signature::ContextSigner;
use custody_testkit::*;

#[test]
fn registered_delegate_can_vouch_for_a_context_key() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let a = alice.identity();
    let delegate = ContextSigner::from_seed("alice-delegate");
    let context = ContextSigner::from_seed("alice-delegate/app");
    ledger.fund(&a, 1000);

    let request = lock_request(a, "x", 100, true);
    let operation = SignedOperation::from(&request);
    let auth = delegated_auth(&delegate, &context, &operation, 0);
    assert_matches!(
        ledger.engine.lock(&ledger.relayer, &request, &auth),
        Err(CustodyError::InvalidSignature { .. })
    );

    let receipt = ledger.add_delegate(&alice, &delegate.identity()).unwrap();
    assert_matches!(receipt.event, LedgerEvent::DelegateAdded { .. });
    assert_eq!(ledger.engine.delegates(&a), vec![delegate.identity()]);

    let auth = delegated_auth(&delegate, &context, &operation, 1);
    ledger.engine.lock(&ledger.relayer, &request, &auth).unwrap();
    assert_eq!(ledger.engine.locked(&a, "x"), 100);
}

#[test]
fn revoked_delegate_loses_authority() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let a = alice.identity();
    let delegate = ContextSigner::from_seed("alice-delegate");
    ledger.fund(&a, 1000);

    ledger.add_delegate(&alice, &delegate.identity()).unwrap();
    ledger.remove_delegate(&alice, &delegate.identity()).unwrap();
    assert!(ledger.engine.delegates(&a).is_empty());

    let request = lock_request(a, "x", 100, true);
    let auth = delegated_auth(&delegate, &delegate, &SignedOperation::from(&request), 2);
    assert_matches!(
        ledger.engine.lock(&ledger.relayer, &request, &auth),
        Err(CustodyError::InvalidSignature { .. })
    );
}

#[test]
fn duplicate_and_unknown_delegates_are_rejected() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let a = alice.identity();
    let delegate = ContextSigner::from_seed("alice-delegate").identity();

    ledger.add_delegate(&alice, &delegate).unwrap();
    assert_matches!(
        ledger.add_delegate(&alice, &delegate),
        Err(CustodyError::RegisteredSigner { .. })
    );
    ledger.remove_delegate(&alice, &delegate).unwrap();
    assert_matches!(
        ledger.remove_delegate(&alice, &delegate),
        Err(CustodyError::UnregisteredSigner { .. })
    );
    assert_eq!(ledger.engine.nonce(&a), 2);
}

#[test]
fn delegates_do_not_leak_across_identities() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let bob = TestWallet::new("bob");
    let delegate = ContextSigner::from_seed("shared-delegate");
    ledger.fund(&bob.identity(), 1000);
    ledger.add_delegate(&alice, &delegate.identity()).unwrap();

    let request = lock_request(bob.identity(), "x", 100, true);
    let auth = delegated_auth(&delegate, &delegate, &SignedOperation::from(&request), 0);
    assert_matches!(
        ledger.engine.lock(&ledger.relayer, &request, &auth),
        Err(CustodyError::InvalidSignature { .. })
    );
}

#[test]
fn trusted_signer_vouches_for_data() {
    let ledger = TestLedger::new();
    let trusted = ContextSigner::from_seed("verida-trusted");
    let context = ContextSigner::from_seed("reward-context");
    let data = b"reward:claim:42".to_vec();
    let signature = context.sign(&data).unwrap();
    let proof = trusted.proof_for(&context.identity()).unwrap();

    assert_matches!(
        ledger.engine.verify_trusted_data(&data, &signature, &proof),
        Err(CustodyError::InvalidSignature { .. })
    );

    ledger.engine.add_trusted_signer(trusted.identity()).unwrap();
    assert_eq!(
        ledger.engine.verify_trusted_data(&data, &signature, &proof).unwrap(),
        trusted.identity()
    );
    assert_matches!(
        ledger.engine.add_trusted_signer(trusted.identity()),
        Err(CustodyError::RegisteredSigner { .. })
    );

    ledger.engine.remove_trusted_signer(&trusted.identity()).unwrap();
    assert!(ledger.engine.trusted_signers().is_empty());
    assert_matches!(
        ledger.engine.remove_trusted_signer(&trusted.identity()),
        Err(CustodyError::UnregisteredSigner { .. })
    );
}

#[test]
fn signed_delegate_registration_cannot_release_a_lock() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let a = alice.identity();

    // A delegate whose address starts with an ASCII byte could once be read
    // as `purpose ∥ recipient`
    let delegate = (0..)
        .map(|i| ContextSigner::from_seed(&format!("delegate-{i}")).identity())
        .find(|delegate| delegate.as_bytes()[0].is_ascii_alphanumeric())
        .unwrap();
    let purpose = (delegate.as_bytes()[0] as char).to_string();
    let mut tail = [0u8; 20];
    tail[..19].copy_from_slice(&delegate.as_bytes()[1..]);
    tail[19] = 0x01;
    let recipient = Identity::from_bytes(tail);

    ledger.fund(&a, 1000);
    ledger.lock(&alice, &purpose, 500, true).unwrap();
    let auth = ledger.sign(&alice, &delegate_request(a, delegate).add_operation());

    let release = unlock_and_withdraw_request(a, &purpose, recipient);
    assert_matches!(
        ledger.engine.unlock_and_withdraw(&release, &auth),
        Err(CustodyError::InvalidSignature { .. })
    );
    assert_matches!(
        ledger.engine.unlock(&unlock_request(a, &purpose), &auth),
        Err(CustodyError::InvalidSignature { .. })
    );
    assert_eq!(ledger.engine.locked(&a, &purpose), 500);
    assert_eq!(ledger.vault.balance_of(&recipient), 0);
    assert_eq!(ledger.engine.nonce(&a), 1);

    // The same signature still registers the delegate
    ledger
        .engine
        .add_delegate(&delegate_request(a, delegate), &auth)
        .unwrap();
    assert_eq!(ledger.engine.delegates(&a), vec![delegate]);
}

#[test]
fn receipts_record_the_vouching_delegate() {
    let ledger = TestLedger::new();
    let alice = TestWallet::new("alice");
    let a = alice.identity();
    let delegate = ContextSigner::from_seed("alice-delegate");
    let context = ContextSigner::from_seed("alice-delegate/app");
    ledger.fund(&a, 1000);

    let own = ledger.add_delegate(&alice, &delegate.identity()).unwrap();
    let own_authority = own.authority.unwrap();
    assert_eq!(own_authority.vouched_by, a);
    assert!(!own_authority.is_delegated(&a));

    let request = lock_request(a, "x", 100, true);
    let auth = delegated_auth(&delegate, &context, &SignedOperation::from(&request), 1);
    let receipt = ledger.engine.lock(&ledger.relayer, &request, &auth).unwrap();
    let authority = receipt.authority.unwrap();
    assert_eq!(authority.context_signer, context.identity());
    assert_eq!(authority.vouched_by, delegate.identity());
    assert!(authority.is_delegated(&a));
}
