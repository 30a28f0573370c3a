//! Transaction authorization: hash integrity plus per-account signer weight.
//!
//! [`authorize_transaction`] is the only way to obtain an
//! [`AuthorizedTransaction`], and an `AuthorizedTransaction` is the only
//! thing the submission seam accepts. The checks, in order:
//!
//! 1. **Hash** must equal the SHA-256 of the signable bytes.
//! 2. **Accounts**: every distinct effective source account must exist in
//!    the snapshot.
//! 3. **Weight**: for each account, in sorted id order, the valid
//!    signatures must reach the threshold of the highest class that
//!    account's operations need.
//!
//! The first failure is returned. Nothing is cached: weights are read from
//! the snapshot on every call.

use serde::Serialize;
use tracing::debug;

use super::builder::Transaction;
use super::error::TransactionError;
use crate::auth::{authorize, Authorized, SignatureSet};
use crate::ledger::LedgerSnapshot;

/// A transaction whose signatures satisfied every referenced account.
///
/// Fields are private so the type cannot be forged outside this module.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizedTransaction {
    tx: Transaction,
    signatures: SignatureSet,
    #[serde(skip)]
    authorizations: Vec<Authorized>,
}

impl AuthorizedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// One entry per distinct source account, in id order.
    pub fn authorizations(&self) -> &[Authorized] {
        &self.authorizations
    }
}

/// Check `signatures` against every account `tx` touches.
pub fn authorize_transaction(
    tx: &Transaction,
    signatures: &SignatureSet,
    snapshot: &LedgerSnapshot,
) -> Result<AuthorizedTransaction, TransactionError> {
    let actual = tx.compute_hash()?;
    if actual != tx.hash {
        return Err(TransactionError::HashMismatch {
            expected: hex::encode(actual),
            actual: tx.hash_hex(),
        });
    }

    let mut authorizations = Vec::new();
    for (account_id, class) in tx.required_classes() {
        let account = snapshot
            .account(&account_id)
            .ok_or(TransactionError::AccountNotFound(account_id))?;
        authorizations.push(authorize(account, class, signatures, &tx.hash)?);
    }

    debug!(
        hash = %tx.hash_hex(),
        accounts = authorizations.len(),
        signatures = signatures.len(),
        "transaction authorized"
    );

    Ok(AuthorizedTransaction {
        tx: tx.clone(),
        signatures: signatures.clone(),
        authorizations,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AuthClass, Thresholds};
    use crate::asset::Asset;
    use crate::auth::AuthError;
    use crate::crypto::keys::Keypair;
    use crate::transaction::signing::{sign_transaction, sign_with_all};
    use crate::transaction::{Operation, TransactionBuilder};

    fn kp(seed: u8) -> Keypair {
        Keypair::from_seed(&[seed; 32])
    }

    fn snapshot() -> LedgerSnapshot {
        let mut snap = LedgerSnapshot::new(100);
        for seed in 1..=3 {
            snap.insert_account(Account::new(kp(seed).public_key(), 10_000, 100));
        }
        snap
    }

    fn payment_tx(snap: &LedgerSnapshot) -> Transaction {
        TransactionBuilder::new(kp(1).public_key(), 0)
            .operation(Operation::payment(kp(2).public_key(), Asset::native(), 10))
            .build(snap)
            .unwrap()
    }

    #[test]
    fn master_signature_authorizes_default_account() {
        let snap = snapshot();
        let tx = payment_tx(&snap);
        let sigs = sign_with_all(&tx, [&kp(1)]);
        let authorized = authorize_transaction(&tx, &sigs, &snap).unwrap();
        assert_eq!(authorized.authorizations().len(), 1);
        assert_eq!(authorized.authorizations()[0].class, AuthClass::Medium);
        assert_eq!(authorized.transaction().hash, tx.hash);
    }

    #[test]
    fn missing_signature_is_insufficient_weight() {
        let snap = snapshot();
        let tx = payment_tx(&snap);
        let sigs = sign_with_all(&tx, [&kp(2)]);
        match authorize_transaction(&tx, &sigs, &snap) {
            Err(TransactionError::Auth(AuthError::InsufficientWeight { have, need, .. })) => {
                assert_eq!((have, need), (0, 1));
            }
            other => panic!("expected InsufficientWeight, got {:?}", other),
        }
    }

    #[test]
    fn tampered_transaction_is_rejected() {
        let snap = snapshot();
        let mut tx = payment_tx(&snap);
        let sigs = sign_with_all(&tx, [&kp(1)]);
        tx.sequence += 1;
        assert!(matches!(
            authorize_transaction(&tx, &sigs, &snap),
            Err(TransactionError::HashMismatch { .. })
        ));
    }

    #[test]
    fn every_source_account_must_sign() {
        let snap = snapshot();
        let tx = TransactionBuilder::new(kp(1).public_key(), 0)
            .operation(Operation::payment(kp(2).public_key(), Asset::native(), 10))
            .operation(
                Operation::payment(kp(1).public_key(), Asset::native(), 10)
                    .with_source(kp(3).public_key()),
            )
            .build(&snap)
            .unwrap();

        let mut sigs = SignatureSet::new();
        sign_transaction(&tx, &kp(1), &mut sigs);
        match authorize_transaction(&tx, &sigs, &snap) {
            Err(TransactionError::Auth(AuthError::InsufficientWeight { account, .. })) => {
                assert_eq!(account, kp(3).public_key());
            }
            other => panic!("expected InsufficientWeight, got {:?}", other),
        }

        sign_transaction(&tx, &kp(3), &mut sigs);
        let authorized = authorize_transaction(&tx, &sigs, &snap).unwrap();
        assert_eq!(authorized.authorizations().len(), 2);
    }

    #[test]
    fn first_failure_follows_account_order() {
        let snap = snapshot();
        let tx = TransactionBuilder::new(kp(1).public_key(), 0)
            .operation(
                Operation::payment(kp(1).public_key(), Asset::native(), 1)
                    .with_source(kp(2).public_key()),
            )
            .operation(
                Operation::payment(kp(1).public_key(), Asset::native(), 1)
                    .with_source(kp(3).public_key()),
            )
            .build(&snap)
            .unwrap();
        let sigs = sign_with_all(&tx, [&kp(1)]);

        let mut missing = vec![kp(2).public_key(), kp(3).public_key()];
        missing.sort();
        match authorize_transaction(&tx, &sigs, &snap) {
            Err(TransactionError::Auth(AuthError::InsufficientWeight { account, .. })) => {
                assert_eq!(account, missing[0]);
            }
            other => panic!("expected InsufficientWeight, got {:?}", other),
        }
    }

    #[test]
    fn high_class_needs_high_threshold() {
        let mut snap = snapshot();
        let alice = kp(1).public_key();
        {
            let account = snap.account_mut(&alice).unwrap();
            account.thresholds = Thresholds::new(1, 1, 1, 2);
        }
        let tx = TransactionBuilder::new(alice, 0)
            .operation(Operation::set_signer(kp(2).public_key(), 1))
            .build(&snap)
            .unwrap();
        let sigs = sign_with_all(&tx, [&kp(1)]);
        match authorize_transaction(&tx, &sigs, &snap) {
            Err(TransactionError::Auth(AuthError::InsufficientWeight {
                class, have, need, ..
            })) => {
                assert_eq!(class, AuthClass::High);
                assert_eq!((have, need), (1, 2));
            }
            other => panic!("expected InsufficientWeight, got {:?}", other),
        }
    }

    #[test]
    fn unknown_operation_source_is_reported() {
        let snap = snapshot();
        let tx = payment_tx(&snap);
        let mut empty = LedgerSnapshot::new(100);
        empty.insert_account(Account::new(kp(2).public_key(), 10_000, 100));
        let sigs = sign_with_all(&tx, [&kp(1)]);
        assert!(matches!(
            authorize_transaction(&tx, &sigs, &empty),
            Err(TransactionError::AccountNotFound(_))
        ));
    }
}
