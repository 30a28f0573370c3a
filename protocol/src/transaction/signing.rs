//! Transaction signing.
//!
//! Signing is a separate step from building because the keys may not be
//! available at construction time (hardware wallet, remote co-signer). Every
//! signer signs the 32-byte [`Transaction::hash`], never the full body.

use super::builder::Transaction;
use crate::auth::SignatureSet;
use crate::crypto::keys::{Keypair, PublicKey, Signature};

/// Anything that can produce an Ed25519 signature for a public key.
///
/// The engine only ever sees the public key and the signature, so an
/// implementation can keep its secret material out of process.
pub trait TransactionSigner {
    fn public_key(&self) -> PublicKey;
    fn sign(&self, payload: &[u8]) -> Signature;
}

impl TransactionSigner for Keypair {
    fn public_key(&self) -> PublicKey {
        Keypair::public_key(self)
    }

    fn sign(&self, payload: &[u8]) -> Signature {
        Keypair::sign(self, payload)
    }
}

/// Sign `tx` and add the signature to `signatures`, replacing any earlier
/// signature by the same key.
///
/// ```rust,no_run
/// use lumen_protocol::auth::SignatureSet;
/// use lumen_protocol::crypto::Keypair;
/// # use lumen_protocol::transaction::Transaction;
/// # fn demo(tx: &Transaction) {
/// let alice = Keypair::generate();
/// let mut signatures = SignatureSet::new();
/// lumen_protocol::transaction::sign_transaction(tx, &alice, &mut signatures);
/// assert!(signatures.contains(&alice.public_key()));
/// # }
/// ```
pub fn sign_transaction<S: TransactionSigner + ?Sized>(
    tx: &Transaction,
    signer: &S,
    signatures: &mut SignatureSet,
) {
    let signature = signer.sign(&tx.hash);
    signatures.insert(signer.public_key(), signature);
}

/// Collect signatures from several signers into a fresh set.
pub fn sign_with_all<'a, S, I>(tx: &Transaction, signers: I) -> SignatureSet
where
    S: TransactionSigner + 'a + ?Sized,
    I: IntoIterator<Item = &'a S>,
{
    let mut signatures = SignatureSet::new();
    for signer in signers {
        sign_transaction(tx, signer, &mut signatures);
    }
    signatures
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::asset::Asset;
    use crate::ledger::LedgerSnapshot;
    use crate::transaction::{Operation, TransactionBuilder};

    fn sample_tx(alice: &Keypair, bob: &Keypair) -> Transaction {
        let mut snap = LedgerSnapshot::new(100);
        snap.insert_account(Account::new(alice.public_key(), 10_000, 100));
        snap.insert_account(Account::new(bob.public_key(), 10_000, 100));
        TransactionBuilder::new(alice.public_key(), 0)
            .operation(Operation::payment(bob.public_key(), Asset::native(), 10))
            .build(&snap)
            .unwrap()
    }

    #[test]
    fn signature_covers_the_hash() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let tx = sample_tx(&alice, &bob);

        let mut sigs = SignatureSet::new();
        sign_transaction(&tx, &alice, &mut sigs);
        let sig = sigs.get(&alice.public_key()).unwrap();
        assert!(alice.public_key().verify(&tx.hash, sig));
    }

    #[test]
    fn resigning_replaces_the_entry() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let tx = sample_tx(&alice, &bob);

        let mut sigs = SignatureSet::new();
        sign_transaction(&tx, &alice, &mut sigs);
        sign_transaction(&tx, &alice, &mut sigs);
        assert_eq!(sigs.len(), 1);
    }

    #[test]
    fn sign_with_all_collects_every_signer() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let tx = sample_tx(&alice, &bob);

        let sigs = sign_with_all(&tx, [&alice, &bob]);
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs.verified_signers(&tx.hash).count(), 2);
    }

    #[test]
    fn works_through_a_trait_object() {
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let tx = sample_tx(&alice, &bob);

        let signer: &dyn TransactionSigner = &alice;
        let mut sigs = SignatureSet::new();
        sign_transaction(&tx, signer, &mut sigs);
        assert!(sigs.contains(&alice.public_key()));
    }
}
