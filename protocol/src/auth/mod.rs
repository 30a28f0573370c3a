//! # Authorization Evaluator
//!
//! Decides whether a [`SignatureSet`] carries enough signer weight to
//! authorize an operation class on an account.
//!
//! ```text
//! signature_set.rs: order-insensitive (key → signature) set
//! mod.rs          : weight summation and the threshold comparison
//! ```
//!
//! ## Rules
//!
//! - Only signatures that verify over the payload (the transaction hash)
//!   count. Unknown keys and bad signatures are ignored, not errors.
//! - Weights are looked up in [`Account::signer_weights`] on every call.
//!   Nothing is cached between calls.
//! - The effective requirement is `max(threshold, 1)`. A signature set
//!   whose total weight is zero never authorizes anything, so an account
//!   whose master weight was set to 0 with no other signers is locked out
//!   for good.

pub mod signature_set;

use thiserror::Error;
use tracing::debug;

use crate::account::{Account, AuthClass};
use crate::crypto::keys::AccountId;

pub use signature_set::SignatureSet;

/// Authorization failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The summed weight of valid signatures fell short of the threshold.
    #[error("insufficient signer weight for {class} operation on {account}: have {have}, need {need}")]
    InsufficientWeight {
        account: AccountId,
        class: AuthClass,
        have: u32,
        need: u32,
    },
}

/// Proof that `account` passed the threshold for `class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    pub account: AccountId,
    pub class: AuthClass,
    pub weight: u32,
    pub need: u32,
}

/// Sum of the weights of every account signer that produced a valid
/// signature over `payload`.
pub fn signed_weight(account: &Account, signatures: &SignatureSet, payload: &[u8]) -> u32 {
    let weights = account.signer_weights();
    signatures
        .verified_signers(payload)
        .filter_map(|key| weights.get(key))
        .map(|w| u32::from(*w))
        .sum()
}

/// Weight an operation of `class` needs on `account`. Never below 1.
pub fn required_weight(account: &Account, class: AuthClass) -> u32 {
    u32::from(account.required_weight(class)).max(1)
}

/// Check that `signatures` authorizes an operation of `class` on
/// `account`, with `payload` being the bytes that were signed.
pub fn authorize(
    account: &Account,
    class: AuthClass,
    signatures: &SignatureSet,
    payload: &[u8],
) -> Result<Authorized, AuthError> {
    let have = signed_weight(account, signatures, payload);
    let need = required_weight(account, class);

    debug!(account = %account.id, %class, have, need, "evaluating authorization");

    if have < need {
        return Err(AuthError::InsufficientWeight {
            account: account.id,
            class,
            have,
            need,
        });
    }

    Ok(Authorized {
        account: account.id,
        class,
        weight: have,
        need,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Thresholds;
    use crate::crypto::keys::Keypair;

    const PAYLOAD: &[u8] = b"transaction hash";

    fn kp(seed: u8) -> Keypair {
        Keypair::from_seed(&[seed; 32])
    }

    fn sign_with(keys: &[&Keypair]) -> SignatureSet {
        keys.iter()
            .map(|k| (k.public_key(), k.sign(PAYLOAD)))
            .collect()
    }

    /// master:1, S1:1, S2:1 with thresholds low 1, medium 2, high 3.
    fn joint_account() -> (Account, Keypair, Keypair, Keypair) {
        let master = kp(1);
        let s1 = kp(2);
        let s2 = kp(3);
        let mut acct = Account::new(master.public_key(), 0, 100);
        acct.thresholds = Thresholds::new(1, 1, 2, 3);
        acct.set_signer(s1.public_key(), 1).unwrap();
        acct.set_signer(s2.public_key(), 1).unwrap();
        (acct, master, s1, s2)
    }

    #[test]
    fn two_cosigners_pass_medium() {
        let (acct, _, s1, s2) = joint_account();
        let auth = authorize(&acct, AuthClass::Medium, &sign_with(&[&s1, &s2]), PAYLOAD).unwrap();
        assert_eq!(auth.weight, 2);
        assert_eq!(auth.need, 2);
    }

    #[test]
    fn single_cosigner_fails_medium() {
        let (acct, _, s1, _) = joint_account();
        match authorize(&acct, AuthClass::Medium, &sign_with(&[&s1]), PAYLOAD) {
            Err(AuthError::InsufficientWeight { have: 1, need: 2, account, .. }) => {
                assert_eq!(account, acct.id);
            }
            other => panic!("expected InsufficientWeight(1, 2), got {:?}", other),
        }
    }

    #[test]
    fn high_needs_everyone() {
        let (acct, master, s1, s2) = joint_account();
        assert!(authorize(&acct, AuthClass::High, &sign_with(&[&s1, &s2]), PAYLOAD).is_err());
        assert!(authorize(&acct, AuthClass::High, &sign_with(&[&master, &s1, &s2]), PAYLOAD).is_ok());
    }

    #[test]
    fn unknown_signers_are_ignored() {
        let (acct, master, _, _) = joint_account();
        let stranger = kp(9);
        let auth = authorize(&acct, AuthClass::Low, &sign_with(&[&master, &stranger]), PAYLOAD).unwrap();
        assert_eq!(auth.weight, 1);
    }

    #[test]
    fn signature_over_other_payload_does_not_count() {
        let (acct, master, _, _) = joint_account();
        let mut set = SignatureSet::new();
        set.insert(master.public_key(), master.sign(b"different transaction"));
        assert!(authorize(&acct, AuthClass::Low, &set, PAYLOAD).is_err());
    }

    #[test]
    fn master_only_account_matches_threshold_rule() {
        let master = kp(1);
        for m in 0..=4u8 {
            for threshold in 0..=4u8 {
                let mut acct = Account::new(master.public_key(), 0, 100);
                acct.thresholds = Thresholds::new(m, threshold, threshold, threshold);
                let ok = authorize(&acct, AuthClass::Medium, &sign_with(&[&master]), PAYLOAD).is_ok();
                // A zero threshold still needs weight 1.
                assert_eq!(ok, m >= threshold.max(1), "m={} threshold={}", m, threshold);
            }
        }
    }

    #[test]
    fn zero_master_weight_locks_account() {
        let master = kp(1);
        let mut acct = Account::new(master.public_key(), 0, 100);
        acct.thresholds = Thresholds::new(0, 0, 0, 0);
        for class in [AuthClass::Low, AuthClass::Medium, AuthClass::High] {
            match authorize(&acct, class, &sign_with(&[&master]), PAYLOAD) {
                Err(AuthError::InsufficientWeight { have: 0, need: 1, .. }) => {}
                other => panic!("expected lockout, got {:?}", other),
            }
        }
    }

    #[test]
    fn raising_a_weight_never_lowers_total() {
        let (mut acct, master, s1, s2) = joint_account();
        let set = sign_with(&[&master, &s1, &s2]);
        let mut last = signed_weight(&acct, &set, PAYLOAD);
        for w in 2..=10u8 {
            acct.set_signer(s1.public_key(), w).unwrap();
            let now = signed_weight(&acct, &set, PAYLOAD);
            assert!(now >= last);
            last = now;
        }
    }
}
