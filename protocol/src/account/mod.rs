//! # Accounts, Signers and Thresholds
//!
//! An [`Account`] is the ledger's unit of identity and authorization
//! policy: a sequence counter, a native balance, weighted signers, four
//! threshold values, issuer flags and a small key/value data store.
//!
//! The signer weights are never cached. [`Account::signer_weights`] is
//! recomputed from the snapshot value every time an authorization check
//! runs, so a stale answer is impossible by construction.

pub mod thresholds;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{BASE_RESERVE_ENTRIES, MAX_SIGNERS};
use crate::crypto::keys::{AccountId, PublicKey};

pub use thresholds::{AuthClass, Signer, Thresholds};

/// Failures of account-level mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("account already has the maximum of 20 signers")]
    TooManySigners,

    #[error("the master key cannot be added as an additional signer")]
    SignerIsMasterKey,

    #[error("account flags are immutable")]
    FlagsImmutable,

    #[error("unknown account flag {0:?}")]
    UnknownFlag(String),
}

// ---------------------------------------------------------------------------
// AccountFlags
// ---------------------------------------------------------------------------

/// Issuer flags. Only meaningful on accounts that issue assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFlags {
    /// New trustlines to this issuer's assets start unauthorized.
    pub auth_required: bool,
    /// The issuer may revoke trustline authorization.
    pub auth_revocable: bool,
    /// No flag may ever change again.
    pub auth_immutable: bool,
}

impl AccountFlags {
    /// True if no flag is set.
    pub fn is_empty(&self) -> bool {
        !(self.auth_required || self.auth_revocable || self.auth_immutable)
    }

    /// `true` if any flag set in `self` is also set in `other`.
    pub fn intersects(&self, other: &AccountFlags) -> bool {
        (self.auth_required && other.auth_required)
            || (self.auth_revocable && other.auth_revocable)
            || (self.auth_immutable && other.auth_immutable)
    }

    /// Apply set/clear masks. Clearing wins nothing: a flag present in both
    /// masks is rejected earlier by operation validation.
    pub fn apply(&self, set: &AccountFlags, clear: &AccountFlags) -> Result<Self, AccountError> {
        if self.auth_immutable && !(set.is_empty() && clear.is_empty()) {
            return Err(AccountError::FlagsImmutable);
        }
        Ok(Self {
            auth_required: (self.auth_required || set.auth_required) && !clear.auth_required,
            auth_revocable: (self.auth_revocable || set.auth_revocable) && !clear.auth_revocable,
            auth_immutable: (self.auth_immutable || set.auth_immutable) && !clear.auth_immutable,
        })
    }
}

impl FromStr for AccountFlags {
    type Err = AccountError;

    /// Parse a comma separated list: `auth_required,auth_revocable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = AccountFlags::default();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "auth_required" => flags.auth_required = true,
                "auth_revocable" => flags.auth_revocable = true,
                "auth_immutable" => flags.auth_immutable = true,
                other => return Err(AccountError::UnknownFlag(other.to_string())),
            }
        }
        Ok(flags)
    }
}

impl fmt::Display for AccountFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.auth_required, "auth_required"),
            (self.auth_revocable, "auth_revocable"),
            (self.auth_immutable, "auth_immutable"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        write!(f, "{}", names.join(","))
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Ledger state of one account, as read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Sequence number of the last transaction this account submitted.
    pub sequence: u64,
    /// Native balance in stroops.
    pub balance: u64,
    pub base_reserve: u64,
    /// Additional signers, kept sorted by key.
    #[serde(default)]
    pub signers: Vec<Signer>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub flags: AccountFlags,
    /// Named data entries, values hex-encoded on the wire.
    #[serde(default, with = "data_entries")]
    pub data: BTreeMap<String, Vec<u8>>,
}

impl Account {
    /// A new account with default thresholds and no extra signers.
    pub fn new(id: AccountId, balance: u64, base_reserve: u64) -> Self {
        Self {
            id,
            sequence: 0,
            balance,
            base_reserve,
            signers: Vec::new(),
            thresholds: Thresholds::default(),
            flags: AccountFlags::default(),
            data: BTreeMap::new(),
        }
    }

    /// Every key that may sign for this account, with its weight.
    ///
    /// The master key is always present with weight `master_weight`, which
    /// may be zero. Zero-weight entries contribute nothing when summed.
    pub fn signer_weights(&self) -> BTreeMap<PublicKey, u8> {
        let mut weights: BTreeMap<PublicKey, u8> =
            self.signers.iter().map(|s| (s.key, s.weight)).collect();
        weights.insert(self.id, self.thresholds.master_weight);
        weights
    }

    /// The threshold this account requires for `class`.
    pub fn required_weight(&self, class: AuthClass) -> u8 {
        self.thresholds.for_class(class)
    }

    /// Add, re-weight (weight > 0) or remove (weight == 0) a signer.
    pub fn set_signer(&mut self, key: PublicKey, weight: u8) -> Result<(), AccountError> {
        if key == self.id {
            return Err(AccountError::SignerIsMasterKey);
        }
        let existing = self.signers.iter().position(|s| s.key == key);
        match (existing, weight) {
            (Some(idx), 0) => {
                self.signers.remove(idx);
            }
            (Some(idx), w) => self.signers[idx].weight = w,
            (None, 0) => {}
            (None, w) => {
                if self.signers.len() >= MAX_SIGNERS {
                    return Err(AccountError::TooManySigners);
                }
                self.signers.push(Signer::new(key, w));
                self.signers.sort_by_key(|s| s.key);
            }
        }
        Ok(())
    }

    /// Subentries owned directly by the account record.
    pub fn own_subentries(&self) -> u64 {
        (self.signers.len() + self.data.len()) as u64
    }

    /// Minimum native balance, given the number of trustlines and offers
    /// the account owns elsewhere in the ledger.
    pub fn minimum_balance(&self, external_subentries: u64) -> u64 {
        (BASE_RESERVE_ENTRIES + self.own_subentries() + external_subentries)
            .saturating_mul(self.base_reserve)
    }
}

// ---------------------------------------------------------------------------
// Serde helper: data entry values as hex strings
// ---------------------------------------------------------------------------

/// Serializes `BTreeMap<String, Vec<u8>>` with hex-encoded values so
/// snapshot files stay readable.
mod data_entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoded: BTreeMap<&String, String> =
            map.iter().map(|(k, v)| (k, hex::encode(v))).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<u8>>, D::Error> {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(k, v)| {
                hex::decode(&v)
                    .map(|bytes| (k, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    fn key(seed: u8) -> PublicKey {
        Keypair::from_seed(&[seed; 32]).public_key()
    }

    #[test]
    fn master_key_always_listed() {
        let mut acct = Account::new(key(1), 0, 100);
        acct.thresholds.master_weight = 0;
        let weights = acct.signer_weights();
        assert_eq!(weights.get(&key(1)), Some(&0));
    }

    #[test]
    fn set_signer_add_update_remove() {
        let mut acct = Account::new(key(1), 0, 100);
        acct.set_signer(key(2), 1).unwrap();
        acct.set_signer(key(3), 1).unwrap();
        assert_eq!(acct.signers.len(), 2);

        acct.set_signer(key(2), 5).unwrap();
        assert_eq!(acct.signer_weights().get(&key(2)), Some(&5));

        acct.set_signer(key(2), 0).unwrap();
        assert_eq!(acct.signers.len(), 1);
        assert!(!acct.signer_weights().contains_key(&key(2)));
    }

    #[test]
    fn master_key_is_not_an_extra_signer() {
        let mut acct = Account::new(key(1), 0, 100);
        assert_eq!(acct.set_signer(key(1), 3), Err(AccountError::SignerIsMasterKey));
    }

    #[test]
    fn signer_cap_enforced() {
        let mut acct = Account::new(key(1), 0, 100);
        for seed in 2..(2 + MAX_SIGNERS as u8) {
            acct.set_signer(key(seed), 1).unwrap();
        }
        assert_eq!(acct.set_signer(key(200), 1), Err(AccountError::TooManySigners));
    }

    #[test]
    fn minimum_balance_counts_subentries() {
        let mut acct = Account::new(key(1), 0, 100);
        assert_eq!(acct.minimum_balance(0), 200);
        acct.set_signer(key(2), 1).unwrap();
        acct.data.insert("foo".into(), b"bar".to_vec());
        assert_eq!(acct.minimum_balance(1), 500);
    }

    #[test]
    fn flags_set_clear_and_immutable() {
        let flags = AccountFlags::default();
        let set: AccountFlags = "auth_revocable".parse().unwrap();
        let flags = flags.apply(&set, &AccountFlags::default()).unwrap();
        assert!(flags.auth_revocable);
        let flags = flags.apply(&AccountFlags::default(), &set).unwrap();
        assert!(!flags.auth_revocable);

        let locked = AccountFlags {
            auth_immutable: true,
            ..Default::default()
        };
        assert_eq!(
            locked.apply(&set, &AccountFlags::default()),
            Err(AccountError::FlagsImmutable)
        );
        assert!("auth_bogus".parse::<AccountFlags>().is_err());
    }

    #[test]
    fn data_entries_serialize_as_hex() {
        let mut acct = Account::new(key(1), 0, 100);
        acct.data.insert("foo".into(), b"bar".to_vec());
        let json = serde_json::to_value(&acct).unwrap();
        assert_eq!(json["data"]["foo"], "626172");
        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, acct);
    }
}
