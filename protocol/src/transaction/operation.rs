//! Operations: the closed set of ledger actions a transaction can carry.
//!
//! Each variant declares its own [`AuthClass`]:
//!
//! | Operation        | Class  |
//! |------------------|--------|
//! | CreateAccount    | medium |
//! | Payment          | medium |
//! | PathPayment      | medium |
//! | CreateTrustLine  | medium |
//! | RemoveTrustLine  | medium |
//! | ManageOffer      | medium |
//! | SetSigner        | high   |
//! | SetThresholds    | high   |
//! | SetFlags         | high   |
//! | ManageData       | low    |
//!
//! Every operation has an optional source account. When absent, the
//! transaction's source is used. Authorization is evaluated per effective
//! source account, so an operation with a distinct source needs that
//! account's signers too.

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use crate::account::{AccountFlags, AuthClass};
use crate::asset::Asset;
use crate::config::{MAX_DATA_NAME_LENGTH, MAX_DATA_VALUE_LENGTH};
use crate::crypto::keys::{AccountId, PublicKey};
use crate::dex::{OfferId, PathMode, Price};

/// Operation payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationBody {
    /// Fund a brand-new account with native balance.
    CreateAccount {
        destination: AccountId,
        starting_balance: u64,
    },
    Payment {
        destination: AccountId,
        asset: Asset,
        amount: u64,
    },
    /// Cross-asset payment through the order book. `path` holds fixed
    /// intermediate assets; `None` lets the resolver search.
    PathPayment {
        destination: AccountId,
        send_asset: Asset,
        dest_asset: Asset,
        mode: PathMode,
        path: Option<Vec<Asset>>,
    },
    /// Create a trustline, or change the limit of an existing one.
    CreateTrustLine { asset: Asset, limit: u64 },
    /// Delete a trustline. Its balance must be zero.
    RemoveTrustLine { asset: Asset },
    /// Add or re-weight a signer. Weight 0 removes it.
    SetSigner { signer: PublicKey, weight: u8 },
    /// Fields left as `None` are unchanged.
    SetThresholds {
        master_weight: Option<u8>,
        low: Option<u8>,
        medium: Option<u8>,
        high: Option<u8>,
    },
    SetFlags {
        set: AccountFlags,
        clear: AccountFlags,
    },
    /// `offer_id: None` creates an offer; `Some(id)` updates it, and an
    /// update with `amount == 0` deletes it.
    ManageOffer {
        offer_id: Option<OfferId>,
        selling: Asset,
        buying: Asset,
        amount: u64,
        price: Price,
    },
    /// `value: None` deletes the entry.
    ManageData { name: String, value: Option<Vec<u8>> },
}

impl OperationBody {
    pub fn auth_class(&self) -> AuthClass {
        match self {
            Self::CreateAccount { .. }
            | Self::Payment { .. }
            | Self::PathPayment { .. }
            | Self::CreateTrustLine { .. }
            | Self::RemoveTrustLine { .. }
            | Self::ManageOffer { .. } => AuthClass::Medium,
            Self::SetSigner { .. } | Self::SetThresholds { .. } | Self::SetFlags { .. } => {
                AuthClass::High
            }
            Self::ManageData { .. } => AuthClass::Low,
        }
    }

    /// Short name for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateAccount { .. } => "create_account",
            Self::Payment { .. } => "payment",
            Self::PathPayment { .. } => "path_payment",
            Self::CreateTrustLine { .. } => "create_trust_line",
            Self::RemoveTrustLine { .. } => "remove_trust_line",
            Self::SetSigner { .. } => "set_signer",
            Self::SetThresholds { .. } => "set_thresholds",
            Self::SetFlags { .. } => "set_flags",
            Self::ManageOffer { .. } => "manage_offer",
            Self::ManageData { .. } => "manage_data",
        }
    }
}

/// An operation with its optional source-account override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_account: Option<AccountId>,
    pub body: OperationBody,
}

impl From<OperationBody> for Operation {
    fn from(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        body.into()
    }

    /// Run this operation on behalf of `account` instead of the
    /// transaction source.
    pub fn with_source(mut self, account: AccountId) -> Self {
        self.source_account = Some(account);
        self
    }

    pub fn create_account(destination: AccountId, starting_balance: u64) -> Self {
        OperationBody::CreateAccount {
            destination,
            starting_balance,
        }
        .into()
    }

    pub fn payment(destination: AccountId, asset: Asset, amount: u64) -> Self {
        OperationBody::Payment {
            destination,
            asset,
            amount,
        }
        .into()
    }

    pub fn path_payment(
        destination: AccountId,
        send_asset: Asset,
        dest_asset: Asset,
        mode: PathMode,
        path: Option<Vec<Asset>>,
    ) -> Self {
        OperationBody::PathPayment {
            destination,
            send_asset,
            dest_asset,
            mode,
            path,
        }
        .into()
    }

    pub fn create_trust_line(asset: Asset, limit: u64) -> Self {
        OperationBody::CreateTrustLine { asset, limit }.into()
    }

    pub fn remove_trust_line(asset: Asset) -> Self {
        OperationBody::RemoveTrustLine { asset }.into()
    }

    pub fn set_signer(signer: PublicKey, weight: u8) -> Self {
        OperationBody::SetSigner { signer, weight }.into()
    }

    pub fn set_thresholds(
        master_weight: Option<u8>,
        low: Option<u8>,
        medium: Option<u8>,
        high: Option<u8>,
    ) -> Self {
        OperationBody::SetThresholds {
            master_weight,
            low,
            medium,
            high,
        }
        .into()
    }

    pub fn set_flags(set: AccountFlags, clear: AccountFlags) -> Self {
        OperationBody::SetFlags { set, clear }.into()
    }

    pub fn manage_offer(
        offer_id: Option<OfferId>,
        selling: Asset,
        buying: Asset,
        amount: u64,
        price: Price,
    ) -> Self {
        OperationBody::ManageOffer {
            offer_id,
            selling,
            buying,
            amount,
            price,
        }
        .into()
    }

    pub fn manage_data(name: &str, value: Option<Vec<u8>>) -> Self {
        OperationBody::ManageData {
            name: name.to_string(),
            value,
        }
        .into()
    }

    pub fn auth_class(&self) -> AuthClass {
        self.body.auth_class()
    }

    /// The account this operation acts on behalf of.
    pub fn effective_source(&self, tx_source: &AccountId) -> AccountId {
        self.source_account.unwrap_or(*tx_source)
    }

    /// Checks that need nothing but the operation itself and its
    /// effective source.
    pub fn validate(&self, source: &AccountId) -> Result<(), TransactionError> {
        let kind = self.body.kind();
        let invalid = |msg: &str| Err(TransactionError::invalid(format!("{}: {}", kind, msg)));

        match &self.body {
            OperationBody::CreateAccount {
                destination,
                starting_balance,
            } => {
                if destination == source {
                    return invalid("destination is the source account");
                }
                if *starting_balance == 0 {
                    return invalid("starting balance must be positive");
                }
            }
            OperationBody::Payment {
                destination,
                amount,
                ..
            } => {
                if *amount == 0 {
                    return invalid("amount must be positive");
                }
                if destination == source {
                    return invalid("payment to self");
                }
            }
            OperationBody::PathPayment {
                destination,
                send_asset,
                dest_asset,
                mode,
                ..
            } => {
                let (fixed, bound) = match *mode {
                    PathMode::StrictSend {
                        send_amount,
                        min_receive,
                    } => (send_amount, min_receive),
                    PathMode::StrictReceive {
                        dest_amount,
                        max_send,
                    } => (dest_amount, max_send),
                };
                if fixed == 0 || bound == 0 {
                    return invalid("amounts must be positive");
                }
                if destination == source && send_asset == dest_asset {
                    return invalid("path payment to self in the same asset");
                }
            }
            OperationBody::CreateTrustLine { asset, .. } => {
                if asset.is_native() {
                    return invalid("the native asset needs no trustline");
                }
                if asset.is_issued_by(source) {
                    return invalid("issuers cannot trust their own asset");
                }
            }
            OperationBody::RemoveTrustLine { asset } => {
                if asset.is_native() {
                    return invalid("the native asset has no trustline");
                }
            }
            OperationBody::SetSigner { signer, .. } => {
                if signer == source {
                    return invalid("the master key is configured through master_weight");
                }
            }
            OperationBody::SetThresholds {
                master_weight,
                low,
                medium,
                high,
            } => {
                if master_weight.is_none() && low.is_none() && medium.is_none() && high.is_none()
                {
                    return invalid("nothing to change");
                }
            }
            OperationBody::SetFlags { set, clear } => {
                if set.intersects(clear) {
                    return invalid("a flag cannot be both set and cleared");
                }
                if set.is_empty() && clear.is_empty() {
                    return invalid("nothing to change");
                }
            }
            OperationBody::ManageOffer {
                offer_id,
                selling,
                buying,
                amount,
                ..
            } => {
                if selling == buying {
                    return invalid("selling and buying the same asset");
                }
                if offer_id.is_none() && *amount == 0 {
                    return invalid("new offers need a positive amount");
                }
            }
            OperationBody::ManageData { name, value } => {
                if name.is_empty() || name.len() > MAX_DATA_NAME_LENGTH {
                    return invalid("data name must be 1-64 bytes");
                }
                if value.as_ref().is_some_and(|v| v.len() > MAX_DATA_VALUE_LENGTH) {
                    return invalid("data value exceeds 64 bytes");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    fn key(seed: u8) -> AccountId {
        Keypair::from_seed(&[seed; 32]).public_key()
    }

    fn usd() -> Asset {
        Asset::issued("USD", key(50)).unwrap()
    }

    #[test]
    fn classes_follow_operation_kind() {
        assert_eq!(Operation::payment(key(2), usd(), 1).auth_class(), AuthClass::Medium);
        assert_eq!(Operation::create_trust_line(usd(), 1).auth_class(), AuthClass::Medium);
        assert_eq!(Operation::set_signer(key(2), 1).auth_class(), AuthClass::High);
        assert_eq!(
            Operation::set_thresholds(Some(1), None, None, None).auth_class(),
            AuthClass::High
        );
        assert_eq!(Operation::manage_data("k", None).auth_class(), AuthClass::Low);
    }

    #[test]
    fn effective_source_defaults_to_transaction() {
        let op = Operation::payment(key(2), usd(), 1);
        assert_eq!(op.effective_source(&key(1)), key(1));
        let op = op.with_source(key(3));
        assert_eq!(op.effective_source(&key(1)), key(3));
    }

    #[test]
    fn structural_checks() {
        let me = key(1);
        assert!(Operation::payment(key(2), usd(), 0).validate(&me).is_err());
        assert!(Operation::payment(me, Asset::native(), 5).validate(&me).is_err());
        assert!(Operation::create_trust_line(Asset::native(), 5).validate(&me).is_err());
        assert!(Operation::create_trust_line(usd(), 5).validate(&key(50)).is_err());
        assert!(Operation::set_signer(me, 1).validate(&me).is_err());
        assert!(Operation::manage_data("", None).validate(&me).is_err());
        assert!(Operation::manage_data(&"x".repeat(65), None).validate(&me).is_err());
        assert!(Operation::manage_data("foo", Some(vec![0; 65])).validate(&me).is_err());
        assert!(Operation::manage_data("foo", Some(b"bar".to_vec())).validate(&me).is_ok());

        let both: AccountFlags = "auth_revocable".parse().unwrap();
        match Operation::set_flags(both, both).validate(&me) {
            Err(TransactionError::InvalidOperation(_)) => {}
            other => panic!("expected InvalidOperation, got {:?}", other),
        }
    }

    #[test]
    fn json_shape_is_tagged() {
        let op = Operation::create_trust_line(usd(), 10);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["body"]["type"], "create_trust_line");
        assert!(json.get("source_account").is_none());
        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }
}
