//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] collects a source account, its current
//! sequence number, operations, an optional memo and optional time bounds,
//! then validates everything against a [`LedgerSnapshot`] and produces an
//! unsigned [`Transaction`] whose hash is derived from its contents.
//!
//! The builder does not sign. That happens in [`super::signing`], and
//! authorization in [`super::verification`]. Building is a pure function
//! of the builder state and the snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::error::TransactionError;
use super::operation::{Operation, OperationBody};
use super::types::{hex32, Memo, TimeBounds};
use crate::account::AuthClass;
use crate::asset::TrustLineError;
use crate::config::{
    EngineConfig, BASE_RESERVE_ENTRIES, MAX_MEMO_TEXT_LENGTH, MAX_OPERATIONS_PER_TX,
};
use crate::crypto::hash::sha256_concat;
use crate::crypto::keys::AccountId;
use crate::dex::{OrderBookError, PathMode, PathRequest, PathResolver};
use crate::ledger::LedgerSnapshot;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned, validated transaction.
///
/// `hash` is the SHA-256 of [`Transaction::signable_bytes`] and is what
/// every signer signs. It depends on the network id, so the same operations
/// built for two networks never share a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: AccountId,
    /// Exactly the source account's sequence plus one.
    pub sequence: u64,
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<Memo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_bounds: Option<TimeBounds>,
    #[serde(with = "hex32")]
    pub network_id: [u8; 32],
    #[serde(with = "hex32")]
    pub hash: [u8; 32],
}

impl Transaction {
    /// Canonical bytes covered by the hash.
    ///
    /// Header fields are hand-encoded with fixed-width little-endian
    /// integers and presence flags; the operation list goes through bincode.
    /// `hash` itself is excluded.
    pub fn signable_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(&self.network_id);
        buf.extend_from_slice(self.source.as_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());

        match &self.memo {
            None => buf.push(0x00),
            Some(memo) => {
                buf.push(memo.tag());
                match memo {
                    Memo::Text(text) => {
                        buf.extend_from_slice(&(text.len() as u32).to_le_bytes());
                        buf.extend_from_slice(text.as_bytes());
                    }
                    Memo::Id(id) => buf.extend_from_slice(&id.to_le_bytes()),
                }
            }
        }

        match &self.time_bounds {
            None => buf.push(0x00),
            Some(tb) => {
                buf.push(0x01);
                buf.extend_from_slice(&tb.min_time.to_le_bytes());
                buf.extend_from_slice(&tb.max_time.to_le_bytes());
            }
        }

        buf.extend_from_slice(&(self.operations.len() as u32).to_le_bytes());
        buf.extend_from_slice(&bincode::serialize(&self.operations)?);

        Ok(buf)
    }

    /// Recompute the hash from the current field values.
    pub fn compute_hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(sha256_concat(&[&self.signable_bytes()?]))
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Required class per distinct effective source account. The
    /// transaction source needs at least `Low` since it consumes the
    /// sequence number.
    pub fn required_classes(&self) -> BTreeMap<AccountId, AuthClass> {
        let mut classes = BTreeMap::new();
        classes.insert(self.source, AuthClass::Low);
        for op in &self.operations {
            let account = op.effective_source(&self.source);
            let class = op.auth_class();
            classes
                .entry(account)
                .and_modify(|c: &mut AuthClass| *c = (*c).max(class))
                .or_insert(class);
        }
        classes
    }

    /// The highest class among all operations.
    pub fn required_class(&self) -> AuthClass {
        self.operations
            .iter()
            .map(Operation::auth_class)
            .max()
            .unwrap_or(AuthClass::Low)
    }

    /// Reject `now` outside the half-open window `[min_time, max_time)`.
    pub fn check_time_bounds(&self, now: i64) -> Result<(), TransactionError> {
        match self.time_bounds {
            Some(tb) if !tb.contains(now) => Err(TransactionError::OutsideTimeBounds {
                now,
                min_time: tb.min_time,
                max_time: tb.max_time,
            }),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// ```rust,no_run
/// use lumen_protocol::crypto::Keypair;
/// use lumen_protocol::ledger::LedgerSnapshot;
/// use lumen_protocol::transaction::{Operation, TransactionBuilder};
/// use lumen_protocol::asset::Asset;
///
/// let alice = Keypair::generate().public_key();
/// let bob = Keypair::generate().public_key();
/// let snapshot = LedgerSnapshot::default();
///
/// let tx = TransactionBuilder::new(alice, 0)
///     .operation(Operation::payment(bob, Asset::native(), 100_000_000))
///     .memo_text("rent")
///     .build(&snapshot);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: AccountId,
    current_sequence: u64,
    config: EngineConfig,
    operations: Vec<Operation>,
    memo_text: Option<String>,
    memo_id: Option<u64>,
    time_bounds: Option<TimeBounds>,
}

impl TransactionBuilder {
    /// `current_sequence` is the source account's sequence as the caller
    /// last saw it. The built transaction uses `current_sequence + 1`.
    pub fn new(source: AccountId, current_sequence: u64) -> Self {
        Self {
            source,
            current_sequence,
            config: EngineConfig::default(),
            operations: Vec::new(),
            memo_text: None,
            memo_id: None,
            time_bounds: None,
        }
    }

    /// Network and path-search settings. Defaults to the test network.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn operation(mut self, op: impl Into<Operation>) -> Self {
        self.operations.push(op.into());
        self
    }

    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    pub fn memo_text(mut self, text: &str) -> Self {
        self.memo_text = Some(text.to_string());
        self
    }

    pub fn memo_id(mut self, id: u64) -> Self {
        self.memo_id = Some(id);
        self
    }

    /// Unix seconds, half-open.
    pub fn time_bounds(mut self, min_time: i64, max_time: i64) -> Self {
        self.time_bounds = Some(TimeBounds::new(min_time, max_time));
        self
    }

    /// Validate against `snapshot` and produce an unsigned transaction.
    pub fn build(self, snapshot: &LedgerSnapshot) -> Result<Transaction, TransactionError> {
        if self.operations.is_empty() {
            return Err(TransactionError::invalid("transaction has no operations"));
        }
        if self.operations.len() > MAX_OPERATIONS_PER_TX {
            return Err(TransactionError::invalid(format!(
                "transaction has {} operations, limit is {}",
                self.operations.len(),
                MAX_OPERATIONS_PER_TX
            )));
        }

        let account = snapshot
            .account(&self.source)
            .ok_or(TransactionError::AccountNotFound(self.source))?;
        if account.sequence != self.current_sequence {
            return Err(TransactionError::BadSequence {
                account: self.source,
                expected: account.sequence,
                got: self.current_sequence,
            });
        }
        let sequence = self
            .current_sequence
            .checked_add(1)
            .ok_or_else(|| TransactionError::invalid("sequence number exhausted"))?;

        let memo = match (self.memo_text, self.memo_id) {
            (Some(_), Some(_)) => {
                return Err(TransactionError::invalid(
                    "memo text and memo id are mutually exclusive",
                ))
            }
            (Some(text), None) => {
                if text.len() > MAX_MEMO_TEXT_LENGTH {
                    return Err(TransactionError::invalid(format!(
                        "memo text is {} bytes, limit is {}",
                        text.len(),
                        MAX_MEMO_TEXT_LENGTH
                    )));
                }
                Some(Memo::Text(text))
            }
            (None, Some(id)) => Some(Memo::Id(id)),
            (None, None) => None,
        };

        if let Some(tb) = self.time_bounds {
            if !tb.is_well_formed() {
                return Err(TransactionError::invalid(format!(
                    "time bounds {} are empty: min_time must be below max_time",
                    tb
                )));
            }
        }

        for op in &self.operations {
            let source = op.effective_source(&self.source);
            op.validate(&source)?;
            check_against_snapshot(op, &source, snapshot, &self.config)?;
        }

        let mut tx = Transaction {
            source: self.source,
            sequence,
            operations: self.operations,
            memo,
            time_bounds: self.time_bounds,
            network_id: self.config.network_id(),
            hash: [0u8; 32],
        };
        tx.hash = tx.compute_hash()?;

        debug!(
            hash = %tx.hash_hex(),
            source = %tx.source,
            sequence = tx.sequence,
            operations = tx.operations.len(),
            class = %tx.required_class(),
            "built transaction"
        );
        Ok(tx)
    }
}

/// Fail-fast checks that need ledger state. Each operation is checked
/// against the snapshot as given; effects of earlier operations in the same
/// transaction are not simulated here.
fn check_against_snapshot(
    op: &Operation,
    source: &AccountId,
    snapshot: &LedgerSnapshot,
    config: &EngineConfig,
) -> Result<(), TransactionError> {
    if snapshot.account(source).is_none() {
        return Err(TransactionError::AccountNotFound(*source));
    }

    match &op.body {
        OperationBody::CreateAccount {
            destination,
            starting_balance,
        } => {
            if snapshot.account(destination).is_some() {
                return Err(TransactionError::AccountExists(*destination));
            }
            let minimum = BASE_RESERVE_ENTRIES.saturating_mul(snapshot.base_reserve());
            if *starting_balance < minimum {
                return Err(TransactionError::invalid(format!(
                    "create_account: starting balance {} is below the minimum {}",
                    starting_balance, minimum
                )));
            }
        }
        OperationBody::Payment {
            destination,
            asset,
            amount,
        } => {
            if snapshot.account(destination).is_none() {
                return Err(TransactionError::AccountNotFound(*destination));
            }
            snapshot.check_receive(destination, asset, *amount)?;
        }
        OperationBody::PathPayment {
            destination,
            send_asset,
            dest_asset,
            mode,
            path,
        } => {
            if snapshot.account(destination).is_none() {
                return Err(TransactionError::AccountNotFound(*destination));
            }
            let request = PathRequest {
                source_asset: send_asset.clone(),
                dest_asset: dest_asset.clone(),
                mode: *mode,
                explicit_path: path.clone(),
            };
            let book = snapshot.funded_order_book()?;
            let resolved = PathResolver::with_config(&book, config).find_path(&request)?;
            debug!(
                from = %send_asset,
                to = %dest_asset,
                hops = resolved.hop_count(),
                source_amount = resolved.source_amount,
                dest_amount = resolved.dest_amount,
                "path payment priced"
            );
            let delivered = match mode {
                PathMode::StrictSend { .. } => resolved.dest_amount,
                PathMode::StrictReceive { dest_amount, .. } => *dest_amount,
            };
            snapshot.check_receive(destination, dest_asset, delivered)?;
        }
        OperationBody::CreateTrustLine { asset, limit } => {
            if let Some(issuer) = asset.issuer() {
                if snapshot.account(issuer).is_none() {
                    return Err(TransactionError::AccountNotFound(*issuer));
                }
            }
            if let Some(tl) = snapshot.trustline(source, asset) {
                if *limit < tl.balance {
                    return Err(TrustLineError::LimitBelowBalance {
                        asset: asset.clone(),
                        limit: *limit,
                        balance: tl.balance,
                    }
                    .into());
                }
            }
        }
        OperationBody::RemoveTrustLine { asset } => match snapshot.trustline(source, asset) {
            Some(tl) => tl.check_removable()?,
            None => {
                return Err(TransactionError::invalid(format!(
                    "remove_trust_line: {} has no trustline to {}",
                    source, asset
                )))
            }
        },
        OperationBody::ManageOffer {
            offer_id: Some(id),
            selling,
            buying,
            ..
        } => {
            let offer = snapshot
                .order_book()
                .get(*id)
                .ok_or(OrderBookError::OfferNotFound(*id))?;
            if &offer.seller != source {
                return Err(TransactionError::invalid(format!(
                    "manage_offer: offer {} is not owned by {}",
                    id, source
                )));
            }
            if &offer.selling != selling || &offer.buying != buying {
                return Err(TransactionError::invalid(format!(
                    "manage_offer: offer {} trades {} for {}, not {} for {}",
                    id, offer.selling, offer.buying, selling, buying
                )));
            }
        }
        OperationBody::ManageOffer { offer_id: None, .. }
        | OperationBody::SetSigner { .. }
        | OperationBody::SetThresholds { .. }
        | OperationBody::SetFlags { .. }
        | OperationBody::ManageData { .. } => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::asset::{Asset, TrustLine};
    use crate::config::PUBLIC_NETWORK_PASSPHRASE;
    use crate::crypto::keys::Keypair;
    use crate::dex::{PathError, Price};

    const RESERVE: u64 = 100;

    fn key(seed: u8) -> AccountId {
        Keypair::from_seed(&[seed; 32]).public_key()
    }

    fn usd() -> Asset {
        Asset::issued("USD", key(9)).unwrap()
    }

    fn eur() -> Asset {
        Asset::issued("EUR", key(9)).unwrap()
    }

    /// Alice (1) and Bob (2) funded; issuer (9); Bob trusts USD up to 1000.
    fn snapshot() -> LedgerSnapshot {
        let mut snap = LedgerSnapshot::new(RESERVE);
        for seed in [1, 2, 9] {
            snap.insert_account(Account::new(key(seed), 100_000, RESERVE));
        }
        snap.insert_trustline(TrustLine::new(key(2), usd(), 1000, true));
        snap
    }

    fn pay_bob(amount: u64) -> Operation {
        Operation::payment(key(2), Asset::native(), amount)
    }

    #[test]
    fn builds_with_next_sequence_and_stable_hash() {
        let snap = snapshot();
        let tx1 = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(10))
            .build(&snap)
            .unwrap();
        let tx2 = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(10))
            .build(&snap)
            .unwrap();
        assert_eq!(tx1.sequence, 1);
        assert_eq!(tx1.hash, tx2.hash);
        assert_eq!(tx1.hash, tx1.compute_hash().unwrap());
        assert_eq!(tx1.hash_hex().len(), 64);
    }

    #[test]
    fn hash_covers_network_memo_and_operations() {
        let snap = snapshot();
        let base = TransactionBuilder::new(key(1), 0).operation(pay_bob(10));
        let plain = base.clone().build(&snap).unwrap();
        let memo = base.clone().memo_id(7).build(&snap).unwrap();
        let public = base
            .clone()
            .config(EngineConfig {
                network_passphrase: PUBLIC_NETWORK_PASSPHRASE.into(),
                ..EngineConfig::default()
            })
            .build(&snap)
            .unwrap();
        let other = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(11))
            .build(&snap)
            .unwrap();
        assert_ne!(plain.hash, memo.hash);
        assert_ne!(plain.hash, public.hash);
        assert_ne!(plain.hash, other.hash);
    }

    #[test]
    fn operation_count_limits() {
        let snap = snapshot();
        assert!(matches!(
            TransactionBuilder::new(key(1), 0).build(&snap),
            Err(TransactionError::InvalidOperation(_))
        ));
        let many = (0..101).map(|_| pay_bob(1));
        assert!(matches!(
            TransactionBuilder::new(key(1), 0).operations(many).build(&snap),
            Err(TransactionError::InvalidOperation(_))
        ));
        let hundred = (0..100).map(|_| pay_bob(1));
        assert!(TransactionBuilder::new(key(1), 0)
            .operations(hundred)
            .build(&snap)
            .is_ok());
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let mut snap = snapshot();
        snap.account_mut(&key(1)).unwrap().sequence = 5;
        match TransactionBuilder::new(key(1), 4).operation(pay_bob(1)).build(&snap) {
            Err(TransactionError::BadSequence { expected, got, .. }) => {
                assert_eq!((expected, got), (5, 4));
            }
            other => panic!("expected BadSequence, got {:?}", other),
        }
        let tx = TransactionBuilder::new(key(1), 5)
            .operation(pay_bob(1))
            .build(&snap)
            .unwrap();
        assert_eq!(tx.sequence, 6);
    }

    #[test]
    fn memo_rules() {
        let snap = snapshot();
        let both = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(1))
            .memo_text("hi")
            .memo_id(1)
            .build(&snap);
        assert!(matches!(both, Err(TransactionError::InvalidOperation(_))));

        let long = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(1))
            .memo_text(&"x".repeat(29))
            .build(&snap);
        assert!(matches!(long, Err(TransactionError::InvalidOperation(_))));

        let ok = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(1))
            .memo_text(&"x".repeat(28))
            .build(&snap)
            .unwrap();
        assert_eq!(ok.memo, Some(Memo::Text("x".repeat(28))));
    }

    #[test]
    fn time_bounds_must_be_ordered() {
        let snap = snapshot();
        for (min, max) in [(10, 10), (20, 10)] {
            let res = TransactionBuilder::new(key(1), 0)
                .operation(pay_bob(1))
                .time_bounds(min, max)
                .build(&snap);
            assert!(matches!(res, Err(TransactionError::InvalidOperation(_))));
        }
        let tx = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(1))
            .time_bounds(10, 20)
            .build(&snap)
            .unwrap();
        assert!(tx.check_time_bounds(9).is_err());
        assert!(tx.check_time_bounds(10).is_ok());
        assert!(tx.check_time_bounds(19).is_ok());
        assert!(matches!(
            tx.check_time_bounds(20),
            Err(TransactionError::OutsideTimeBounds { now: 20, .. })
        ));
    }

    #[test]
    fn destination_must_exist_and_have_capacity() {
        let snap = snapshot();
        let res = TransactionBuilder::new(key(1), 0)
            .operation(Operation::payment(key(3), Asset::native(), 1))
            .build(&snap);
        assert!(matches!(res, Err(TransactionError::AccountNotFound(_))));

        let res = TransactionBuilder::new(key(9), 0)
            .operation(Operation::payment(key(2), usd(), 1001))
            .build(&snap);
        assert!(matches!(
            res,
            Err(TransactionError::TrustLine(TrustLineError::CapacityExceeded {
                available: 1000,
                ..
            }))
        ));

        // Alice holds no EUR trustline.
        let res = TransactionBuilder::new(key(9), 0)
            .operation(Operation::payment(key(1), eur(), 1))
            .build(&snap);
        assert!(matches!(res, Err(TransactionError::TrustLine(_))));
    }

    #[test]
    fn create_account_checks() {
        let snap = snapshot();
        let exists = TransactionBuilder::new(key(1), 0)
            .operation(Operation::create_account(key(2), 1000))
            .build(&snap);
        assert!(matches!(exists, Err(TransactionError::AccountExists(_))));

        let small = TransactionBuilder::new(key(1), 0)
            .operation(Operation::create_account(key(3), 2 * RESERVE - 1))
            .build(&snap);
        assert!(matches!(small, Err(TransactionError::InvalidOperation(_))));

        assert!(TransactionBuilder::new(key(1), 0)
            .operation(Operation::create_account(key(3), 2 * RESERVE))
            .build(&snap)
            .is_ok());
    }

    #[test]
    fn huge_base_reserve_saturates_the_minimum() {
        let mut snap = LedgerSnapshot::new(u64::MAX);
        snap.insert_account(Account::new(key(1), u64::MAX, u64::MAX));
        let res = TransactionBuilder::new(key(1), 0)
            .operation(Operation::create_account(key(3), u64::MAX - 1))
            .build(&snap);
        assert!(matches!(res, Err(TransactionError::InvalidOperation(_))));
    }

    #[test]
    fn remove_trustline_with_balance_fails_fast() {
        let mut snap = snapshot();
        snap.trustline_mut(&key(2), &usd()).unwrap().balance = 5;
        let res = TransactionBuilder::new(key(2), 0)
            .operation(Operation::remove_trust_line(usd()))
            .build(&snap);
        assert!(matches!(
            res,
            Err(TransactionError::TrustLine(TrustLineError::NonZeroBalance { balance: 5, .. }))
        ));

        let missing = TransactionBuilder::new(key(2), 0)
            .operation(Operation::remove_trust_line(eur()))
            .build(&snap);
        assert!(matches!(missing, Err(TransactionError::InvalidOperation(_))));
    }

    #[test]
    fn manage_offer_must_own_the_offer() {
        let mut snap = snapshot();
        let id = snap
            .order_book_mut()
            .insert(key(2), usd(), Asset::native(), 10, Price::one())
            .unwrap();

        let stranger = TransactionBuilder::new(key(1), 0)
            .operation(Operation::manage_offer(
                Some(id),
                usd(),
                Asset::native(),
                5,
                Price::one(),
            ))
            .build(&snap);
        assert!(matches!(stranger, Err(TransactionError::InvalidOperation(_))));

        let unknown = TransactionBuilder::new(key(2), 0)
            .operation(Operation::manage_offer(
                Some(id + 1),
                usd(),
                Asset::native(),
                5,
                Price::one(),
            ))
            .build(&snap);
        assert!(matches!(
            unknown,
            Err(TransactionError::OrderBook(OrderBookError::OfferNotFound(_)))
        ));

        assert!(TransactionBuilder::new(key(2), 0)
            .operation(Operation::manage_offer(
                Some(id),
                usd(),
                Asset::native(),
                0,
                Price::one(),
            ))
            .build(&snap)
            .is_ok());
    }

    #[test]
    fn path_payment_without_liquidity_fails() {
        let snap = snapshot();
        let res = TransactionBuilder::new(key(1), 0)
            .operation(Operation::path_payment(
                key(2),
                Asset::native(),
                usd(),
                PathMode::StrictReceive {
                    dest_amount: 10,
                    max_send: 100,
                },
                None,
            ))
            .build(&snap);
        assert!(matches!(
            res,
            Err(TransactionError::Path(PathError::NoPathFound { .. }))
        ));
    }

    #[test]
    fn required_classes_per_source() {
        let snap = snapshot();
        let tx = TransactionBuilder::new(key(1), 0)
            .operation(Operation::manage_data("k", Some(b"v".to_vec())))
            .operation(Operation::set_signer(key(3), 1).with_source(key(2)))
            .build(&snap)
            .unwrap();
        let classes = tx.required_classes();
        assert_eq!(classes[&key(1)], AuthClass::Low);
        assert_eq!(classes[&key(2)], AuthClass::High);
        assert_eq!(tx.required_class(), AuthClass::High);

        // The source still needs `Low` when every op names another account.
        let tx = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(1).with_source(key(9)))
            .build(&snap)
            .unwrap();
        let classes = tx.required_classes();
        assert_eq!(classes[&key(1)], AuthClass::Low);
        assert_eq!(classes[&key(9)], AuthClass::Medium);
    }

    #[test]
    fn json_roundtrip_preserves_hash() {
        let snap = snapshot();
        let tx = TransactionBuilder::new(key(1), 0)
            .operation(pay_bob(10))
            .memo_text("rent")
            .time_bounds(0, 100)
            .build(&snap)
            .unwrap();
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(back.compute_hash().unwrap(), tx.hash);
    }
}
