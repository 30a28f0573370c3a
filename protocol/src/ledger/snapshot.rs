//! Point-in-time ledger state.
//!
//! A [`LedgerSnapshot`] is a plain value: accounts, trustlines and the
//! order book as of one ledger sequence. The builder and the evaluator only
//! ever read it; [`super::apply_transaction`] produces a new one.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::account::Account;
use crate::asset::{Asset, TrustLine, TrustLineError};
use crate::config::DEFAULT_BASE_RESERVE;
use crate::crypto::keys::AccountId;
use crate::dex::{OfferId, OrderBook, OrderBookError};

/// Failures loading a snapshot from its serialized form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("account {0} appears more than once")]
    DuplicateAccount(AccountId),

    #[error("trustline {holder} -> {asset} appears more than once")]
    DuplicateTrustLine { holder: AccountId, asset: Asset },

    #[error("trustline {holder} -> {asset} references a missing account")]
    DanglingTrustLine { holder: AccountId, asset: Asset },

    #[error("trustline {holder} -> {asset} holds {balance} above its limit {limit}")]
    OverLimit {
        holder: AccountId,
        asset: Asset,
        balance: u64,
        limit: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr", into = "SnapshotRepr")]
pub struct LedgerSnapshot {
    ledger_sequence: u64,
    base_reserve: u64,
    accounts: BTreeMap<AccountId, Account>,
    trustlines: BTreeMap<(AccountId, Asset), TrustLine>,
    order_book: OrderBook,
}

#[derive(Serialize, Deserialize)]
struct SnapshotRepr {
    ledger_sequence: u64,
    #[serde(default = "default_base_reserve")]
    base_reserve: u64,
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    trustlines: Vec<TrustLine>,
    #[serde(default)]
    order_book: OrderBook,
}

fn default_base_reserve() -> u64 {
    DEFAULT_BASE_RESERVE
}

impl TryFrom<SnapshotRepr> for LedgerSnapshot {
    type Error = SnapshotError;

    fn try_from(repr: SnapshotRepr) -> Result<Self, Self::Error> {
        let mut snapshot = LedgerSnapshot::new(repr.base_reserve);
        snapshot.ledger_sequence = repr.ledger_sequence;
        snapshot.order_book = repr.order_book;

        for account in repr.accounts {
            if snapshot.accounts.contains_key(&account.id) {
                return Err(SnapshotError::DuplicateAccount(account.id));
            }
            snapshot.accounts.insert(account.id, account);
        }
        for tl in repr.trustlines {
            let key = (tl.holder, tl.asset.clone());
            if snapshot.trustlines.contains_key(&key) {
                return Err(SnapshotError::DuplicateTrustLine {
                    holder: tl.holder,
                    asset: tl.asset,
                });
            }
            if !snapshot.accounts.contains_key(&tl.holder) {
                return Err(SnapshotError::DanglingTrustLine {
                    holder: tl.holder,
                    asset: tl.asset,
                });
            }
            if tl.balance > tl.limit {
                return Err(SnapshotError::OverLimit {
                    holder: tl.holder,
                    asset: tl.asset,
                    balance: tl.balance,
                    limit: tl.limit,
                });
            }
            snapshot.trustlines.insert(key, tl);
        }
        Ok(snapshot)
    }
}

impl From<LedgerSnapshot> for SnapshotRepr {
    fn from(snapshot: LedgerSnapshot) -> Self {
        Self {
            ledger_sequence: snapshot.ledger_sequence,
            base_reserve: snapshot.base_reserve,
            accounts: snapshot.accounts.into_values().collect(),
            trustlines: snapshot.trustlines.into_values().collect(),
            order_book: snapshot.order_book,
        }
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_RESERVE)
    }
}

impl LedgerSnapshot {
    pub fn new(base_reserve: u64) -> Self {
        Self {
            ledger_sequence: 1,
            base_reserve,
            accounts: BTreeMap::new(),
            trustlines: BTreeMap::new(),
            order_book: OrderBook::new(),
        }
    }

    pub fn ledger_sequence(&self) -> u64 {
        self.ledger_sequence
    }

    pub(crate) fn bump_ledger_sequence(&mut self) {
        self.ledger_sequence += 1;
    }

    pub fn base_reserve(&self) -> u64 {
        self.base_reserve
    }

    // -- accounts ----------------------------------------------------------

    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn account_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    /// Insert or replace an account.
    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    // -- trustlines --------------------------------------------------------

    pub fn trustline(&self, holder: &AccountId, asset: &Asset) -> Option<&TrustLine> {
        self.trustlines.get(&(*holder, asset.clone()))
    }

    pub fn trustline_mut(&mut self, holder: &AccountId, asset: &Asset) -> Option<&mut TrustLine> {
        self.trustlines.get_mut(&(*holder, asset.clone()))
    }

    /// Insert or replace a trustline.
    pub fn insert_trustline(&mut self, trustline: TrustLine) {
        self.trustlines
            .insert((trustline.holder, trustline.asset.clone()), trustline);
    }

    pub fn remove_trustline(&mut self, holder: &AccountId, asset: &Asset) -> Option<TrustLine> {
        self.trustlines.remove(&(*holder, asset.clone()))
    }

    /// Trustlines held by `holder`, in asset order.
    pub fn trustlines_of<'a>(&'a self, holder: &'a AccountId) -> impl Iterator<Item = &'a TrustLine> {
        self.trustlines
            .values()
            .filter(move |tl| &tl.holder == holder)
    }

    // -- order book --------------------------------------------------------

    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    pub fn order_book_mut(&mut self) -> &mut OrderBook {
        &mut self.order_book
    }

    // -- derived views -----------------------------------------------------

    /// Signers, data entries, trustlines and offers owned by `id`.
    pub fn subentries(&self, id: &AccountId) -> u64 {
        let own = self.account(id).map(|a| a.own_subentries()).unwrap_or(0);
        own + self.external_subentries(id)
    }

    /// Trustlines and offers owned by `id`.
    pub fn external_subentries(&self, id: &AccountId) -> u64 {
        let trustlines = self.trustlines_of(id).count() as u64;
        let offers = self.order_book.offers_by_seller(id).len() as u64;
        trustlines + offers
    }

    /// Minimum native balance `id` must keep, or `None` if unknown.
    pub fn minimum_balance(&self, id: &AccountId) -> Option<u64> {
        self.account(id)
            .map(|a| a.minimum_balance(self.external_subentries(id)))
    }

    /// Balance of `asset` held by `id`. Issuers have no balance of their own
    /// asset (they mint and burn it), so they report `None`, as does an
    /// account without a trustline.
    pub fn balance(&self, id: &AccountId, asset: &Asset) -> Option<u64> {
        match asset {
            Asset::Native => self.account(id).map(|a| a.balance),
            _ if asset.is_issued_by(id) => None,
            _ => self.trustline(id, asset).map(|tl| tl.balance),
        }
    }

    /// How much of `asset` `id` could hand over right now. Native balance
    /// above the minimum balance, the trustline balance, or unbounded for
    /// the asset's issuer.
    pub fn sellable(&self, id: &AccountId, asset: &Asset) -> u64 {
        match asset {
            Asset::Native => match (self.account(id), self.minimum_balance(id)) {
                (Some(account), Some(minimum)) => account.balance.saturating_sub(minimum),
                _ => 0,
            },
            _ if asset.is_issued_by(id) => u64::MAX,
            _ => self.trustline(id, asset).map(|tl| tl.balance).unwrap_or(0),
        }
    }

    /// How much of `asset` `id` could take in right now.
    pub fn receivable(&self, id: &AccountId, asset: &Asset) -> u64 {
        match asset {
            Asset::Native => self
                .account(id)
                .map(|a| u64::MAX - a.balance)
                .unwrap_or(0),
            _ if asset.is_issued_by(id) => u64::MAX,
            _ => self
                .trustline(id, asset)
                .map(|tl| tl.available_capacity())
                .unwrap_or(0),
        }
    }

    /// Per offer, the amount its seller cannot back. `spare` is left out
    /// entirely.
    ///
    /// Offers are visited in id order. Each seller's sellable balance and
    /// receiving capacity are drawn down offer by offer, so several offers
    /// against one balance never promise more than it holds.
    fn unfunded_amounts(&self, spare: Option<OfferId>) -> Vec<(OfferId, u64)> {
        let mut offers: Vec<_> = self
            .order_book
            .iter()
            .filter(|o| Some(o.id) != spare)
            .collect();
        offers.sort_by_key(|o| o.id);

        let mut sell_left: HashMap<(AccountId, Asset), u64> = HashMap::new();
        let mut room_left: HashMap<(AccountId, Asset), u64> = HashMap::new();
        let mut cuts = Vec::new();

        for offer in offers {
            let sell = sell_left
                .entry((offer.seller, offer.selling.clone()))
                .or_insert_with(|| self.sellable(&offer.seller, &offer.selling));
            let room = room_left
                .entry((offer.seller, offer.buying.clone()))
                .or_insert_with(|| self.receivable(&offer.seller, &offer.buying));

            let keep = offer
                .amount
                .min(*sell)
                .min(offer.price.max_for_budget(*room));
            if keep < offer.amount {
                cuts.push((offer.id, offer.amount - keep));
            }
            *sell = sell.saturating_sub(keep);
            *room = room.saturating_sub(offer.cost_of(keep).unwrap_or(u64::MAX));
        }
        cuts
    }

    /// The order book cut down to what each seller can honour.
    pub fn funded_order_book(&self) -> Result<OrderBook, OrderBookError> {
        let mut book = self.order_book.clone();
        for (id, cut) in self.unfunded_amounts(None) {
            book.fill(id, cut)?;
        }
        Ok(book)
    }

    /// Shrink or drop offers their sellers can no longer back, except
    /// `spare`. Returns how many offers were touched.
    pub fn prune_unfunded_offers(&mut self, spare: Option<OfferId>) -> Result<usize, OrderBookError> {
        let cuts = self.unfunded_amounts(spare);
        for (id, cut) in &cuts {
            self.order_book.fill(*id, *cut)?;
        }
        Ok(cuts.len())
    }

    /// Whether `id` can receive `amount` of `asset`. Native payments and
    /// issuers receiving their own asset are never capacity-bounded.
    pub fn check_receive(
        &self,
        id: &AccountId,
        asset: &Asset,
        amount: u64,
    ) -> Result<(), TrustLineError> {
        if asset.is_native() || asset.is_issued_by(id) {
            return Ok(());
        }
        match self.trustline(id, asset) {
            Some(tl) => tl.check_credit(amount),
            None => Err(TrustLineError::CapacityExceeded {
                holder: *id,
                asset: asset.clone(),
                requested: amount,
                available: 0,
            }),
        }
    }
}
