//! Resting offers, taker orders and the trades produced by crossing them.

use serde::{Deserialize, Serialize};

use super::price::Price;
use crate::asset::Asset;
use crate::crypto::keys::AccountId;

/// Offer ids are allocated monotonically by the order book, so a lower id
/// always means an earlier offer. That makes the id the time-priority key.
pub type OfferId = u64;

/// A resting offer: `seller` sells up to `amount` of `selling` in exchange
/// for `buying` at `price` buying units per selling unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub seller: AccountId,
    pub selling: Asset,
    pub buying: Asset,
    /// Remaining amount of `selling`. Always positive while in the book.
    pub amount: u64,
    pub price: Price,
}

impl Offer {
    /// What a taker pays (in `buying`) to take `amount` of this offer.
    pub fn cost_of(&self, amount: u64) -> Option<u64> {
        self.price.cost_of(amount)
    }
}

/// An incoming order to be matched against the book. Shaped like an
/// offer: the taker sells `amount` of `selling` for `buying`, asking at
/// least `price` buying units per selling unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakerOrder {
    pub account: AccountId,
    pub selling: Asset,
    pub buying: Asset,
    pub amount: u64,
    pub price: Price,
    /// Discard, rather than rest, whatever does not fill immediately.
    pub immediate_or_cancel: bool,
}

/// One crossing between a taker and a resting offer.
///
/// Amounts are from the maker's point of view: the maker gave
/// `sold_amount` of `sold_asset` and received `bought_amount` of
/// `bought_asset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub offer_id: OfferId,
    pub seller: AccountId,
    pub sold_asset: Asset,
    pub sold_amount: u64,
    pub bought_asset: Asset,
    pub bought_amount: u64,
}

/// Outcome of [`super::OrderBook::match_offer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub trades: Vec<Trade>,
    /// Total `selling` the taker gave up.
    pub sold: u64,
    /// Total `buying` the taker received.
    pub bought: u64,
    /// Unfilled `selling` amount left over after matching.
    pub remaining: u64,
    /// Id of the resting offer created from the remainder, if any.
    pub resting: Option<OfferId>,
}

impl MatchResult {
    pub fn fully_filled(&self) -> bool {
        self.remaining == 0
    }
}
