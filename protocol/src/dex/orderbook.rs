//! Order book with price-time priority.
//!
//! One [`OrderBook`] holds every resting offer in the ledger. Offers are
//! grouped by unordered asset pair, then by direction, then by price level.
//! Within a level, offers queue in id order (ids are allocated
//! monotonically, so id order is creation order).
//!
//! ```text
//! pairs: {USD, EUR} ─┬─ forward (selling EUR, buying USD): 1.0 → [#3, #7], 2.0 → [#5]
//!                    └─ reverse (selling USD, buying EUR): 0.8 → [#4]
//! index: offer id → (pair, direction, price)
//! ```
//!
//! Lower price is better for the taker, so each direction iterates its
//! levels in ascending order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use thiserror::Error;
use tracing::debug;

use super::offer::{MatchResult, Offer, OfferId, TakerOrder, Trade};
use super::price::Price;
use crate::asset::Asset;
use crate::crypto::keys::AccountId;

/// Errors raised by order book mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderBookError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("offer amount must be positive")]
    ZeroAmount,

    #[error("an offer cannot sell and buy the same asset ({0})")]
    SameAsset(Asset),

    #[error("offer {0} not found")]
    OfferNotFound(OfferId),

    #[error("offer {0} appears more than once")]
    DuplicateOffer(OfferId),

    #[error("cannot take {requested} from offer {id}: only {available} remaining")]
    Overfill {
        id: OfferId,
        requested: u64,
        available: u64,
    },

    #[error("trade amount overflows")]
    AmountOverflow,

    #[error("offer ids exhausted")]
    OfferIdOverflow,

    /// The order would trade against its owner's resting offer.
    #[error("order would cross the seller's own offer {0}")]
    CrossesSelf(OfferId),
}

/// The unordered pair an offer trades on. `base < counter` always.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PairKey {
    base: Asset,
    counter: Asset,
}

/// Forward offers sell `base` for `counter`; reverse offers sell `counter`
/// for `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

type Levels = BTreeMap<Price, VecDeque<Offer>>;

#[derive(Debug, Clone, Default)]
struct PairBook {
    forward: Levels,
    reverse: Levels,
}

impl PairBook {
    fn side(&self, direction: Direction) -> &Levels {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    fn side_mut(&mut self, direction: Direction) -> &mut Levels {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Reverse => &mut self.reverse,
        }
    }

    fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse.is_empty()
    }
}

#[derive(Debug, Clone)]
struct OfferLocation {
    pair: PairKey,
    direction: Direction,
    price: Price,
}

fn locate(selling: &Asset, buying: &Asset) -> (PairKey, Direction) {
    if selling < buying {
        (
            PairKey {
                base: selling.clone(),
                counter: buying.clone(),
            },
            Direction::Forward,
        )
    } else {
        (
            PairKey {
                base: buying.clone(),
                counter: selling.clone(),
            },
            Direction::Reverse,
        )
    }
}

/// Every resting offer in the ledger, in matching priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "OrderBookRepr", into = "OrderBookRepr")]
pub struct OrderBook {
    pairs: BTreeMap<PairKey, PairBook>,
    index: HashMap<OfferId, OfferLocation>,
    next_id: OfferId,
}

/// On-disk form: a flat offer list plus the id counter.
#[derive(Serialize, Deserialize)]
struct OrderBookRepr {
    next_offer_id: OfferId,
    offers: Vec<Offer>,
}

impl TryFrom<OrderBookRepr> for OrderBook {
    type Error = OrderBookError;

    fn try_from(repr: OrderBookRepr) -> Result<Self, Self::Error> {
        let mut book = OrderBook::new();
        let mut offers = repr.offers;
        offers.sort_by_key(|o| o.id);
        for offer in offers {
            if offer.amount == 0 {
                return Err(OrderBookError::ZeroAmount);
            }
            if offer.selling == offer.buying {
                return Err(OrderBookError::SameAsset(offer.selling));
            }
            if book.index.contains_key(&offer.id) {
                return Err(OrderBookError::DuplicateOffer(offer.id));
            }
            let after = offer.id.checked_add(1).ok_or(OrderBookError::OfferIdOverflow)?;
            book.next_id = book.next_id.max(after);
            book.place(offer);
        }
        book.next_id = book.next_id.max(repr.next_offer_id);
        Ok(book)
    }
}

impl From<OrderBook> for OrderBookRepr {
    fn from(book: OrderBook) -> Self {
        let mut offers: Vec<Offer> = book.iter().cloned().collect();
        offers.sort_by_key(|o| o.id);
        Self {
            next_offer_id: book.next_id,
            offers,
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            pairs: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of resting offers.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The id the next inserted offer will receive.
    pub fn next_offer_id(&self) -> OfferId {
        self.next_id
    }

    fn levels(&self, selling: &Asset, buying: &Asset) -> Option<&Levels> {
        let (pair, direction) = locate(selling, buying);
        self.pairs.get(&pair).map(|book| book.side(direction))
    }

    /// Offers selling `selling` for `buying`, best price first, earlier
    /// offers first within a price.
    ///
    /// # Panics
    ///
    /// If a resting offer has zero remaining amount. Such an offer can only
    /// exist through a bug in this module.
    pub fn offers<'a>(
        &'a self,
        selling: &Asset,
        buying: &Asset,
    ) -> impl Iterator<Item = &'a Offer> + 'a {
        self.levels(selling, buying)
            .into_iter()
            .flat_map(|levels| levels.values().flat_map(|queue| queue.iter()))
            .inspect(|offer| {
                assert!(
                    offer.amount > 0,
                    "offer {} is resting with zero amount",
                    offer.id
                )
            })
    }

    /// `true` if anyone is selling `selling` for `buying`.
    pub fn has_offers(&self, selling: &Asset, buying: &Asset) -> bool {
        self.levels(selling, buying)
            .map(|levels| !levels.is_empty())
            .unwrap_or(false)
    }

    /// Best (lowest) price at which `selling` is offered for `buying`.
    pub fn best_price(&self, selling: &Asset, buying: &Asset) -> Option<Price> {
        self.levels(selling, buying)
            .and_then(|levels| levels.keys().next().copied())
    }

    /// Aggregated `(price, total amount)` for the best `limit` levels.
    pub fn depth(&self, selling: &Asset, buying: &Asset, limit: usize) -> Vec<(Price, u64)> {
        self.levels(selling, buying)
            .into_iter()
            .flat_map(|levels| levels.iter())
            .take(limit)
            .map(|(price, queue)| (*price, queue.iter().map(|o| o.amount).sum()))
            .collect()
    }

    /// Look up a resting offer.
    pub fn get(&self, id: OfferId) -> Option<&Offer> {
        let loc = self.index.get(&id)?;
        self.pairs
            .get(&loc.pair)?
            .side(loc.direction)
            .get(&loc.price)?
            .iter()
            .find(|o| o.id == id)
    }

    /// Every resting offer, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Offer> {
        self.pairs.values().flat_map(|book| {
            book.forward
                .values()
                .chain(book.reverse.values())
                .flat_map(|queue| queue.iter())
        })
    }

    /// Offers owned by `seller`, in id order.
    pub fn offers_by_seller(&self, seller: &AccountId) -> Vec<&Offer> {
        let mut offers: Vec<&Offer> = self.iter().filter(|o| &o.seller == seller).collect();
        offers.sort_by_key(|o| o.id);
        offers
    }

    /// Directed edges `(selling, buying)` that currently have liquidity,
    /// in asset order.
    pub fn edges(&self) -> Vec<(Asset, Asset)> {
        let mut edges = Vec::new();
        for (pair, book) in &self.pairs {
            if !book.forward.is_empty() {
                edges.push((pair.base.clone(), pair.counter.clone()));
            }
            if !book.reverse.is_empty() {
                edges.push((pair.counter.clone(), pair.base.clone()));
            }
        }
        edges.sort();
        edges
    }

    /// Rest a new offer without matching. Returns its id.
    pub fn insert(
        &mut self,
        seller: AccountId,
        selling: Asset,
        buying: Asset,
        amount: u64,
        price: Price,
    ) -> Result<OfferId, OrderBookError> {
        if amount == 0 {
            return Err(OrderBookError::ZeroAmount);
        }
        if selling == buying {
            return Err(OrderBookError::SameAsset(selling));
        }
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(OrderBookError::OfferIdOverflow)?;
        self.place(Offer {
            id,
            seller,
            selling,
            buying,
            amount,
            price,
        });
        Ok(id)
    }

    /// Put an offer in its level, keeping the level sorted by id.
    fn place(&mut self, offer: Offer) {
        let (pair, direction) = locate(&offer.selling, &offer.buying);
        let price = offer.price;
        let id = offer.id;
        let queue = self
            .pairs
            .entry(pair.clone())
            .or_default()
            .side_mut(direction)
            .entry(price)
            .or_default();
        let pos = queue.partition_point(|o| o.id < id);
        queue.insert(pos, offer);
        self.index.insert(
            id,
            OfferLocation {
                pair,
                direction,
                price,
            },
        );
    }

    /// Delete a resting offer.
    pub fn remove(&mut self, id: OfferId) -> Option<Offer> {
        let loc = self.index.remove(&id)?;
        let book = self.pairs.get_mut(&loc.pair)?;
        let levels = book.side_mut(loc.direction);
        let queue = levels.get_mut(&loc.price)?;
        let pos = queue.iter().position(|o| o.id == id)?;
        let offer = queue.remove(pos);

        // Clean up empty levels and pairs.
        if queue.is_empty() {
            levels.remove(&loc.price);
        }
        if book.is_empty() {
            self.pairs.remove(&loc.pair);
        }
        offer
    }

    /// Reduce offer `id` by `amount`, removing it once empty.
    pub fn fill(&mut self, id: OfferId, amount: u64) -> Result<(), OrderBookError> {
        let loc = self
            .index
            .get(&id)
            .cloned()
            .ok_or(OrderBookError::OfferNotFound(id))?;
        let offer = self
            .pairs
            .get_mut(&loc.pair)
            .and_then(|book| book.side_mut(loc.direction).get_mut(&loc.price))
            .and_then(|queue| queue.iter_mut().find(|o| o.id == id))
            .ok_or(OrderBookError::OfferNotFound(id))?;

        if amount > offer.amount {
            return Err(OrderBookError::Overfill {
                id,
                requested: amount,
                available: offer.amount,
            });
        }
        offer.amount -= amount;
        if offer.amount == 0 {
            self.remove(id);
        }
        Ok(())
    }

    /// Match an incoming order against the opposite side and rest any
    /// remainder, unless it is immediate-or-cancel.
    ///
    /// The taker sells `selling`, so it crosses offers that sell
    /// `buying` for `selling` whose price is at or below the inverse of
    /// the taker's price. Fills execute at the resting offer's price.
    /// If the taker's budget would reach one of its own offers, nothing
    /// trades and the order fails with [`OrderBookError::CrossesSelf`].
    pub fn match_offer(&mut self, taker: TakerOrder) -> Result<MatchResult, OrderBookError> {
        self.execute(taker, None)
    }

    /// ManageOffer update: amount 0 deletes the offer, anything else
    /// re-matches it at the new price and rests the remainder under the
    /// same id, keeping its time priority.
    pub fn update(
        &mut self,
        id: OfferId,
        amount: u64,
        price: Price,
    ) -> Result<MatchResult, OrderBookError> {
        let old = self.remove(id).ok_or(OrderBookError::OfferNotFound(id))?;
        if amount == 0 {
            return Ok(MatchResult::default());
        }
        let taker = TakerOrder {
            account: old.seller,
            selling: old.selling.clone(),
            buying: old.buying.clone(),
            amount,
            price,
            immediate_or_cancel: false,
        };
        self.execute(taker, Some(id)).map_err(|e| {
            self.place(old);
            e
        })
    }

    /// Walk the crossing offers the taker's budget would reach, without
    /// filling anything.
    fn check_self_cross(&self, taker: &TakerOrder) -> Result<(), OrderBookError> {
        let mut budget = taker.amount;
        let crossing = self
            .offers(&taker.buying, &taker.selling)
            .take_while(|o| o.price.crosses(&taker.price));
        for offer in crossing {
            if budget == 0 {
                break;
            }
            if offer.seller == taker.account {
                return Err(OrderBookError::CrossesSelf(offer.id));
            }
            let take = offer.amount.min(offer.price.max_for_budget(budget));
            if take == 0 {
                break;
            }
            budget -= offer.cost_of(take).ok_or(OrderBookError::AmountOverflow)?;
        }
        Ok(())
    }

    fn execute(
        &mut self,
        taker: TakerOrder,
        reuse_id: Option<OfferId>,
    ) -> Result<MatchResult, OrderBookError> {
        if taker.amount == 0 {
            return Err(OrderBookError::ZeroAmount);
        }
        if taker.selling == taker.buying {
            return Err(OrderBookError::SameAsset(taker.selling));
        }
        self.check_self_cross(&taker)?;

        let mut result = MatchResult::default();
        let mut budget = taker.amount;
        let mut dust = false;

        while budget > 0 {
            let candidate = self
                .offers(&taker.buying, &taker.selling)
                .next()
                .filter(|o| o.price.crosses(&taker.price))
                .map(|o| (o.id, o.seller, o.amount, o.price));

            let Some((id, seller, available, price)) = candidate else {
                break;
            };

            let take = available.min(price.max_for_budget(budget));
            if take == 0 {
                // The budget cannot buy a single unit at this price.
                dust = true;
                break;
            }
            let cost = price.cost_of(take).ok_or(OrderBookError::AmountOverflow)?;

            self.fill(id, take)?;
            budget -= cost;
            result.sold += cost;
            result.bought += take;
            result.trades.push(Trade {
                offer_id: id,
                seller,
                sold_asset: taker.buying.clone(),
                sold_amount: take,
                bought_asset: taker.selling.clone(),
                bought_amount: cost,
            });
        }

        result.remaining = budget;

        if budget > 0 && !dust && !taker.immediate_or_cancel {
            let id = match reuse_id {
                Some(id) => {
                    self.place(Offer {
                        id,
                        seller: taker.account,
                        selling: taker.selling.clone(),
                        buying: taker.buying.clone(),
                        amount: budget,
                        price: taker.price,
                    });
                    id
                }
                None => self.insert(
                    taker.account,
                    taker.selling.clone(),
                    taker.buying.clone(),
                    budget,
                    taker.price,
                )?,
            };
            result.resting = Some(id);
        }

        debug!(
            selling = %taker.selling,
            buying = %taker.buying,
            trades = result.trades.len(),
            sold = result.sold,
            bought = result.bought,
            resting = ?result.resting,
            "matched offer"
        );

        Ok(result)
    }
}
